use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{Store, StoreError, Value};
use crate::Error;

/// Get the value of `key`. If the key does not exist the special value `nil`
/// is returned. Keys holding a non-string record report a type mismatch.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.get(&self.key) {
            None => Frame::Null,
            Some(record) => match record.value {
                Value::String(data) => Frame::Bulk(data),
                _ => Frame::Error(StoreError::WrongType.to_string()),
            },
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        parser.expect_eof()?;

        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::{Record, Side};
    use bytes::Bytes;
    use std::time::{Duration, SystemTime};

    fn get(key: &str) -> Command {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("GET")),
            Frame::Bulk(Bytes::from(key.to_string())),
        ]);
        Command::try_from(frame).unwrap()
    }

    #[test]
    fn existing_key() {
        let store = Store::new();
        store.set("key1".to_string(), Record::string(Bytes::from("1"), None));

        let result = get("key1").exec(store).unwrap();

        assert_eq!(result, Frame::Bulk(Bytes::from("1")));
    }

    #[test]
    fn missing_key() {
        let result = get("key1").exec(Store::new()).unwrap();

        assert_eq!(result, Frame::Null);
    }

    #[test]
    fn expired_key_reads_as_missing() {
        let store = Store::new();
        store.set(
            "key1".to_string(),
            Record::string(
                Bytes::from("1"),
                Some(SystemTime::now() - Duration::from_secs(1)),
            ),
        );

        let result = get("key1").exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Null);
        assert!(!store.exists("key1"));
    }

    #[test]
    fn non_string_key_is_a_type_error() {
        let store = Store::new();
        store.push("key1", vec![Bytes::from("a")], Side::Back).unwrap();

        let result = get("key1").exec(store).unwrap();

        assert_eq!(
            result,
            Frame::Error(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string()
            )
        );
    }
}
