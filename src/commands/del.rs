use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes the listed keys, replying with the number actually removed. A key
/// repeated in the argument list only counts the first time it is removed.
///
/// Ref: <https://redis.io/docs/latest/commands/del/>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<String>,
}

impl Executable for Del {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let mut count = 0;
        for key in &self.keys {
            if store.remove(key) {
                count += 1;
            }
        }

        Ok(Frame::Integer(count))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let mut keys = vec![];

        loop {
            match parser.next_string() {
                Ok(key) => keys.push(key),
                Err(CommandParserError::EndOfStream) if !keys.is_empty() => break,
                Err(err) => return Err(err),
            }
        }

        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::Record;
    use bytes::Bytes;

    fn del(keys: &[&str]) -> Command {
        let mut parts = vec![Frame::Bulk(Bytes::from("DEL"))];
        parts.extend(
            keys.iter()
                .map(|key| Frame::Bulk(Bytes::from(key.to_string()))),
        );
        Command::try_from(Frame::Array(parts)).unwrap()
    }

    #[test]
    fn multiple_keys() {
        let store = Store::new();
        store.set("foo".to_string(), Record::string(Bytes::from("1"), None));
        store.set("bar".to_string(), Record::string(Bytes::from("2"), None));

        let result = del(&["foo", "bar", "baz"]).exec(store.clone()).unwrap();

        assert_eq!(result, Frame::Integer(2));
        assert!(!store.exists("foo"));
        assert!(!store.exists("bar"));
    }

    #[test]
    fn repeated_key_only_counts_once() {
        let store = Store::new();
        store.set("a".to_string(), Record::string(Bytes::from("1"), None));

        let result = del(&["a", "b", "a"]).exec(store).unwrap();

        assert_eq!(result, Frame::Integer(1));
    }

    #[test]
    fn zero_keys_is_an_arity_error() {
        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("DEL"))]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::WrongNumberOfArguments {
                command: "del".to_string()
            }
        );
    }

    #[test]
    fn invalid_frame() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("DEL")),
            Frame::Integer(42),
            Frame::Bulk(Bytes::from("foo")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: Frame::Integer(42)
            }
        );
    }
}
