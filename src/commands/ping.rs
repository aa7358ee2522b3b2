use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns PONG if no argument is provided, otherwise a copy of the argument
/// as a bulk.
///
/// Ref: <https://redis.io/docs/latest/commands/ping>
#[derive(Debug, PartialEq)]
pub struct Ping {
    pub payload: Option<Bytes>,
}

impl Executable for Ping {
    fn exec(self, _store: Store) -> Result<Frame, Error> {
        let res = self
            .payload
            .map_or(Frame::Simple("PONG".to_string()), Frame::Bulk);

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let payload = match parser.next_bytes() {
            Ok(payload) => Some(payload),
            Err(CommandParserError::EndOfStream) => None,
            Err(e) => return Err(e),
        };
        parser.expect_eof()?;

        Ok(Self { payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn no_payload() {
        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("PING"))]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(cmd, Command::Ping(Ping { payload: None }));

        let result = cmd.exec(Store::new()).unwrap();

        assert_eq!(result, Frame::Simple("PONG".to_string()));
    }

    #[test]
    fn with_payload() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("PING")),
            Frame::Bulk(Bytes::from("hello")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Ping(Ping {
                payload: Some(Bytes::from("hello"))
            })
        );

        let result = cmd.exec(Store::new()).unwrap();

        assert_eq!(result, Frame::Bulk(Bytes::from("hello")));
    }

    #[test]
    fn too_many_arguments() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("PING")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("b")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::WrongNumberOfArguments {
                command: "ping".to_string()
            }
        );
    }
}
