use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Increments the number stored at `key` by one. An absent key counts from
/// zero, so the first INCR replies 1.
///
/// Ref: <https://redis.io/docs/latest/commands/incr/>
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: String,
}

impl Executable for Incr {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.incr_by(&self.key, 1) {
            Ok(value) => Frame::Integer(value),
            Err(err) => Frame::Error(err.to_string()),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Incr {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        parser.expect_eof()?;

        Ok(Self { key })
    }
}
