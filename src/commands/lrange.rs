use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the inclusive `[start, stop]` slice of the list at `key`.
/// Negative indices count from the end of the list; out-of-range indices are
/// clamped. An absent key or an empty normalized range yields an empty
/// array.
///
/// Ref: <https://redis.io/docs/latest/commands/lrange/>
#[derive(Debug, PartialEq)]
pub struct LRange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for LRange {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.range(&self.key, self.start, self.stop) {
            Ok(elements) => Frame::Array(elements.into_iter().map(Frame::Bulk).collect()),
            Err(err) => Frame::Error(err.to_string()),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for LRange {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;
        parser.expect_eof()?;

        Ok(Self { key, start, stop })
    }
}
