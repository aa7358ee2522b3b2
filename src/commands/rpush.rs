use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::lpush::parse_elements;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{Side, Store};
use crate::Error;

/// Appends the given elements to the list at `key`, creating the list if
/// absent, and replies with the resulting length.
#[derive(Debug, PartialEq)]
pub struct RPush {
    pub key: String,
    pub elements: Vec<Bytes>,
}

impl Executable for RPush {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.push(&self.key, self.elements, Side::Back) {
            Ok(length) => Frame::Integer(length as i64),
            Err(err) => Frame::Error(err.to_string()),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for RPush {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let elements = parse_elements(parser)?;

        Ok(Self { key, elements })
    }
}
