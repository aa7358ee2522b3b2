use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{Side, Store};
use crate::Error;

/// Prepends the given elements to the list at `key`, creating the list if
/// absent, and replies with the resulting length. The argument block keeps
/// its left-to-right order at the front of the list.
#[derive(Debug, PartialEq)]
pub struct LPush {
    pub key: String,
    pub elements: Vec<Bytes>,
}

impl Executable for LPush {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = match store.push(&self.key, self.elements, Side::Front) {
            Ok(length) => Frame::Integer(length as i64),
            Err(err) => Frame::Error(err.to_string()),
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for LPush {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let elements = parse_elements(parser)?;

        Ok(Self { key, elements })
    }
}

/// One or more trailing push elements; none at all is an arity problem
/// reported by the caller.
pub(crate) fn parse_elements(
    parser: &mut CommandParser,
) -> Result<Vec<Bytes>, CommandParserError> {
    let mut elements = vec![];

    loop {
        match parser.next_bytes() {
            Ok(element) => elements.push(element),
            Err(CommandParserError::EndOfStream) if !elements.is_empty() => break,
            Err(err) => return Err(err),
        }
    }

    Ok(elements)
}
