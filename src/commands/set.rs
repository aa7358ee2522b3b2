use bytes::Bytes;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::{SetMode, Store};
use crate::Error;

/// Set `key` to hold a string value, with optional existence preconditions
/// (NX/XX) and an optional expiry. A conditional write that does not apply
/// replies with `nil` and leaves the store untouched.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
    pub nx: bool,
    pub xx: bool,
    pub expiry: Option<Expiry>,
}

/// A single time option. EX/PX are relative to the write; EXAT/PXAT are
/// absolute unix timestamps.
#[derive(Debug, PartialEq)]
pub enum Expiry {
    Ex(i64),
    Px(i64),
    ExAt(i64),
    PxAt(i64),
}

impl Expiry {
    /// The absolute deadline, computed at write time. Non-positive values
    /// install no expiry at all, and so does a deadline too far in the
    /// future for `SystemTime` to represent.
    fn deadline(&self, now: SystemTime) -> Option<SystemTime> {
        let (anchor, duration) = match *self {
            Expiry::Ex(secs) if secs > 0 => (now, Duration::from_secs(secs as u64)),
            Expiry::Px(millis) if millis > 0 => (now, Duration::from_millis(millis as u64)),
            Expiry::ExAt(secs) if secs > 0 => (UNIX_EPOCH, Duration::from_secs(secs as u64)),
            Expiry::PxAt(millis) if millis > 0 => (UNIX_EPOCH, Duration::from_millis(millis as u64)),
            _ => return None,
        };

        anchor.checked_add(duration)
    }
}

impl Executable for Set {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let mode = match (self.nx, self.xx) {
            (false, false) => SetMode::Any,
            (true, false) => SetMode::IfAbsent,
            (false, true) => SetMode::IfPresent,
            // Contradictory preconditions never write.
            (true, true) => return Ok(Frame::Null),
        };

        let expires_at = self
            .expiry
            .as_ref()
            .and_then(|expiry| expiry.deadline(SystemTime::now()));

        let written = store.set_string(self.key, self.value, expires_at, mode);
        let res = if written {
            Frame::Simple("OK".to_string())
        } else {
            Frame::Null
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        let mut nx = false;
        let mut xx = false;
        let mut expiry = None;

        loop {
            let option = match parser.next_string() {
                Ok(option) => option,
                Err(CommandParserError::EndOfStream) => break,
                Err(err) => return Err(err),
            };

            match option.to_uppercase().as_str() {
                "NX" => nx = true,
                "XX" => xx = true,
                "EX" | "PX" | "EXAT" | "PXAT" if expiry.is_some() => {
                    // At most one time option may be given.
                    return Err(CommandParserError::Syntax);
                }
                "EX" => expiry = Some(Expiry::Ex(parser.next_integer()?)),
                "PX" => expiry = Some(Expiry::Px(parser.next_integer()?)),
                "EXAT" => expiry = Some(Expiry::ExAt(parser.next_integer()?)),
                "PXAT" => expiry = Some(Expiry::PxAt(parser.next_integer()?)),
                _ => return Err(CommandParserError::Syntax),
            }
        }

        Ok(Self {
            key,
            value,
            nx,
            xx,
            expiry,
        })
    }
}
