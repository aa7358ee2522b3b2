pub mod decr;
pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod get;
pub mod incr;
pub mod lpush;
pub mod lrange;
pub mod ping;
pub mod rpush;
pub mod set;

use bytes::Bytes;
use std::{str, vec};
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

use decr::Decr;
use del::Del;
use echo::Echo;
use exists::Exists;
use get::Get;
use incr::Incr;
use lpush::LPush;
use lrange::LRange;
use ping::Ping;
use rpush::RPush;
use set::Set;

#[derive(Debug, PartialEq)]
pub enum Command {
    Decr(Decr),
    Del(Del),
    Echo(Echo),
    Exists(Exists),
    Get(Get),
    Incr(Incr),
    LPush(LPush),
    LRange(LRange),
    Ping(Ping),
    RPush(RPush),
    Set(Set),
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        match self {
            Command::Decr(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Echo(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Incr(cmd) => cmd.exec(store),
            Command::LPush(cmd) => cmd.exec(store),
            Command::LRange(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::RPush(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandParserError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the server as RESP arrays of bulk strings.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let mut parser = CommandParser::new(frames)?;
        let name = parser.name.clone();

        let command = match &name[..] {
            "decr" => Decr::try_from(&mut parser).map(Command::Decr),
            "del" => Del::try_from(&mut parser).map(Command::Del),
            "echo" => Echo::try_from(&mut parser).map(Command::Echo),
            "exists" => Exists::try_from(&mut parser).map(Command::Exists),
            "get" => Get::try_from(&mut parser).map(Command::Get),
            "incr" => Incr::try_from(&mut parser).map(Command::Incr),
            "lpush" => LPush::try_from(&mut parser).map(Command::LPush),
            "lrange" => LRange::try_from(&mut parser).map(Command::LRange),
            "ping" => Ping::try_from(&mut parser).map(Command::Ping),
            "rpush" => RPush::try_from(&mut parser).map(Command::RPush),
            "set" => Set::try_from(&mut parser).map(Command::Set),
            _ => Err(CommandParserError::UnknownCommand { command: name }),
        };

        // A command that runs out of arguments mid-parse surfaces as the
        // canonical arity error rather than a protocol failure.
        command.map_err(|err| match err {
            CommandParserError::EndOfStream => parser.wrong_arity(),
            err => err,
        })
    }
}

pub(crate) struct CommandParser {
    name: String,
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn new(frames: Vec<Frame>) -> Result<CommandParser, CommandParserError> {
        let mut parts = frames.into_iter();

        let name = match parts.next().ok_or(CommandParserError::EndOfStream)? {
            Frame::Simple(s) => s.to_lowercase(),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String)?,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "simple or bulk string".to_string(),
                    actual: frame,
                })
            }
        };

        Ok(CommandParser { name, parts })
    }

    fn wrong_arity(&self) -> CommandParserError {
        CommandParserError::WrongNumberOfArguments {
            command: self.name.clone(),
        }
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            // While errors are stored as strings, they are considered separate types.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(string) => string
                .parse::<i64>()
                .map_err(|_| CommandParserError::NotAnInteger),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map_err(CommandParserError::InvalidUTF8String)?
                .parse::<i64>()
                .map_err(|_| CommandParserError::NotAnInteger),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    /// Commands with a fixed arity call this after consuming their
    /// arguments; leftovers are an arity error.
    fn expect_eof(&mut self) -> Result<(), CommandParserError> {
        match self.parts.next() {
            None => Ok(()),
            Some(_) => Err(self.wrong_arity()),
        }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("ERR protocol error; expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongNumberOfArguments { command: String },
    #[error("ERR syntax error")]
    Syntax,
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,
    #[error("ERR protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}
