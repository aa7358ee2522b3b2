// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("protocol error; invalid frame format")]
    InvalidFormat,
}

/// A single RESP wire value. Requests arrive as an `Array` of `Bulk` frames;
/// replies may be any variant.
///
/// `Null` covers both the null bulk string (`$-1\r\n`) and the null array
/// (`*-1\r\n`). A null bulk string and an empty one are distinct wire values.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

impl Frame {
    /// Consumes exactly one complete frame from the cursor. Returns
    /// `Error::Incomplete` when the buffer does not yet hold a whole frame,
    /// leaving the caller free to retry once more bytes arrive.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => {
                let bytes = get_line(src)?.to_vec();
                let string = String::from_utf8(bytes)?;
                Ok(Frame::Error(string))
            }
            DataType::Integer => {
                let line = get_line(src)?;
                let integer = parse_integer(line)?;
                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => {
                let length = parse_integer(get_line(src)?)?;

                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length: usize = length.try_into().map_err(|_| Error::InvalidFormat)?;

                // The payload is binary-safe: take exactly `length` bytes
                // without scanning them, then require the trailing CRLF.
                let data = get_exact(src, length)?;
                let data = Bytes::from(data.to_vec());
                expect_crlf(src)?;

                Ok(Frame::Bulk(data))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let length = parse_integer(get_line(src)?)?;

                if length == -1 {
                    return Ok(Frame::Null);
                }
                let length: usize = length.try_into().map_err(|_| Error::InvalidFormat)?;

                let mut frames = Vec::with_capacity(length);
                for _ in 0..length {
                    let frame = Self::parse(src)?;
                    frames.push(frame);
                }

                Ok(Frame::Array(frames))
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleString));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Error(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleError));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Integer(i) => {
                // Non-negative integers carry an explicit `+`, matching the
                // wire form the parser accepts back. The sign is cosmetic on
                // re-decode.
                let digits = i.to_string();
                let mut bytes = Vec::with_capacity(2 + digits.len() + CRLF.len());
                bytes.push(u8::from(DataType::Integer));
                if *i >= 0 {
                    bytes.push(b'+');
                }
                bytes.extend_from_slice(digits.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Bulk(bytes) => {
                let length_str = bytes.len().to_string();
                let mut result = Vec::with_capacity(
                    1 + length_str.len() + CRLF.len() + bytes.len() + CRLF.len(),
                );
                result.push(u8::from(DataType::BulkString));
                result.extend_from_slice(length_str.as_bytes());
                result.extend_from_slice(CRLF);
                result.extend_from_slice(bytes);
                result.extend_from_slice(CRLF);
                result
            }
            Frame::Null => b"$-1\r\n".to_vec(),
            Frame::Array(arr) => {
                let length_str = arr.len().to_string();
                let mut bytes = Vec::with_capacity(1 + length_str.len() + CRLF.len());
                bytes.push(u8::from(DataType::Array));
                bytes.extend_from_slice(length_str.as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in arr {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
        }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for frame in arr {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
        }
    }
}

/// Base-10 with at most one leading sign character; anything else is a
/// format error. The sign is validated here rather than left to `parse`,
/// which would otherwise accept a second `+`.
fn parse_integer(line: &[u8]) -> Result<i64, Error> {
    let string = std::str::from_utf8(line).map_err(|_| Error::InvalidFormat)?;

    let digits = match string.as_bytes().first() {
        Some(b'+') | Some(b'-') => &string[1..],
        _ => string,
    };
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Error::InvalidFormat);
    }

    string
        .strip_prefix('+')
        .unwrap_or(string)
        .parse::<i64>()
        .map_err(|_| Error::InvalidFormat)
}

fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len();

    let line_end = src.get_ref()[start..end]
        .windows(2)
        .position(|window| window == CRLF)
        .ok_or(Error::Incomplete)
        .map(|index| start + index)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..line_end])
}

fn get_exact<'a>(src: &mut Cursor<&'a [u8]>, n: usize) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;

    if src.get_ref().len() - start < n {
        return Err(Error::Incomplete);
    }

    src.set_position((start + n) as u64);
    Ok(&src.get_ref()[start..start + n])
}

fn expect_crlf(src: &mut Cursor<&[u8]>) -> Result<(), Error> {
    let terminator = get_exact(src, CRLF.len())?;
    if terminator != CRLF {
        return Err(Error::InvalidFormat);
    }
    Ok(())
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        Error::InvalidFormat
    }
}
