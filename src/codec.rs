use bytes::{Buf, BytesMut};
use std::io::Cursor;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{self, Frame};
use crate::Error;

/// Frames larger than this are treated as protocol abuse and kill the
/// connection rather than growing the read buffer without bound.
const MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

pub struct FrameCodec;

impl FrameCodec {
    /// `decode` with the size guard parameterized so tests can exercise it
    /// without building a gigabyte of input.
    fn decode_limited(&mut self, src: &mut BytesMut, limit: usize) -> Result<Option<Frame>, Error> {
        if src.len() > limit {
            return Err("frame size exceeds limit".into());
        }

        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            // Not enough data to parse a frame; wait for more bytes.
            Err(frame::Error::Incomplete) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let position: usize = cursor
            .position()
            .try_into()
            .expect("cursor position exceeds usize");

        // Remove the parsed frame from the buffer.
        src.advance(position);

        Ok(Some(frame))
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode_limited(src, MAX_FRAME_SIZE)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&frame.serialize());
        Ok(())
    }
}
