use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Error;

/// One client connection: a framed TCP stream plus an id used to correlate
/// log lines across the connection's lifetime.
pub struct Connection {
    pub id: Uuid,
    pub client_address: SocketAddr,
    frames: Framed<TcpStream, FrameCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            client_address,
            frames: Framed::new(stream, FrameCodec),
        }
    }

    /// Reads the next complete frame, waiting for more bytes as needed.
    /// Returns `None` once the peer closes the stream cleanly.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        match self.frames.next().await {
            Some(frame) => frame.map(Some),
            None => Ok(None),
        }
    }

    /// Encodes and flushes a single reply frame.
    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.frames.send(frame).await
    }
}
