use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

pub async fn run(port: u16) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let store = Store::new();

    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store).await {
                error!(e);
            }
        });
    }
}

/// Runs one client's request/reply loop. Commands execute strictly in the
/// order they were decoded, so replies always match request order.
///
/// Command-level failures (unknown name, bad arity, syntax) are answered
/// in-band as error frames; only a decode or stream failure ends the loop
/// with an error, tearing the connection down.
#[instrument(
    name = "connection",
    skip(stream, store),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, client_address);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(frame) = conn.read_frame().await? {
        debug!("Received frame from client: {:?}", frame);

        let res = match Command::try_from(frame) {
            Ok(cmd) => cmd.exec(store.clone())?,
            Err(err) => Frame::Error(err.to_string()),
        };

        debug!("Sending response to client: {:?}", res);
        conn.write_frame(res).await?;
    }

    info!("Connection closed");
    Ok(())
}
