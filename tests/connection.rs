use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};

use rudis::connection::Connection;
use rudis::frame::Frame;

/// Sets up a loopback socket pair: bytes pushed into the returned channel are
/// written to the server side of the pair, and the returned client stream is
/// what the `Connection` under test reads from.
async fn create_tcp_connection() -> Result<(UnboundedSender<Vec<u8>>, Connection), std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            while let Some(data) = rx.recv().await {
                if socket.write_all(&data).await.is_err() {
                    break;
                }
            }
        }
    });

    let stream = TcpStream::connect(local_addr).await?;
    let peer_addr = stream.peer_addr()?;

    Ok((tx, Connection::new(stream, peer_addr)))
}

#[tokio::test]
async fn parse_simple_string() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    tx.send(b"+OK\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Simple("OK".to_string())));
}

#[tokio::test]
async fn parse_bulk_string() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    tx.send(b"$5\r\nhello\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Bulk(Bytes::from("hello"))));
}

#[tokio::test]
async fn parse_array() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    tx.send(b"*3\r\n$3\r\nSET\r\n$5\r\nmykey\r\n$7\r\nmyvalue\r\n".to_vec())
        .unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("SET")),
        Frame::Bulk(Bytes::from("mykey")),
        Frame::Bulk(Bytes::from("myvalue")),
    ]));
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn parse_simple_error() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    tx.send(b"-Error message\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Error(String::from("Error message"))));
}

#[tokio::test]
async fn parse_integer() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    tx.send(b":1000\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Integer(1000)));
}

#[tokio::test]
async fn parse_null_bulk_string() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    tx.send(b"$-1\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Null));
}

#[tokio::test]
async fn parse_multiple_frames_sequentially() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    tx.send(b"+OK\r\n".to_vec()).unwrap();
    tx.send(b"$5\r\nhello\r\n".to_vec()).unwrap();
    tx.send(b"*2\r\n$3\r\nGET\r\n$5\r\nmykey\r\n".to_vec())
        .unwrap();
    tx.send(b":1000\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Simple("OK".to_string())));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Bulk(Bytes::from("hello"))));

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("GET")),
        Frame::Bulk(Bytes::from("mykey")),
    ]));
    assert_eq!(actual, expected);

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, Some(Frame::Integer(1000)));
}

#[tokio::test]
async fn parse_frame_delivered_in_chunks() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    // One command split across three writes; the decoder has to wait for
    // the missing bytes instead of failing.
    let part1 = b"*3\r\n$3\r\nSE";
    let part2 = b"T\r\n$5\r\nmyke";
    let part3 = b"y\r\n$7\r\nmyvalue\r\n";

    tokio::spawn(async move {
        for part in [part1.to_vec(), part2.to_vec(), part3.to_vec()] {
            tx.send(part).unwrap();
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }
    });

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("SET")),
        Frame::Bulk(Bytes::from("mykey")),
        Frame::Bulk(Bytes::from("myvalue")),
    ]));
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn read_frame_returns_none_on_clean_close() {
    let (tx, mut connection) = create_tcp_connection().await.unwrap();

    drop(tx);
    // Give the writer task a moment to exit and close its socket.
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, None);
}
