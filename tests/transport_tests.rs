// Tests for the WebSocket transport against a local WebSocket server

use futures::{SinkExt, StreamExt};
use rtms_client::{Stage, Transport, TransportError, WebSocketTransport};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

const WAIT: Duration = Duration::from_secs(5);

type Server = WebSocketStream<TcpStream>;

/// Bind a local listener and accept one WebSocket connection on it
async fn serve_once() -> (String, JoinHandle<Server>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        accept_async(stream).await.unwrap()
    });

    (url, server)
}

async fn next_message(server: &mut Server) -> Option<Message> {
    timeout(WAIT, server.next())
        .await
        .expect("timed out waiting for the client")
        .map(|message| message.expect("server read failed"))
}

#[tokio::test]
async fn test_text_frames_round_trip() {
    let (url, server) = serve_once().await;
    let connection = WebSocketTransport::new()
        .connect(Stage::Signaling, &url)
        .await
        .unwrap();
    let mut server = server.await.unwrap();
    let mut inbound = connection.inbound;

    connection
        .handle
        .send_text(r#"{"msg_type":1}"#.to_string())
        .unwrap();
    assert_eq!(
        next_message(&mut server).await,
        Some(Message::Text(r#"{"msg_type":1}"#.to_string()))
    );

    server
        .send(Message::Text(r#"{"msg_type":2}"#.to_string()))
        .await
        .unwrap();
    let received = timeout(WAIT, inbound.recv()).await.unwrap();
    assert_eq!(received.as_deref(), Some(r#"{"msg_type":2}"#));
}

#[tokio::test]
async fn test_binary_frames_are_forwarded_only_as_utf8() {
    let (url, server) = serve_once().await;
    let connection = WebSocketTransport::new()
        .connect(Stage::Media, &url)
        .await
        .unwrap();
    let mut server = server.await.unwrap();
    let mut inbound = connection.inbound;

    server
        .send(Message::Binary(vec![0xff, 0xfe, 0xfd]))
        .await
        .unwrap();
    server
        .send(Message::Binary(br#"{"msg_type":14}"#.to_vec()))
        .await
        .unwrap();

    // The non-UTF-8 frame is skipped
    let received = timeout(WAIT, inbound.recv()).await.unwrap();
    assert_eq!(received.as_deref(), Some(r#"{"msg_type":14}"#));
}

#[tokio::test]
async fn test_peer_close_ends_inbound_and_fails_sends() {
    let (url, server) = serve_once().await;
    let connection = WebSocketTransport::new()
        .connect(Stage::Signaling, &url)
        .await
        .unwrap();
    let mut server = server.await.unwrap();
    let handle = connection.handle.clone();
    let mut inbound = connection.inbound;

    server.close(None).await.unwrap();

    let received = timeout(WAIT, inbound.recv()).await.unwrap();
    assert_eq!(received, None);

    assert!(handle.is_closed());
    assert!(matches!(
        handle.send_text("late".to_string()),
        Err(TransportError::Closed {
            stage: Stage::Signaling
        })
    ));
    assert!(connection.handle.send(&serde_json::json!({"msg_type": 7})).is_err());
}

#[tokio::test]
async fn test_peer_close_is_acknowledged() {
    let (url, server) = serve_once().await;
    let connection = WebSocketTransport::new()
        .connect(Stage::Media, &url)
        .await
        .unwrap();
    let mut server = server.await.unwrap();

    server.close(None).await.unwrap();

    // The client answers with its own Close, so the stream ends cleanly
    // instead of with a reset
    loop {
        match timeout(WAIT, server.next()).await.unwrap() {
            Some(Ok(Message::Close(_))) => continue,
            Some(Ok(other)) => panic!("unexpected frame: {:?}", other),
            Some(Err(e)) => panic!("closing handshake not completed: {}", e),
            None => break,
        }
    }

    drop(connection);
}

#[tokio::test]
async fn test_client_close_performs_closing_handshake() {
    let (url, server) = serve_once().await;
    let connection = WebSocketTransport::new()
        .connect(Stage::Event, &url)
        .await
        .unwrap();
    let mut server = server.await.unwrap();
    let mut inbound = connection.inbound;

    connection.handle.close();

    assert!(matches!(
        next_message(&mut server).await,
        Some(Message::Close(_))
    ));
    // Reading on acknowledges the Close; the stream then ends without error
    assert_eq!(next_message(&mut server).await, None);

    let received = timeout(WAIT, inbound.recv()).await.unwrap();
    assert_eq!(received, None);
}
