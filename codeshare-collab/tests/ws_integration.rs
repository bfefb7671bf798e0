//! Integration tests for the WebSocket channel.
//!
//! Each test starts a scripted single-connection server on a free port,
//! connects a real `WsChannel` to it, and inspects the frames on the wire.

use codeshare_collab::{
    Applied, ClientConfig, ClientEvent, CodeRoom, ConnectionState, Language, Step, Transport,
    TransportError, WsChannel,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;

/// Server side of one accepted connection.
struct ScriptedServer {
    url: String,
    /// Every frame the client sent, close frame included.
    received: mpsc::UnboundedReceiver<Message>,
    /// Frames to push to the client.
    outgoing: mpsc::UnboundedSender<Message>,
}

impl ScriptedServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (received_tx, received) = mpsc::unbounded_channel();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws_stream = tokio_tungstenite::accept_async(stream).await.unwrap();
            let (mut writer, mut reader) = ws_stream.split();

            tokio::spawn(async move {
                while let Some(message) = outgoing_rx.recv().await {
                    if writer.send(message).await.is_err() {
                        break;
                    }
                }
            });

            while let Some(Ok(message)) = reader.next().await {
                let is_close = message.is_close();
                let _ = received_tx.send(message);
                if is_close {
                    break;
                }
            }
        });

        Self {
            url,
            received,
            outgoing,
        }
    }

    async fn next_frame(&mut self) -> Message {
        timeout(Duration::from_secs(2), self.received.recv())
            .await
            .expect("frame should arrive")
            .expect("connection should stay open")
    }

    async fn next_json(&mut self) -> Value {
        match self.next_frame().await {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    fn push(&self, frame: Value) {
        self.outgoing
            .send(Message::Text(frame.to_string().into()))
            .unwrap();
    }

    fn push_raw(&self, text: &str) {
        self.outgoing.send(Message::Text(text.into())).unwrap();
    }
}

async fn connected_room() -> (CodeRoom, Arc<WsChannel>, ScriptedServer) {
    let server = ScriptedServer::start().await;
    let channel = Arc::new(WsChannel::new(server.url.clone()));
    channel.connect().await.unwrap();

    let mut room = CodeRoom::new(channel.clone(), &ClientConfig::default());
    room.start().unwrap();
    (room, channel, server)
}

async fn next_step(room: &mut CodeRoom) -> Step {
    timeout(Duration::from_secs(2), room.step())
        .await
        .expect("room should wake")
}

#[tokio::test]
async fn test_connect_reports_connected() {
    let (_room, channel, _server) = connected_room().await;
    assert_eq!(channel.connection_state().await, ConnectionState::Connected);
}

#[tokio::test]
async fn test_outbound_frames_on_wire() {
    let (mut room, _channel, mut server) = connected_room().await;

    room.join("room1", "alice");
    room.on_local_content_change("print(1)");
    room.on_local_language_change(Language::Python);
    room.leave();

    assert_eq!(
        server.next_json().await,
        json!({"event": "join", "data": {"roomId": "room1", "userName": "alice"}})
    );
    assert_eq!(
        server.next_json().await,
        json!({"event": "codeChange", "data": {"roomId": "room1", "code": "print(1)"}})
    );
    assert_eq!(
        server.next_json().await,
        json!({"event": "typing", "data": {"roomId": "room1", "userName": "alice"}})
    );
    assert_eq!(
        server.next_json().await,
        json!({"event": "languageChange", "data": {"roomId": "room1", "language": "python"}})
    );
    assert_eq!(server.next_json().await, json!({"event": "leaveRoom"}));
}

#[tokio::test]
async fn test_inbound_frames_reach_room() {
    let (mut room, _channel, server) = connected_room().await;
    room.join("room1", "alice");

    server.push(json!({"event": "userJoined", "data": ["alice", "bob-desktop"]}));
    server.push(json!({"event": "codeUpdate", "data": "fn main() {}"}));
    server.push(json!({"event": "languageUpdate", "data": "cpp"}));

    assert_eq!(next_step(&mut room).await, Step::Event(Applied::Members(2)));
    assert_eq!(next_step(&mut room).await, Step::Event(Applied::Content));
    assert_eq!(
        next_step(&mut room).await,
        Step::Event(Applied::Language(Language::Cpp))
    );

    let view = room.view();
    assert_eq!(view.members, ["alice...", "bob-desk..."]);
    assert_eq!(view.content, "fn main() {}");
    assert_eq!(view.language, Language::Cpp);
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let (mut room, _channel, server) = connected_room().await;
    room.join("room1", "alice");

    server.push_raw("not json");
    server.push(json!({"event": "cursorMove", "data": {"x": 1}}));
    server.push(json!({"event": "languageUpdate", "data": "cobol"}));
    server.push(json!({"event": "user-joined", "data": "carol"}));

    assert_eq!(
        next_step(&mut room).await,
        Step::Event(Applied::PeerJoined("carol".into()))
    );
}

#[tokio::test]
async fn test_server_close_ends_stream() {
    let (mut room, channel, server) = connected_room().await;

    server.outgoing.send(Message::Close(None)).unwrap();

    assert_eq!(next_step(&mut room).await, Step::Closed);
    assert_eq!(
        channel.connection_state().await,
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn test_close_flushes_leave_before_close_frame() {
    let (mut room, channel, mut server) = connected_room().await;
    room.join("room1", "alice");
    assert_eq!(server.next_json().await["event"], "join");

    let (unload_tx, unload_rx) = tokio::sync::oneshot::channel::<()>();
    let mut listener = room.install_unload_listener(async move {
        let _ = unload_rx.await;
    });
    unload_tx.send(()).unwrap();
    timeout(Duration::from_secs(1), listener.fired())
        .await
        .expect("listener should fire");
    room.handle_unload();
    channel.close().await;

    assert_eq!(server.next_json().await, json!({"event": "leaveRoom"}));
    assert!(server.next_frame().await.is_close());
    assert_eq!(
        channel.connection_state().await,
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn test_emit_after_close_fails() {
    let (_room, channel, _server) = connected_room().await;
    channel.close().await;

    assert!(matches!(
        channel.emit(ClientEvent::LeaveRoom),
        Err(TransportError::NotConnected)
    ));
}

#[tokio::test]
async fn test_inbound_before_join_is_ignored() {
    let (mut room, _channel, server) = connected_room().await;

    server.push(json!({"event": "codeUpdate", "data": "too early"}));
    assert_eq!(next_step(&mut room).await, Step::Event(Applied::Ignored));
    assert_eq!(room.view().content, "//start coding here");
}
