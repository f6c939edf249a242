//! WebSocket integration tests.
//!
//! Real clients connect to `/ws` through tokio-tungstenite and talk to the
//! hub behind the server.

mod fixtures;
use fixtures::{TestServer, eventually};

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use sessionhub_server::{
    Hub,
    domain::{Frame, SessionId},
    usecase::HandlerError,
};
use tokio::{sync::mpsc, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connect and read the session-assigned greeting.
async fn connect_client(server: &TestServer) -> (WsStream, SessionId) {
    let (mut ws, _) = connect_async(server.ws_url())
        .await
        .expect("Failed to connect");

    let greeting = next_text(&mut ws).await.expect("No greeting received");
    let json: serde_json::Value = serde_json::from_str(&greeting).expect("Greeting is not JSON");
    assert_eq!(json["type"], "session-assigned");
    assert!(json["connected_at"].is_i64());
    let session_id = json["session_id"]
        .as_str()
        .expect("session_id missing")
        .parse()
        .expect("session_id is not a UUID");
    (ws, session_id)
}

/// Next text frame, skipping control frames. `None` on close or timeout.
async fn next_text(ws: &mut WsStream) -> Option<String> {
    loop {
        match timeout(TIMEOUT, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return Some(text.as_str().to_string()),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            _ => return None,
        }
    }
}

#[tokio::test]
async fn test_websocket_connection_is_assigned_a_live_session() {
    // テスト項目: 接続直後に session-assigned が届き、その ID がハブに登録されている
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (_ws, session_id) = connect_client(&server).await;

    // then (期待する結果):
    assert!(server.hub().is_live(&session_id).await);
    assert_eq!(server.hub().session_ids().await, vec![session_id]);
}

#[tokio::test]
async fn test_inbound_frames_reach_handler() {
    // テスト項目: クライアントが送ったテキスト/バイナリがハンドラに届く
    // given (前提条件):
    let hub = Hub::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.set_inbound_handler(move |id: &SessionId, frame: Frame| -> Result<(), HandlerError> {
        tx.send((*id, frame))
            .map_err(|e| HandlerError::new(e.to_string()))
    });
    let server = TestServer::start_with_hub(hub).await;
    let (mut ws, session_id) = connect_client(&server).await;

    // when (操作):
    ws.send(Message::text("hello hub")).await.unwrap();
    ws.send(Message::binary(vec![0u8, 1, 2])).await.unwrap();

    // then (期待する結果):
    let first = timeout(TIMEOUT, rx.recv()).await.unwrap();
    assert_eq!(first, Some((session_id, Frame::from("hello hub"))));
    let second = timeout(TIMEOUT, rx.recv()).await.unwrap();
    assert_eq!(second, Some((session_id, Frame::Binary(vec![0, 1, 2]))));
}

#[tokio::test]
async fn test_send_to_reaches_only_target_client() {
    // テスト項目: send_to は指定したクライアントにだけ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut alice, alice_id) = connect_client(&server).await;
    let (mut bob, _bob_id) = connect_client(&server).await;

    // when (操作):
    server.hub().send_to(&alice_id, "for alice").await.unwrap();
    server.hub().broadcast("for everyone").await;

    // then (期待する結果): bob は broadcast だけを受け取る
    assert_eq!(next_text(&mut alice).await.as_deref(), Some("for alice"));
    assert_eq!(next_text(&mut alice).await.as_deref(), Some("for everyone"));
    assert_eq!(next_text(&mut bob).await.as_deref(), Some("for everyone"));
}

#[tokio::test]
async fn test_echo_through_weak_hub() {
    // テスト項目: ハンドラからハブ経由で送信元に返信できる
    // given (前提条件):
    let hub = Hub::new();
    let weak = hub.downgrade();
    hub.set_inbound_handler(move |id: &SessionId, frame: Frame| -> Result<(), HandlerError> {
        let Some(hub) = weak.upgrade() else {
            return Ok(());
        };
        let id = *id;
        tokio::spawn(async move {
            let _ = hub.send_to(&id, frame).await;
        });
        Ok(())
    });
    let server = TestServer::start_with_hub(hub).await;
    let (mut ws, _) = connect_client(&server).await;

    // when (操作):
    ws.send(Message::text("echo me")).await.unwrap();

    // then (期待する結果):
    assert_eq!(next_text(&mut ws).await.as_deref(), Some("echo me"));
}

#[tokio::test]
async fn test_client_close_removes_session() {
    // テスト項目: クライアントが切断するとセッションが自動的に消える
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut ws, session_id) = connect_client(&server).await;
    let (_other, other_id) = connect_client(&server).await;

    // when (操作):
    ws.close(None).await.unwrap();

    // then (期待する結果):
    let hub = server.hub();
    assert!(eventually(|| async { !hub.is_live(&session_id).await }).await);
    assert_eq!(hub.session_ids().await, vec![other_id]);
    let report = hub.broadcast("after close").await;
    assert_eq!(report.delivered, vec![other_id]);
}

#[tokio::test]
async fn test_dropped_tcp_connection_removes_session() {
    let server = TestServer::start().await;
    let (ws, session_id) = connect_client(&server).await;

    drop(ws);

    let hub = server.hub();
    assert!(eventually(|| async { !hub.is_live(&session_id).await }).await);
}

#[tokio::test]
async fn test_admin_close_closes_client_stream() {
    // テスト項目: 管理操作による強制切断でクライアント側のストリームも閉じる
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut ws, session_id) = connect_client(&server).await;

    // when (操作):
    server.hub().close_session(&session_id).await.unwrap();

    // then (期待する結果):
    assert_eq!(next_text(&mut ws).await, None);
    let hub = server.hub();
    assert!(eventually(|| async { hub.session_count().await == 0 }).await);
}

#[tokio::test]
async fn test_graceful_stop_disconnects_clients() {
    // テスト項目: サーバー停止時に全クライアントが切断される
    // given (前提条件):
    let server = TestServer::start().await;
    let hub = server.hub().clone();
    let (mut ws, _) = connect_client(&server).await;

    // when (操作):
    server.stop().await;

    // then (期待する結果):
    assert_eq!(next_text(&mut ws).await, None);
    assert_eq!(hub.session_count().await, 0);
    assert!(!hub.is_accepting());
}
