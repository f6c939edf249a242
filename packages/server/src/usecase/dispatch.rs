//! UseCase: 受信フレームの振り分け
//!
//! 接続ごとの read loop と、全セッション共通の受信ハンドラ（1 つだけ）を扱う。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - Dispatcher::run_read_loop() / dispatch() / set_handler()
//!
//! ### どのような状況を想定しているか
//! - 正常系：受信順にハンドラが呼ばれる
//! - 異常系：ハンドラのエラー・パニック、転送路のエラー
//! - エッジケース：ハンドラ未設定、ハンドラの差し替え、close 要求

use std::{
    fmt,
    panic::AssertUnwindSafe,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::domain::{Connection, Frame, FrameReader, SessionId, TransportError};

use super::error::HandlerError;

/// 全セッションの受信フレームごとに呼ばれるハンドラ
///
/// そのセッションの read loop のタスク上で実行されるため、遅いハンドラが止めるのは
/// そのセッションだけ。`Fn(&SessionId, Frame) -> Result<(), HandlerError>` を満たす
/// クロージャもこの trait を実装する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn on_message(&self, session_id: &SessionId, frame: Frame) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F> InboundHandler for F
where
    F: Fn(&SessionId, Frame) -> Result<(), HandlerError> + Send + Sync,
{
    async fn on_message(&self, session_id: &SessionId, frame: Frame) -> Result<(), HandlerError> {
        self(session_id, frame)
    }
}

/// read loop の終了理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadTermination {
    /// ピアが接続を閉じた
    PeerClosed,
    /// `Connection::request_close` が呼ばれた（強制切断またはシャットダウン）
    CloseRequested,
    /// 転送路のエラー
    Failed(TransportError),
}

impl fmt::Display for ReadTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadTermination::PeerClosed => write!(f, "peer closed"),
            ReadTermination::CloseRequested => write!(f, "close requested"),
            ReadTermination::Failed(e) => write!(f, "{e}"),
        }
    }
}

/// 受信ハンドラを保持し、read loop を実行する
#[derive(Default)]
pub struct Dispatcher {
    handler: RwLock<Option<Arc<dyn InboundHandler>>>,
}

impl Dispatcher {
    /// 新しい Dispatcher を作成（ハンドラ未設定）
    pub fn new() -> Self {
        Self::default()
    }

    /// 受信ハンドラを設定（後から設定したものが有効）
    pub fn set_handler(&self, handler: Arc<dyn InboundHandler>) {
        let mut slot = self.handler.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(handler);
    }

    pub fn has_handler(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_handler(&self) -> Option<Arc<dyn InboundHandler>> {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 受信フレームを 1 つハンドラに渡す
    ///
    /// ハンドラのエラーやパニックはセッション ID と共にログに出力し、呼び出し元には伝えない。
    pub async fn dispatch(&self, session_id: &SessionId, frame: Frame) {
        let Some(handler) = self.current_handler() else {
            tracing::debug!("No inbound handler installed, dropping frame from {}", session_id);
            return;
        };

        match AssertUnwindSafe(handler.on_message(session_id, frame))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("Inbound handler error for session {}: {}", session_id, e);
            }
            Err(_) => {
                tracing::error!("Inbound handler panicked for session {}", session_id);
            }
        }
    }

    /// 転送路のエラー・ピアの切断・close 要求のいずれかまでフレームを読み続ける
    ///
    /// 読んだフレームは次の読み込みの前にハンドラへ渡す。
    /// 後始末は呼び出し元が接続ごとに一度だけ行う。
    pub async fn run_read_loop(
        &self,
        connection: &Connection,
        reader: &mut dyn FrameReader,
    ) -> ReadTermination {
        let session_id = connection.id();

        loop {
            let result = tokio::select! {
                biased;
                _ = connection.close_requested() => return ReadTermination::CloseRequested,
                result = reader.read_frame() => result,
            };

            match result {
                Ok(frame) => {
                    tracing::debug!("Received {} bytes from {}", frame.len(), session_id);
                    self.dispatch(&session_id, frame).await;
                }
                Err(TransportError::Closed) => return ReadTermination::PeerClosed,
                Err(e) => return ReadTermination::Failed(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{SessionIdFactory, Timestamp, Transport},
        infrastructure::transport::{ChannelPeer, channel_transport},
    };
    use mockall::predicate::eq;
    use std::sync::Mutex;

    fn create_test_session() -> (Connection, Box<dyn FrameReader>, ChannelPeer) {
        let (transport, peer) = channel_transport();
        let (reader, writer) = transport.into_split();
        let connection = Connection::new(SessionIdFactory::generate(), Timestamp::now(), writer);
        (connection, reader, peer)
    }

    #[tokio::test]
    async fn test_frames_are_dispatched_in_order() {
        // テスト項目: 受信したフレームが順番通りハンドラに渡される
        // given (前提条件):
        let (connection, mut reader, mut peer) = create_test_session();
        let session_id = connection.id();
        let mut handler = MockInboundHandler::new();
        let mut seq = mockall::Sequence::new();
        for text in ["one", "two"] {
            handler
                .expect_on_message()
                .with(eq(session_id), eq(Frame::from(text)))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
        let dispatcher = Dispatcher::new();
        dispatcher.set_handler(Arc::new(handler));

        // when (操作):
        peer.send("one");
        peer.send("two");
        peer.close();
        let termination = dispatcher.run_read_loop(&connection, reader.as_mut()).await;

        // then (期待する結果):
        assert_eq!(termination, ReadTermination::PeerClosed);
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_loop() {
        // テスト項目: ハンドラがエラーを返しても後続のフレームは処理される
        // given (前提条件):
        let (connection, mut reader, mut peer) = create_test_session();
        let mut handler = MockInboundHandler::new();
        handler
            .expect_on_message()
            .times(3)
            .returning(|_, _| Err(HandlerError::new("boom")));
        let dispatcher = Dispatcher::new();
        dispatcher.set_handler(Arc::new(handler));

        // when (操作):
        for _ in 0..3 {
            peer.send("x");
        }
        peer.close();
        let termination = dispatcher.run_read_loop(&connection, reader.as_mut()).await;

        // then (期待する結果): 3 回とも呼ばれ、終了理由はピア切断
        assert_eq!(termination, ReadTermination::PeerClosed);
    }

    #[tokio::test]
    async fn test_handler_panic_does_not_stop_loop() {
        // テスト項目: ハンドラがパニックしても接続は継続する
        // given (前提条件):
        let (connection, mut reader, mut peer) = create_test_session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let dispatcher = Dispatcher::new();
        dispatcher.set_handler(Arc::new(
            move |_id: &SessionId, frame: Frame| -> Result<(), HandlerError> {
                if frame.as_text() == Some("panic") {
                    panic!("handler blew up");
                }
                seen_clone.lock().unwrap().push(frame);
                Ok(())
            },
        ));

        // when (操作):
        peer.send("panic");
        peer.send("after");
        peer.close();
        let termination = dispatcher.run_read_loop(&connection, reader.as_mut()).await;

        // then (期待する結果):
        assert_eq!(termination, ReadTermination::PeerClosed);
        assert_eq!(*seen.lock().unwrap(), vec![Frame::from("after")]);
    }

    #[tokio::test]
    async fn test_transport_failure_ends_loop() {
        let (connection, mut reader, peer) = create_test_session();
        let dispatcher = Dispatcher::new();

        peer.fail(TransportError::Io("reset by peer".to_string()));
        let termination = dispatcher.run_read_loop(&connection, reader.as_mut()).await;

        assert_eq!(
            termination,
            ReadTermination::Failed(TransportError::Io("reset by peer".to_string()))
        );
    }

    #[tokio::test]
    async fn test_close_request_ends_loop() {
        // テスト項目: close 要求で read loop が終了する（ピアは接続したまま）
        // given (前提条件):
        let (connection, mut reader, _peer) = create_test_session();
        let dispatcher = Dispatcher::new();

        // when (操作):
        connection.request_close();
        let termination = dispatcher.run_read_loop(&connection, reader.as_mut()).await;

        // then (期待する結果):
        assert_eq!(termination, ReadTermination::CloseRequested);
    }

    #[tokio::test]
    async fn test_last_handler_wins() {
        // テスト項目: ハンドラを二度設定すると後のものだけが呼ばれる
        // given (前提条件):
        let session_id = SessionIdFactory::generate();
        let mut first = MockInboundHandler::new();
        first.expect_on_message().never();
        let mut second = MockInboundHandler::new();
        second
            .expect_on_message()
            .times(1)
            .returning(|_, _| Ok(()));
        let dispatcher = Dispatcher::new();
        assert!(!dispatcher.has_handler());

        // when (操作):
        dispatcher.set_handler(Arc::new(first));
        dispatcher.set_handler(Arc::new(second));
        dispatcher.dispatch(&session_id, Frame::from("hi")).await;

        // then (期待する結果):
        assert!(dispatcher.has_handler());
    }

    #[tokio::test]
    async fn test_dispatch_without_handler_is_noop() {
        let dispatcher = Dispatcher::new();

        dispatcher
            .dispatch(&SessionIdFactory::generate(), Frame::from("dropped"))
            .await;

        assert!(!dispatcher.has_handler());
    }
}
