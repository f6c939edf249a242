//! UseCase: ブロードキャスト送信処理
//!
//! 呼び出し時点のスナップショットに含まれる全セッションへ送信する。
//! スナップショット取得後に登録されたセッションには届かないことがある。

use std::sync::Arc;

use futures_util::future::join_all;

use crate::domain::{Frame, SessionId, SessionRepository, TransportError};

/// ブロードキャスト 1 回分の結果
///
/// 一部の失敗は想定内。遅い・切れたピアがいても他のセッションへの配信は止まらない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: Vec<SessionId>,
    pub failed: Vec<(SessionId, TransportError)>,
}

impl BroadcastReport {
    /// スナップショットに含まれていたセッション数
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    /// 全セッションに配信できたか
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// ブロードキャスト送信のユースケース
pub struct BroadcastMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl BroadcastMessageUseCase {
    /// 新しい BroadcastMessageUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// ブロードキャストを実行
    ///
    /// 各セッションへの書き込みは並行に行う。1 つの接続へのフレームは、
    /// その接続のロックの下で 1 回の書き込みとして届く。
    /// 書き込みは接続ごとのタイムアウトで打ち切られるため、詰まったピアが全体を止めることはない。
    pub async fn execute(&self, frame: Frame) -> BroadcastReport {
        let targets = self.repository.snapshot().await;

        let results = join_all(targets.into_iter().map(|(session_id, connection)| {
            let frame = frame.clone();
            async move { (session_id, connection.send(frame).await) }
        }))
        .await;

        let mut report = BroadcastReport::default();
        for (session_id, result) in results {
            match result {
                Ok(()) => report.delivered.push(session_id),
                Err(e) => {
                    tracing::warn!("Failed to broadcast to session '{}': {}", session_id, e);
                    report.failed.push((session_id, e));
                }
            }
        }

        tracing::debug!(
            "Broadcast delivered to {}/{} sessions",
            report.delivered.len(),
            report.attempted()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Transport,
        infrastructure::{repository::InMemorySessionRepository, transport::channel_transport},
    };

    #[tokio::test]
    async fn test_broadcast_reaches_every_session() {
        // テスト項目: 全セッションにちょうど一度ずつ届く
        // given (前提条件):
        let repository = Arc::new(InMemorySessionRepository::new());
        let usecase = BroadcastMessageUseCase::new(repository.clone());
        let mut peers = Vec::new();
        for _ in 0..3 {
            let (transport, peer) = channel_transport();
            repository.register(transport.into_split().1).await.unwrap();
            peers.push(peer);
        }

        // when (操作):
        let report = usecase.execute(Frame::from("x")).await;

        // then (期待する結果):
        assert_eq!(report.delivered.len(), 3);
        assert!(report.is_complete());
        for peer in peers.iter_mut() {
            assert_eq!(peer.try_recv(), Some(Frame::from("x")));
            assert_eq!(peer.try_recv(), None);
        }
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 一部の送信失敗は他の送信を止めず、まとめて報告される
        // given (前提条件):
        let repository = Arc::new(InMemorySessionRepository::new());
        let usecase = BroadcastMessageUseCase::new(repository.clone());
        let (ok_transport, mut ok_peer) = channel_transport();
        let (bad_transport, mut bad_peer) = channel_transport();
        let ok = repository.register(ok_transport.into_split().1).await.unwrap();
        let bad = repository.register(bad_transport.into_split().1).await.unwrap();
        bad_peer.stop_receiving();

        // when (操作):
        let report = usecase.execute(Frame::from("y")).await;

        // then (期待する結果):
        assert_eq!(report.delivered, vec![ok.id()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad.id());
        assert_eq!(ok_peer.try_recv(), Some(Frame::from("y")));
        // 失敗しても登録は維持される
        assert_eq!(repository.count().await, 2);
    }

    #[tokio::test]
    async fn test_broadcast_with_no_sessions() {
        let usecase = BroadcastMessageUseCase::new(Arc::new(InMemorySessionRepository::new()));

        let report = usecase.execute(Frame::from("nobody")).await;

        assert_eq!(report.attempted(), 0);
    }
}
