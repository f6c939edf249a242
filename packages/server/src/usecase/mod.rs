//! UseCase 層
//!
//! ハブの振る舞いを実装するレイヤー。
//! Hub ファサードから呼び出され、Domain 層を操作します。

pub mod broadcast_message;
pub mod close_session;
pub mod connect_session;
pub mod disconnect_session;
pub mod dispatch;
pub mod error;
pub mod send_message;

pub use broadcast_message::{BroadcastMessageUseCase, BroadcastReport};
pub use close_session::CloseSessionUseCase;
pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use dispatch::{Dispatcher, InboundHandler, ReadTermination};
pub use error::{CloseSessionError, ConnectError, HandlerError, SendMessageError};
pub use send_message::SendMessageUseCase;
