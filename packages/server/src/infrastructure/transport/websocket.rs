//! axum WebSocket adapter for the transport traits.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::domain::{Frame, FrameReader, FrameWriter, Transport, TransportError};

/// An upgraded axum WebSocket, ready to be accepted by a hub.
pub struct WebSocketTransport(WebSocket);

impl WebSocketTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self(socket)
    }
}

impl Transport for WebSocketTransport {
    fn into_split(self) -> (Box<dyn FrameReader>, Box<dyn FrameWriter>) {
        let (sender, receiver) = self.0.split();
        (
            Box::new(WebSocketReader(receiver)),
            Box::new(WebSocketWriter(sender)),
        )
    }
}

struct WebSocketReader(SplitStream<WebSocket>);

#[async_trait]
impl FrameReader for WebSocketReader {
    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        loop {
            let msg = match self.0.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(TransportError::Io(e.to_string())),
                None => return Err(TransportError::Closed),
            };

            match msg {
                Message::Text(text) => return Ok(Frame::Text(text.as_str().to_owned())),
                Message::Binary(bytes) => return Ok(Frame::Binary(bytes.to_vec())),
                Message::Close(frame) => {
                    tracing::debug!("Peer sent close frame: {:?}", frame);
                    return Err(TransportError::Closed);
                }
                // Pongs are queued by tungstenite and flushed with the next write
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }
}

struct WebSocketWriter(SplitSink<WebSocket, Message>);

#[async_trait]
impl FrameWriter for WebSocketWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let msg = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(bytes) => Message::Binary(bytes.into()),
        };
        self.0
            .send(msg)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.0
            .close()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}
