//! In-process transport backed by tokio channels.
//!
//! Lets code inside the process (bots, tests) hold a session on a hub exactly
//! like a remote WebSocket client would, with the far end exposed as a
//! [`ChannelPeer`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Frame, FrameReader, FrameWriter, Transport, TransportError};

/// Hub side of an in-process connection.
pub struct ChannelTransport {
    inbound: mpsc::UnboundedReceiver<Result<Frame, TransportError>>,
    outbound: mpsc::UnboundedSender<Frame>,
}

/// Far end of a [`ChannelTransport`].
pub struct ChannelPeer {
    to_hub: Option<mpsc::UnboundedSender<Result<Frame, TransportError>>>,
    from_hub: mpsc::UnboundedReceiver<Frame>,
}

/// Create a connected transport / peer pair.
pub fn channel_transport() -> (ChannelTransport, ChannelPeer) {
    let (to_hub, inbound) = mpsc::unbounded_channel();
    let (outbound, from_hub) = mpsc::unbounded_channel();
    (
        ChannelTransport { inbound, outbound },
        ChannelPeer {
            to_hub: Some(to_hub),
            from_hub,
        },
    )
}

impl ChannelPeer {
    /// Send a frame to the hub. Returns `false` once the hub side is gone.
    pub fn send(&self, frame: impl Into<Frame>) -> bool {
        self.to_hub
            .as_ref()
            .is_some_and(|tx| tx.send(Ok(frame.into())).is_ok())
    }

    /// Make the hub's next read fail with `error`.
    pub fn fail(&self, error: TransportError) -> bool {
        self.to_hub
            .as_ref()
            .is_some_and(|tx| tx.send(Err(error)).is_ok())
    }

    /// Close the peer's sending direction; the hub reads `Closed` next.
    pub fn close(&mut self) {
        self.to_hub = None;
    }

    /// Stop accepting frames from the hub; hub writes fail from now on while
    /// its reads keep working.
    pub fn stop_receiving(&mut self) {
        self.from_hub.close();
    }

    /// Next frame written by the hub, `None` once the hub closed the transport.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.from_hub.recv().await
    }

    /// Next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.from_hub.try_recv().ok()
    }
}

impl Transport for ChannelTransport {
    fn into_split(self) -> (Box<dyn FrameReader>, Box<dyn FrameWriter>) {
        (
            Box::new(ChannelReader(self.inbound)),
            Box::new(ChannelWriter(Some(self.outbound))),
        )
    }
}

struct ChannelReader(mpsc::UnboundedReceiver<Result<Frame, TransportError>>);

#[async_trait]
impl FrameReader for ChannelReader {
    async fn read_frame(&mut self) -> Result<Frame, TransportError> {
        self.0.recv().await.unwrap_or(Err(TransportError::Closed))
    }
}

struct ChannelWriter(Option<mpsc::UnboundedSender<Frame>>);

#[async_trait]
impl FrameWriter for ChannelWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let tx = self.0.as_ref().ok_or(TransportError::Closed)?;
        tx.send(frame)
            .map_err(|_| TransportError::Io("peer stopped receiving".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.0 = None;
        Ok(())
    }
}
