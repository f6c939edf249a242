//! Duplex, message-framed transport abstraction.
//!
//! The hub never touches sockets directly. An upgraded connection is handed
//! over as a [`Transport`], which splits into one read half owned by the
//! session's read loop and one write half owned by the registry entry.

use async_trait::async_trait;

use super::{Frame, error::TransportError};

/// Read half of a transport.
#[async_trait]
pub trait FrameReader: Send {
    /// Wait for the next inbound frame.
    ///
    /// Control frames (ping/pong) are handled by the implementation and never
    /// returned. Peer close is reported as `TransportError::Closed`; after any
    /// error the reader must not be polled again.
    async fn read_frame(&mut self) -> Result<Frame, TransportError>;
}

/// Write half of a transport.
#[async_trait]
pub trait FrameWriter: Send {
    /// Write one whole frame.
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Close the transport. Closing twice is not an error.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// A freshly upgraded duplex connection.
pub trait Transport: Send + 'static {
    fn into_split(self) -> (Box<dyn FrameReader>, Box<dyn FrameWriter>);
}
