//! The seam to the host's messaging layer.
//!
//! The core never frames, retries, or acknowledges; it hands one payload
//! to one peer and moves on.

use {async_trait::async_trait, std::fmt, thiserror::Error, tracing::debug};

/// Opaque address of one reachable peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Send failed. Callers log and drop; delivery is at most once and the
/// core never retries.
#[derive(Debug, Error)]
#[error("send to {peer} failed: {message}")]
pub struct TransportError {
    pub peer: PeerId,
    pub message: String,
}

impl TransportError {
    pub fn new(peer: PeerId, message: impl Into<String>) -> Self {
        Self {
            peer,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, peer: &PeerId, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Swallows every payload. Lets a host run the editing surfaces before
/// its messaging layer is wired in.
#[derive(Debug, Default, Clone)]
pub struct NoopTransport;

#[async_trait]
impl Transport for NoopTransport {
    async fn send(&self, peer: &PeerId, payload: Vec<u8>) -> Result<(), TransportError> {
        debug!(%peer, bytes = payload.len(), "transport not configured, payload dropped");
        Ok(())
    }
}
