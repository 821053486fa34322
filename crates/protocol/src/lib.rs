//! Wire format for configuration snapshot sync.
//!
//! Protocol version 1. One frame type: `SnapshotFrame`, carrying the full
//! serialized backing data of one config file from the editing peer to the
//! session authority. Frames are JSON with the snapshot bytes as base64,
//! so the payload stays opaque to the transport and readable in captures.
//!
//! The snapshot content is owned by the storage layer; this crate only
//! guarantees the bytes arrive exactly as they were handed in.

use {
    base64::{Engine, engine::general_purpose::STANDARD},
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

// ── Constants ────────────────────────────────────────────────────────────────

pub const PROTOCOL_VERSION: u32 = 1;
/// Upper bound on the serialized snapshot; config files are small and a
/// frame past this is malformed or hostile, not a bigger config.
pub const MAX_SNAPSHOT_BYTES: usize = 262_144; // 256 KB

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("snapshot payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("unsupported protocol version {got} (expected {PROTOCOL_VERSION})")]
    Version { got: u32 },

    #[error("frame carries no file id")]
    MissingFileId,

    #[error("snapshot of {got} bytes exceeds the {MAX_SNAPSHOT_BYTES} byte limit")]
    Oversized { got: usize },
}

// ── Snapshot frame ───────────────────────────────────────────────────────────

/// Full-snapshot sync message for one config file.
///
/// Receivers replace their copy of `file_id` wholesale with the decoded
/// snapshot; there is no partial or merging form of this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFrame {
    pub version: u32,
    pub file_id: String,
    pub snapshot: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct WireFrame {
    #[serde(rename = "v")]
    version: u32,
    #[serde(rename = "fileId")]
    file_id: String,
    snapshot: String,
}

impl SnapshotFrame {
    pub fn new(file_id: impl Into<String>, snapshot: Vec<u8>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            file_id: file_id.into(),
            snapshot,
        }
    }

    /// Check the limits a frame must satisfy on both ends.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.version != PROTOCOL_VERSION {
            return Err(ProtocolError::Version { got: self.version });
        }
        if self.file_id.is_empty() {
            return Err(ProtocolError::MissingFileId);
        }
        if self.snapshot.len() > MAX_SNAPSHOT_BYTES {
            return Err(ProtocolError::Oversized {
                got: self.snapshot.len(),
            });
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        self.validate()?;
        let wire = WireFrame {
            version: self.version,
            file_id: self.file_id.clone(),
            snapshot: STANDARD.encode(&self.snapshot),
        };
        Ok(serde_json::to_vec(&wire)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let wire: WireFrame = serde_json::from_slice(bytes)?;
        let frame = Self {
            version: wire.version,
            file_id: wire.file_id,
            snapshot: STANDARD.decode(wire.snapshot)?,
        };
        frame.validate()?;
        Ok(frame)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_reproduces_snapshot_exactly() {
        let snapshot = b"[video]\nrender_distance = 16\n".to_vec();
        let frame = SnapshotFrame::new("hud-server", snapshot.clone());
        let decoded = SnapshotFrame::decode(&frame.encode().unwrap()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.snapshot, snapshot);
        assert_eq!(decoded.file_id, "hud-server");
        assert_eq!(decoded.version, PROTOCOL_VERSION);
    }

    #[test]
    fn snapshot_travels_as_base64_text() {
        let frame = SnapshotFrame::new("hud-server", vec![0xFF, 0x00, 0xFE]);
        let encoded = frame.encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(json["fileId"], "hud-server");
        assert_eq!(json["v"], PROTOCOL_VERSION);
        // Non-UTF-8 snapshot bytes still yield a printable field.
        assert!(json["snapshot"].as_str().is_some());
    }

    #[test]
    fn decode_rejects_other_versions() {
        let mut frame = SnapshotFrame::new("hud-server", b"x = 1\n".to_vec());
        frame.version = 2;
        assert!(matches!(frame.encode(), Err(ProtocolError::Version { got: 2 })));

        let raw = format!(
            "{{\"v\":7,\"fileId\":\"hud-server\",\"snapshot\":\"{}\"}}",
            STANDARD.encode(b"x = 1\n")
        );
        assert!(matches!(
            SnapshotFrame::decode(raw.as_bytes()),
            Err(ProtocolError::Version { got: 7 })
        ));
    }

    #[test]
    fn decode_rejects_empty_file_id() {
        let frame = SnapshotFrame::new("", b"x = 1\n".to_vec());
        assert!(matches!(frame.encode(), Err(ProtocolError::MissingFileId)));
    }

    #[test]
    fn oversized_snapshot_rejected_on_both_ends() {
        let frame = SnapshotFrame::new("hud-server", vec![b'#'; MAX_SNAPSHOT_BYTES + 1]);
        assert!(matches!(
            frame.encode(),
            Err(ProtocolError::Oversized { .. })
        ));

        let raw = format!(
            "{{\"v\":1,\"fileId\":\"hud-server\",\"snapshot\":\"{}\"}}",
            STANDARD.encode(vec![b'#'; MAX_SNAPSHOT_BYTES + 1])
        );
        assert!(matches!(
            SnapshotFrame::decode(raw.as_bytes()),
            Err(ProtocolError::Oversized { .. })
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            SnapshotFrame::decode(b"not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            SnapshotFrame::decode(br#"{"v":1,"fileId":"f","snapshot":"!!!"}"#),
            Err(ProtocolError::Encoding(_))
        ));
    }

    #[test]
    fn empty_snapshot_is_a_valid_frame() {
        let frame = SnapshotFrame::new("hud-server", Vec::new());
        let decoded = SnapshotFrame::decode(&frame.encode().unwrap()).unwrap();
        assert!(decoded.snapshot.is_empty());
    }
}
