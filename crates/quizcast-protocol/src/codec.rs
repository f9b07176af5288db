//! Codec trait and implementations for turning messages into bytes.
//!
//! The session layer only moves opaque byte buffers around. Everything
//! above it works with typed [`HostMessage`](crate::HostMessage) and
//! [`PlayerMessage`](crate::PlayerMessage) values, and a [`Codec`] sits in
//! between. Swapping the wire format means swapping the codec; nothing
//! else changes.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because a codec lives inside the peer actor,
/// which Tokio may move between worker threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented
    /// in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or describe a different type. Callers drop such
    /// messages and keep going.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// JSON keeps the traffic readable in logs, and the messages are small
/// (a scoreboard for a handful of players), so size is not a concern.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ```rust
/// use quizcast_protocol::{Codec, JsonCodec, PlayerId, PlayerMessage, PlayerPayload};
///
/// let codec = JsonCodec;
/// let msg = PlayerMessage::new(PlayerId(1), "Ada", PlayerPayload::Join);
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: PlayerMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{HostMessage, HostPayload, PlayerMessage};

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<HostMessage, _> = JsonCodec.decode(b"\x00\x01not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_truncated_returns_decode_error() {
        let bytes = JsonCodec
            .encode(&HostMessage::new(HostPayload::Scoreboard {
                player_scores: vec![],
            }))
            .unwrap();
        let result: Result<HostMessage, _> = JsonCodec.decode(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_family_fails() {
        // A host message has no player_id, so it cannot pass as a
        // player message.
        let bytes = JsonCodec
            .encode(&HostMessage::new(HostPayload::GameOver {
                player_scores: vec![],
            }))
            .unwrap();
        let result: Result<PlayerMessage, _> = JsonCodec.decode(&bytes);
        assert!(result.is_err());
    }
}
