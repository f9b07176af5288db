//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding messages.
///
/// A decode failure is never fatal to a game: the receiver logs it and
/// drops the message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (Rust value to bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (bytes to Rust value): malformed input,
    /// missing fields, or an unknown `"type"` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
