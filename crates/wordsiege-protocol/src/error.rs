//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed JSON, missing fields, or an
    /// unknown message tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but violates protocol rules — e.g. a
    /// connection's first message was not `Hello`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
