//! Error types for the protocol layer.

/// Errors raised while turning protocol values into bytes or back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `type` tag,
    /// or missing required fields.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but makes no sense at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
