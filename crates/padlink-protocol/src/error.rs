//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire frames.
///
/// A `ProtocolError` always means the problem is in serialization —
/// never in networking or connection state. Those concerns have their
/// own error types in the layers above.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into a frame).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed.
    ///
    /// This covers malformed JSON, a missing `"type"` discriminant, an
    /// unrecognized discriminant value, and fields of the wrong shape.
    /// The protocol treats all of these as a corrupt or incompatible
    /// peer, not as something to skip over.
    #[cfg(feature = "json")]
    #[error("invalid message format: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
