//! Codec trait and implementations for (de)serializing wire frames.
//!
//! The protocol layer does not care how messages become frames — it
//! only needs something implementing [`Codec`]. Frames are `String`s
//! because every transport frame in this protocol is text-encoded.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts between Rust values and text frames.
///
/// `Send + Sync + 'static` because a codec is shared with the
/// connection task and lives as long as the client.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a single text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed,
    /// lacks a recognized discriminant, or does not match the expected
    /// shape.
    fn decode<T: DeserializeOwned>(
        &self,
        frame: &str,
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that speaks JSON via `serde_json`.
///
/// Behind the default-on `json` feature so alternative wire encodings
/// can be compiled in without dragging `serde_json` along.
///
/// ## Example
///
/// ```rust
/// use padlink_protocol::{Codec, JsonCodec, Message};
///
/// let codec = JsonCodec;
/// let frame = codec.encode(&Message::NameOk).unwrap();
/// let decoded: Message = codec.decode(&frame).unwrap();
/// assert_eq!(decoded, Message::NameOk);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        frame: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Message, PlayerColor};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let msg = Message::PlayerColor {
            color: PlayerColor::Red,
        };

        let frame = codec.encode(&msg).unwrap();
        let decoded: Message = codec.decode(&frame).unwrap();

        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_json_codec_decode_rejects_missing_discriminant() {
        let codec = JsonCodec;
        let result: Result<Message, _> = codec.decode(r#"{"name":"x"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
