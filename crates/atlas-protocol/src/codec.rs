//! Codec trait and implementations for shipping records as bytes.
//!
//! The core hands out plain Rust values. A presentation shell that forwards
//! them over a socket, a queue, or a log file picks a [`Codec`] and stays
//! ignorant of the format.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so one codec can be shared by every session task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature (on by default).
///
/// ```rust
/// use atlas_protocol::{Codec, JsonCodec, PlayerId, SessionEvent, SessionKey};
///
/// let codec = JsonCodec;
/// let event = SessionEvent::Stopped { session: SessionKey(9), by: PlayerId(1) };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: SessionEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
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
    use crate::{AnswerStatus, SessionEvent, SessionKey};

    #[test]
    fn test_decode_rejects_garbage() {
        let result: Result<SessionEvent, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_variant() {
        let result: Result<SessionEvent, _> =
            JsonCodec.decode(br#"{"type":"Exploded","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_encodes_as_variant_name() {
        let bytes = JsonCodec.encode(&AnswerStatus::WrongLetter).unwrap();
        assert_eq!(bytes, br#""WrongLetter""#);
    }

    #[test]
    fn test_session_key_decodes_from_bare_number() {
        let key: SessionKey = JsonCodec.decode(b"12").unwrap();
        assert_eq!(key, SessionKey(12));
    }
}
