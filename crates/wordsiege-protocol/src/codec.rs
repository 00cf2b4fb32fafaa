//! Codec trait and implementations for serializing messages.
//!
//! The gateway doesn't care how messages become bytes — it works against
//! the [`Codec`] trait. [`JsonCodec`] is the default (human-readable,
//! debuggable from browser DevTools); a binary codec can be slotted in
//! without touching the rest of the stack.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts Rust types to bytes and back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
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
    use crate::{ClientMessage, Notification, PlayerId};

    #[test]
    fn test_json_codec_round_trips_client_message() {
        let codec = JsonCodec;
        let msg = ClientMessage::ConfirmHit;
        let bytes = codec.encode(&msg).unwrap();
        let decoded: ClientMessage = codec.decode(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_json_codec_round_trips_notification() {
        let codec = JsonCodec;
        let msg = Notification::Welcome {
            player_id: PlayerId(9),
        };
        let bytes = codec.encode(&msg).unwrap();
        let decoded: Notification = codec.decode(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_fails() {
        let codec = JsonCodec;
        let result: Result<ClientMessage, _> = codec.decode(b"not json");
        assert!(result.is_err());
    }
}
