//! Byte-level codec adapters.
//!
//! The registry never looks at payload bytes itself: every encode and decode
//! goes through a [`Codec`]. [`WireCodec`] covers the two formats the crate
//! ships with; anything else can be plugged in by implementing the trait.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    #[error("{0}")]
    Custom(String),
}

/// Serialization backend used by a registry.
pub trait Codec: Clone + Send + Sync + 'static {
    /// Short format name, used in logs.
    fn name(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode exactly one value; bytes left over after it are an error.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// Built-in codecs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireCodec {
    /// MessagePack with named struct fields
    #[default]
    MsgPack,
    Json,
}

impl Codec for WireCodec {
    fn name(&self) -> &'static str {
        match self {
            WireCodec::MsgPack => "msgpack",
            WireCodec::Json => "json",
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            WireCodec::MsgPack => Ok(rmp_serde::to_vec_named(value)?),
            WireCodec::Json => Ok(serde_json::to_vec(value)?),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            WireCodec::MsgPack => {
                let mut cursor = Cursor::new(bytes);
                let value = rmp_serde::decode::from_read(&mut cursor)?;
                let consumed = cursor.position() as usize;
                if consumed < bytes.len() {
                    return Err(CodecError::TrailingBytes(bytes.len() - consumed));
                }
                Ok(value)
            }
            // serde_json already rejects trailing non-whitespace
            WireCodec::Json => Ok(serde_json::from_slice(bytes)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        uid: String,
        level: u32,
    }

    fn sample() -> Sample {
        Sample {
            uid: "123321".into(),
            level: 7,
        }
    }

    #[test]
    fn test_msgpack_round_trip() {
        let codec = WireCodec::MsgPack;
        let bytes = codec.encode(&sample()).unwrap();
        let back: Sample = codec.decode(&bytes).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_json_round_trip() {
        let codec = WireCodec::Json;
        let bytes = codec.encode(&sample()).unwrap();
        assert_eq!(bytes.first(), Some(&b'{'));
        let back: Sample = codec.decode(&bytes).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_msgpack_rejects_truncated_payload() {
        let codec = WireCodec::MsgPack;
        let bytes = codec.encode(&sample()).unwrap();
        let result: Result<Sample, _> = codec.decode(&bytes[..bytes.len() - 2]);
        assert!(matches!(result, Err(CodecError::MsgPackDecode(_))));
    }

    #[test]
    fn test_msgpack_rejects_trailing_bytes() {
        let codec = WireCodec::MsgPack;
        let mut bytes = codec.encode(&sample()).unwrap();
        bytes.extend_from_slice(&[0x01, 0x02]);
        let result: Result<Sample, _> = codec.decode(&bytes);
        assert!(matches!(result, Err(CodecError::TrailingBytes(2))));
    }

    #[test]
    fn test_msgpack_rejects_empty_payload() {
        let result: Result<Sample, _> = WireCodec::MsgPack.decode(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_rejects_garbage() {
        let result: Result<Sample, _> = WireCodec::Json.decode(b"{\"uid\":");
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn test_wire_codec_config_names() {
        let codec: WireCodec = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(codec, WireCodec::Json);
        assert_eq!(WireCodec::default().name(), "msgpack");
    }
}
