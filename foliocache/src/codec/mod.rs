//! JSON codec between typed values and cached bytes.
//!
//! The cache stores opaque bytes; this layer is the only place that knows
//! they are JSON. Any `Serialize`/`DeserializeOwned` type can be stored
//! without the cache knowing its shape.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from encoding or decoding cached values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be represented as JSON.
    #[error("Encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The bytes are not valid JSON or do not match the target type.
    #[error("Decoding failed: {0}")]
    Decoding(#[source] serde_json::Error),
}

/// Stateless JSON codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `value` to JSON bytes.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::Encoding)
    }

    /// Deserialize JSON bytes into `T`.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decoding)
    }
}

/// Serialize `value` with [`JsonCodec`].
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    JsonCodec.encode(value)
}

/// Deserialize `bytes` with [`JsonCodec`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    JsonCodec.decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        symbol: String,
        quantity: i64,
        price: Option<String>,
        tags: Vec<String>,
    }

    #[test]
    fn test_decode_malformed_bytes() {
        let result: Result<Record, _> = decode(b"{not json");
        assert!(matches!(result, Err(CodecError::Decoding(_))));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let result: Result<Record, _> = decode(br#"{"symbol": 5}"#);
        assert!(matches!(result, Err(CodecError::Decoding(_))));
    }

    #[test]
    fn test_encode_non_string_map_keys_fails() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        assert!(matches!(encode(&map), Err(CodecError::Encoding(_))));
    }

    #[test]
    fn test_encode_is_plain_json() {
        let bytes = encode(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(bytes, br#"{"a":1}"#.to_vec());
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(
            symbol in "[A-Z]{1,8}",
            quantity in any::<i64>(),
            price in proptest::option::of("[0-9]{1,5}\\.[0-9]{2}"),
            tags in proptest::collection::vec("\\PC{0,12}", 0..4),
        ) {
            let record = Record { symbol, quantity, price, tags };
            let bytes = encode(&record).unwrap();
            let decoded: Record = decode(&bytes).unwrap();
            prop_assert_eq!(decoded, record);
        }
    }
}
