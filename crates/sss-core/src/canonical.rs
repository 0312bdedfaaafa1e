//! # Canonical Serialization — JCS Bytes for Evidence Hashing
//!
//! `CanonicalBytes` is the only input accepted by [`crate::sha256_digest`].
//! A structured KYC evidence record is serialized with RFC 8785 (JSON
//! Canonicalization Scheme) so that the 32-byte hash anchored in a whitelist
//! entry does not depend on field order or whitespace.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private and the only constructor is
//! [`CanonicalBytes::new`]. Floats are rejected: amounts in evidence must be
//! integers or strings, because float formatting is not stable across
//! producers.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number;
    /// `SerializationFailed` if JSON serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let bytes = serde_jcs::to_vec(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Number(n) if n.is_f64() => Err(CanonicalizationError::FloatRejected(
            n.as_f64().unwrap_or(f64::NAN),
        )),
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_is_irrelevant() {
        let a = serde_json::json!({"level": "enhanced", "document": "passport", "score": 3});
        let b = serde_json::json!({"score": 3, "document": "passport", "level": "enhanced"});
        assert_eq!(
            CanonicalBytes::new(&a).unwrap(),
            CanonicalBytes::new(&b).unwrap()
        );
    }

    #[test]
    fn test_compact_sorted_output() {
        let v = serde_json::json!({"b": 1, "a": [true, null]});
        let cb = CanonicalBytes::new(&v).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"a":[true,null],"b":1}"#);
    }

    #[test]
    fn test_nested_float_rejected() {
        let v = serde_json::json!({"outer": {"amount": 1.5}});
        assert!(matches!(
            CanonicalBytes::new(&v),
            Err(CanonicalizationError::FloatRejected(_))
        ));
    }

    #[test]
    fn test_large_integers_accepted() {
        let v = serde_json::json!({"amount": u64::MAX});
        assert!(CanonicalBytes::new(&v).is_ok());
    }
}
