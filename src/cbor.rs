//! Helpers for projecting decoded CBOR values into typed fields.
//!
//! The wire format is a generic key to value mapping; each decoding layer
//! reads the keys it recognizes and drops the rest. These helpers keep the
//! projection code short and the error messages uniform.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use serde_cbor::Value;

use crate::error::DecodeError;

/// Decode one CBOR item out of a byte buffer.
pub(crate) fn from_slice(data: &[u8], what: &str) -> Result<Value, DecodeError> {
    serde_cbor::from_slice(data)
        .map_err(|e| DecodeError::Structure(format!("{} is not valid CBOR: {}", what, e)))
}

pub(crate) fn text(value: Value, what: &str) -> Result<String, DecodeError> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(wrong_type(what, "text string", &other)),
    }
}

pub(crate) fn integer(value: Value, what: &str) -> Result<i64, DecodeError> {
    match value {
        Value::Integer(n) => i64::try_from(n)
            .map_err(|_| DecodeError::Type(format!("{} is out of range: {}", what, n))),
        other => Err(wrong_type(what, "integer", &other)),
    }
}

pub(crate) fn bytes(value: Value, what: &str) -> Result<Vec<u8>, DecodeError> {
    match value {
        Value::Bytes(b) => Ok(b),
        other => Err(wrong_type(what, "byte string", &other)),
    }
}

pub(crate) fn map(value: Value, what: &str) -> Result<BTreeMap<Value, Value>, DecodeError> {
    match value {
        Value::Map(m) => Ok(m),
        other => Err(DecodeError::Structure(format!(
            "{} is not a map (found {})",
            what,
            type_name(&other)
        ))),
    }
}

pub(crate) fn array(value: Value, what: &str) -> Result<Vec<Value>, DecodeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(DecodeError::Structure(format!(
            "{} is not an array (found {})",
            what,
            type_name(&other)
        ))),
    }
}

/// A readable name for a value's CBOR type, for error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Bytes(_) => "byte string",
        Value::Text(_) => "text string",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        _ => "unknown",
    }
}

fn wrong_type(what: &str, expected: &str, found: &Value) -> DecodeError {
    DecodeError::Type(format!(
        "{} is not a {} (found {})",
        what,
        expected,
        type_name(found)
    ))
}
