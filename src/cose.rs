//! COSE_Sign1-style envelope decoding.
//!
//! The envelope is a fixed four element CBOR array: protected header bytes,
//! unprotected header map, payload bytes and signature bytes. The signature
//! is carried through untouched; verifying it requires the issuing
//! countries' public keys and is out of scope here.

use std::convert::TryFrom;

use serde_cbor::Value;

use crate::cbor;
use crate::error::DecodeError;

const HEADER_ALG: i128 = 1;
const HEADER_KID: i128 = 4;

/// The signed envelope wrapping the certificate payload.
#[derive(Debug, PartialEq)]
pub struct Envelope {
    pub protected: Vec<u8>,
    pub unprotected: Header,
    pub payload: Vec<u8>,
    /// Kept so the envelope can later grow verification; never inspected.
    pub signature: Vec<u8>,
}

/// Recognized unprotected header parameters. Unknown keys are dropped.
#[derive(Debug, Default, PartialEq)]
pub struct Header {
    pub algorithm: Option<i64>,
    pub key_id: Option<Vec<u8>>,
}

/// Decode the outer envelope without interpreting the payload.
pub fn decode(data: &[u8]) -> Result<Envelope, DecodeError> {
    let value = cbor::from_slice(data, "envelope")?;
    let items = cbor::array(value, "envelope")?;
    let [protected, unprotected, payload, signature] = <[Value; 4]>::try_from(items)
        .map_err(|items| {
            DecodeError::Structure(format!(
                "envelope has {} elements, expected 4",
                items.len()
            ))
        })?;

    Ok(Envelope {
        protected: element_bytes(protected, "protected header")?,
        unprotected: decode_header(unprotected)?,
        payload: element_bytes(payload, "payload")?,
        signature: element_bytes(signature, "signature")?,
    })
}

// A positional element of the wrong type is a malformed envelope, not a
// field type mismatch.
fn element_bytes(value: Value, what: &str) -> Result<Vec<u8>, DecodeError> {
    match value {
        Value::Bytes(b) => Ok(b),
        other => Err(DecodeError::Structure(format!(
            "envelope {} is not a byte string (found {})",
            what,
            cbor::type_name(&other)
        ))),
    }
}

fn decode_header(value: Value) -> Result<Header, DecodeError> {
    let map = cbor::map(value, "unprotected header")?;
    let mut header = Header::default();
    for (key, value) in map {
        let key = match key {
            Value::Integer(key) => key,
            _ => continue,
        };
        match key {
            HEADER_ALG => header.algorithm = Some(cbor::integer(value, "algorithm header")?),
            HEADER_KID => header.key_id = Some(cbor::bytes(value, "key id header")?),
            _ => {}
        }
    }
    Ok(header)
}
