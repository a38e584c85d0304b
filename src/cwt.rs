//! CWT claims decoding for the certificate payload.
//!
//! The envelope payload is a CBOR map keyed by small integers: 1 holds the
//! issuer country, 4 the expiry and 6 the issued-at timestamp. The
//! certificate itself sits under the -260 health certificate claim, wrapped
//! in one more map keyed by 1.

use serde_cbor::Value;
use serde_derive::Serialize;

use crate::cbor;
use crate::dcc::{self, Certificate};
use crate::error::DecodeError;

const CLAIM_ISSUER: i128 = 1;
const CLAIM_EXPIRY: i128 = 4;
const CLAIM_ISSUED_AT: i128 = 6;
const CLAIM_HCERT: i128 = -260;
const HCERT_CERTIFICATE: i128 = 1;

/// The decoded claims of one certificate QR payload.
#[derive(Debug, PartialEq, Serialize)]
pub struct CertificatePayload {
    pub issuer_country: String,
    pub expiry: i64,
    pub issued_at: i64,
    pub certificate: Certificate,
}

/// Decode the envelope payload bytes.
///
/// The issuer, expiry and issued-at claims are optional per RFC 8392 and
/// default to their zero values when absent. The health certificate claim
/// is what the caller is here for, so its absence is an error.
pub fn decode(data: &[u8]) -> Result<CertificatePayload, DecodeError> {
    let value = cbor::from_slice(data, "payload")?;
    let map = cbor::map(value, "payload")?;

    let mut issuer_country = String::new();
    let mut expiry = 0;
    let mut issued_at = 0;
    let mut certificate = None;

    for (key, value) in map {
        let key = match key {
            Value::Integer(key) => key,
            _ => continue,
        };
        match key {
            CLAIM_ISSUER => issuer_country = cbor::text(value, "issuer country claim")?,
            CLAIM_EXPIRY => expiry = cbor::integer(value, "expiry claim")?,
            CLAIM_ISSUED_AT => issued_at = cbor::integer(value, "issued-at claim")?,
            CLAIM_HCERT => certificate = Some(decode_hcert(value)?),
            _ => {}
        }
    }

    let certificate = certificate.ok_or_else(|| {
        DecodeError::Structure("payload has no health certificate claim".into())
    })?;

    Ok(CertificatePayload {
        issuer_country,
        expiry,
        issued_at,
        certificate,
    })
}

fn decode_hcert(value: Value) -> Result<Certificate, DecodeError> {
    let mut map = cbor::map(value, "health certificate claim")?;
    match map.remove(&Value::Integer(HCERT_CERTIFICATE)) {
        Some(value) => dcc::decode(value),
        None => Err(DecodeError::Structure(
            "health certificate claim has no certificate entry".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    fn minimal_certificate() -> Value {
        let mut name = BTreeMap::new();
        name.insert(text("gn"), text("ERIKA"));
        name.insert(text("gnt"), text("ERIKA"));
        name.insert(text("fn"), text("MUSTERMANN"));
        name.insert(text("fnt"), text("MUSTERMANN"));
        let mut certificate = BTreeMap::new();
        certificate.insert(text("ver"), text("1.3.0"));
        certificate.insert(text("nam"), Value::Map(name));
        certificate.insert(text("dob"), text("1964-08-12"));
        Value::Map(certificate)
    }

    fn hcert_claim() -> Value {
        let mut wrapper = BTreeMap::new();
        wrapper.insert(Value::Integer(1), minimal_certificate());
        Value::Map(wrapper)
    }

    fn payload_bytes(claims: BTreeMap<Value, Value>) -> Vec<u8> {
        serde_cbor::to_vec(&Value::Map(claims)).unwrap()
    }

    #[test]
    fn decodes_all_claims() {
        let mut claims = BTreeMap::new();
        claims.insert(Value::Integer(1), text("DE"));
        claims.insert(Value::Integer(4), Value::Integer(1688054400));
        claims.insert(Value::Integer(6), Value::Integer(1623456000));
        claims.insert(Value::Integer(-260), hcert_claim());

        let payload = decode(&payload_bytes(claims)).unwrap();
        assert_eq!(payload.issuer_country, "DE");
        assert_eq!(payload.expiry, 1688054400);
        assert_eq!(payload.issued_at, 1623456000);
        assert_eq!(payload.certificate.name.first_name, "ERIKA");
    }

    #[test]
    fn missing_claims_default_to_zero_values() {
        let mut claims = BTreeMap::new();
        claims.insert(Value::Integer(-260), hcert_claim());

        let payload = decode(&payload_bytes(claims)).unwrap();
        assert_eq!(payload.issuer_country, "");
        assert_eq!(payload.expiry, 0);
        assert_eq!(payload.issued_at, 0);
    }

    #[test]
    fn unknown_claims_are_ignored() {
        let mut claims = BTreeMap::new();
        claims.insert(Value::Integer(2), text("subject"));
        claims.insert(Value::Integer(-7), Value::Integer(12));
        claims.insert(text("txt"), Value::Integer(0));
        claims.insert(Value::Integer(-260), hcert_claim());

        assert!(decode(&payload_bytes(claims)).is_ok());
    }

    #[test]
    fn missing_health_certificate_claim_is_an_error() {
        let mut claims = BTreeMap::new();
        claims.insert(Value::Integer(1), text("DE"));

        assert!(matches!(
            decode(&payload_bytes(claims)),
            Err(DecodeError::Structure(_))
        ));
    }

    #[test]
    fn wrapper_without_certificate_entry_is_an_error() {
        let mut claims = BTreeMap::new();
        claims.insert(Value::Integer(-260), Value::Map(BTreeMap::new()));

        assert!(matches!(
            decode(&payload_bytes(claims)),
            Err(DecodeError::Structure(_))
        ));
    }

    #[test]
    fn wrongly_typed_claim_is_an_error() {
        let mut claims = BTreeMap::new();
        claims.insert(Value::Integer(1), Value::Integer(276));
        claims.insert(Value::Integer(-260), hcert_claim());

        assert!(matches!(
            decode(&payload_bytes(claims)),
            Err(DecodeError::Type(_))
        ));
    }

    #[test]
    fn non_map_payload_is_an_error() {
        let data = serde_cbor::to_vec(&Value::Array(Vec::new())).unwrap();
        assert!(matches!(decode(&data), Err(DecodeError::Structure(_))));
    }
}
