//! Schema mapping for the EU Digital COVID Certificate.
//!
//! Field tags follow release 1.3.0 of the DCC schema:
//! https://github.com/ehn-dcc-development/ehn-dcc-schema
//!
//! Decoding is schema-lenient: unknown tags are dropped at every nesting
//! level so minor schema drift does not break decoding. Test result (`t`)
//! entries are not implemented and fall out the same way.

use std::collections::BTreeMap;

use serde_cbor::Value;
use serde_derive::Serialize;

use crate::cbor;
use crate::error::DecodeError;

#[derive(Debug, PartialEq, Serialize)]
pub struct Certificate {
    pub name: Name,
    pub date_of_birth: String,
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vaccine_entries: Vec<VaccineEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recovery_entries: Vec<RecoveryEntry>,
}

/// The holder's name, in both free-text and ICAO 9303 transliterated form.
#[derive(Debug, PartialEq, Serialize)]
pub struct Name {
    pub first_name: String,
    pub first_name_standardized: String,
    pub last_name: String,
    pub last_name_standardized: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct VaccineEntry {
    pub target: String,
    pub vaccine_or_prophylaxis: String,
    pub medicinal_product: String,
    pub marketing_auth_holder: String,
    pub dose_number: i64,
    pub total_series_of_doses: i64,
    pub date_of_vaccination: String,
    pub country_of_vaccination: String,
    pub certificate_issuer: String,
    pub unique_certificate_identifier: String,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct RecoveryEntry {
    pub target: String,
    pub first_positive_result_date: String,
    pub country_of_test: String,
    pub certificate_issuer: String,
    pub certificate_valid_from: String,
    pub certificate_valid_until: String,
    pub unique_certificate_identifier: String,
}

type Fields = BTreeMap<Value, Value>;

/// Map the certificate CBOR map into the typed record.
pub fn decode(value: Value) -> Result<Certificate, DecodeError> {
    let mut map = cbor::map(value, "certificate")?;
    Ok(Certificate {
        name: decode_name(required(&mut map, "nam", "certificate")?)?,
        date_of_birth: req_text(&mut map, "dob", "certificate")?,
        version: req_text(&mut map, "ver", "certificate")?,
        vaccine_entries: entries(&mut map, "v", decode_vaccine)?,
        recovery_entries: entries(&mut map, "r", decode_recovery)?,
    })
}

fn decode_name(value: Value) -> Result<Name, DecodeError> {
    let mut map = cbor::map(value, "name")?;
    Ok(Name {
        first_name: req_text(&mut map, "gn", "name")?,
        first_name_standardized: req_text(&mut map, "gnt", "name")?,
        last_name: req_text(&mut map, "fn", "name")?,
        last_name_standardized: req_text(&mut map, "fnt", "name")?,
    })
}

fn decode_vaccine(value: Value) -> Result<VaccineEntry, DecodeError> {
    let mut map = cbor::map(value, "vaccine entry")?;
    Ok(VaccineEntry {
        target: req_text(&mut map, "tg", "vaccine entry")?,
        vaccine_or_prophylaxis: req_text(&mut map, "vp", "vaccine entry")?,
        medicinal_product: req_text(&mut map, "mp", "vaccine entry")?,
        marketing_auth_holder: req_text(&mut map, "ma", "vaccine entry")?,
        dose_number: req_integer(&mut map, "dn", "vaccine entry")?,
        total_series_of_doses: req_integer(&mut map, "sd", "vaccine entry")?,
        date_of_vaccination: req_text(&mut map, "dt", "vaccine entry")?,
        country_of_vaccination: req_text(&mut map, "co", "vaccine entry")?,
        certificate_issuer: req_text(&mut map, "is", "vaccine entry")?,
        unique_certificate_identifier: req_text(&mut map, "ci", "vaccine entry")?,
    })
}

fn decode_recovery(value: Value) -> Result<RecoveryEntry, DecodeError> {
    let mut map = cbor::map(value, "recovery entry")?;
    Ok(RecoveryEntry {
        target: req_text(&mut map, "tg", "recovery entry")?,
        first_positive_result_date: req_text(&mut map, "fr", "recovery entry")?,
        country_of_test: req_text(&mut map, "co", "recovery entry")?,
        certificate_issuer: req_text(&mut map, "is", "recovery entry")?,
        certificate_valid_from: req_text(&mut map, "df", "recovery entry")?,
        certificate_valid_until: req_text(&mut map, "du", "recovery entry")?,
        unique_certificate_identifier: req_text(&mut map, "ci", "recovery entry")?,
    })
}

// An absent entry list decodes as empty; a present one must be an array.
fn entries<T>(
    map: &mut Fields,
    tag: &str,
    decode_one: fn(Value) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let values = match map.remove(&Value::Text(tag.into())) {
        Some(value) => cbor::array(value, &format!("certificate '{}'", tag))?,
        None => return Ok(Vec::new()),
    };
    values.into_iter().map(decode_one).collect()
}

fn required(map: &mut Fields, tag: &str, what: &str) -> Result<Value, DecodeError> {
    map.remove(&Value::Text(tag.into()))
        .ok_or_else(|| DecodeError::Structure(format!("{} has no '{}' field", what, tag)))
}

fn req_text(map: &mut Fields, tag: &str, what: &str) -> Result<String, DecodeError> {
    let value = required(map, tag, what)?;
    cbor::text(value, &format!("{} '{}'", what, tag))
}

fn req_integer(map: &mut Fields, tag: &str, what: &str) -> Result<i64, DecodeError> {
    let value = required(map, tag, what)?;
    cbor::integer(value, &format!("{} '{}'", what, tag))
}
