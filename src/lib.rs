//! Decoder for EU Digital COVID Certificate QR payloads.
//!
//! The text carried inside the QR code is layered: an `HC1:` marker, base45
//! text, a zlib stream, a CBOR COSE_Sign1-style envelope and finally the CWT
//! claims holding the certificate itself. [`decode`] walks the layers in
//! order and returns the typed certificate, failing on the first malformed
//! layer. No partial result is ever produced.
//!
//! The envelope signature is decoded and retained but never verified;
//! verification needs the issuing countries' public keys and is out of
//! scope for this crate.

use tracing::debug;

pub mod base45;
mod cbor;
pub mod cose;
pub mod cwt;
pub mod dcc;
pub mod error;
pub mod zlib;

pub use crate::cose::{Envelope, Header};
pub use crate::cwt::CertificatePayload;
pub use crate::dcc::{Certificate, Name, RecoveryEntry, VaccineEntry};
pub use crate::error::DecodeError;

/// Marker most producers prepend to the base45 payload.
pub const HC1_MARKER: &str = "HC1:";

/// Remove the `HC1:` marker and trailing whitespace, if any.
///
/// Some producers omit the marker, so its absence is not an error.
pub fn strip_marker(input: &str) -> &str {
    let input = input.trim_end();
    input.strip_prefix(HC1_MARKER).unwrap_or(input)
}

/// Decode a certificate QR payload into its claims and certificate.
pub fn decode(input: &str) -> Result<CertificatePayload, DecodeError> {
    let compressed = base45::decode(strip_marker(input))?;
    debug!(len = compressed.len(), "base45 decoded");

    let raw = zlib::inflate(&compressed)?;
    debug!(len = raw.len(), "decompressed");

    let envelope = cose::decode(&raw)?;
    debug!(
        payload_len = envelope.payload.len(),
        algorithm = ?envelope.unprotected.algorithm,
        "envelope decoded"
    );

    cwt::decode(&envelope.payload)
}
