use thiserror::Error;

/// Errors raised while decoding a certificate QR payload.
///
/// Every stage of the pipeline fails fast: the first error aborts the whole
/// decode and no partial result is ever produced.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A character outside the base45 alphabet, or an input whose length
    /// leaves a lone trailing character.
    #[error("base45: {0}")]
    Alphabet(String),

    /// A base45 group decodes to a value larger than its output width allows.
    #[error("base45: group value {value} exceeds {max}")]
    Overflow { value: u32, max: u32 },

    /// Malformed or truncated zlib framing around the deflate body.
    #[error("zlib: {0}")]
    Framing(String),

    /// The Adler-32 trailer does not match the decompressed content.
    #[error("zlib: checksum mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    Checksum { stored: u32, computed: u32 },

    /// A CBOR layer does not have the expected shape.
    #[error("{0}")]
    Structure(String),

    /// A recognized field holds a value of the wrong CBOR type.
    #[error("{0}")]
    Type(String),
}
