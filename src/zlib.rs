//! Zlib decompression with explicit framing and checksum validation.
//!
//! The certificate envelope travels as an RFC 1950 stream: a two byte
//! header, a deflate body and a big-endian Adler-32 trailer computed over
//! the decompressed content. The deflate body is handed to flate2 in raw
//! mode; header and trailer are checked here so framing and checksum
//! failures stay distinguishable.

use flate2::{Decompress, FlushDecompress, Status};

use crate::error::DecodeError;

const METHOD_DEFLATE: u8 = 8;
const ADLER_MOD: u32 = 65521;
// Largest run of bytes that can be summed before the Adler-32 accumulators
// must be reduced modulo 65521.
const ADLER_NMAX: usize = 5552;

/// Decompress a zlib stream, validating the header and Adler-32 trailer.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if data.len() < 6 {
        return Err(DecodeError::Framing(format!(
            "stream too short ({} bytes)",
            data.len()
        )));
    }

    let cmf = data[0];
    let flg = data[1];
    if cmf & 0x0f != METHOD_DEFLATE {
        return Err(DecodeError::Framing(format!(
            "compression method {} is not deflate",
            cmf & 0x0f
        )));
    }
    if cmf >> 4 > 7 {
        return Err(DecodeError::Framing(format!(
            "invalid window size exponent {}",
            cmf >> 4
        )));
    }
    if (u16::from(cmf) << 8 | u16::from(flg)) % 31 != 0 {
        return Err(DecodeError::Framing("header check failed".into()));
    }
    if flg & 0x20 != 0 {
        return Err(DecodeError::Framing(
            "preset dictionaries are not supported".into(),
        ));
    }

    let body = &data[2..data.len() - 4];
    let mut trailer = [0u8; 4];
    trailer.copy_from_slice(&data[data.len() - 4..]);
    let stored = u32::from_be_bytes(trailer);

    let out = inflate_raw(body)?;

    let computed = adler32(&out);
    if computed != stored {
        return Err(DecodeError::Checksum { stored, computed });
    }

    Ok(out)
}

fn inflate_raw(body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(body.len().saturating_mul(4).max(1024));
    loop {
        let consumed = inflater.total_in() as usize;
        let produced = out.len();
        let status = inflater
            .decompress_vec(&body[consumed..], &mut out, FlushDecompress::Finish)
            .map_err(|e| DecodeError::Framing(format!("malformed deflate stream: {}", e)))?;
        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                if out.len() == out.capacity() {
                    out.reserve(out.capacity());
                    continue;
                }
                if inflater.total_in() as usize == consumed && out.len() == produced {
                    return Err(DecodeError::Framing("truncated deflate stream".into()));
                }
            }
        }
    }
    if (inflater.total_in() as usize) < body.len() {
        return Err(DecodeError::Framing(
            "trailing bytes after deflate stream".into(),
        ));
    }
    Ok(out)
}

fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for chunk in data.chunks(ADLER_NMAX) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }
    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn adler32_reference_values() {
        assert_eq!(adler32(b""), 1);
        assert_eq!(adler32(b"Wikipedia"), 0x11e60398);
    }

    #[test]
    fn round_trips() {
        let data = b"one certificate payload, compressed and framed";
        assert_eq!(inflate(&compress(data)).unwrap(), data);
        assert_eq!(inflate(&compress(b"")).unwrap(), b"");
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(inflate(b"\x78\x9c"), Err(DecodeError::Framing(_))));
    }

    #[test]
    fn rejects_wrong_compression_method() {
        let mut stream = compress(b"payload");
        stream[0] = (stream[0] & 0xf0) | 0x07;
        assert!(matches!(inflate(&stream), Err(DecodeError::Framing(_))));
    }

    #[test]
    fn rejects_failed_header_check() {
        let mut stream = compress(b"payload");
        stream[1] ^= 0x01;
        assert!(matches!(inflate(&stream), Err(DecodeError::Framing(_))));
    }

    #[test]
    fn rejects_preset_dictionary() {
        // 0x78 0x20 passes the header check but sets FDICT.
        let stream = [0x78, 0x20, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(inflate(&stream), Err(DecodeError::Framing(_))));
    }

    #[test]
    fn rejects_truncated_stream() {
        let stream = compress(b"a long enough payload to survive losing its tail bytes");
        let truncated = &stream[..stream.len() - 8];
        assert!(matches!(inflate(truncated), Err(DecodeError::Framing(_))));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let stream = compress(b"payload");
        let mut padded = stream[..stream.len() - 4].to_vec();
        padded.push(0x00);
        padded.extend_from_slice(&stream[stream.len() - 4..]);
        assert!(matches!(inflate(&padded), Err(DecodeError::Framing(_))));
    }

    #[test]
    fn rejects_checksum_mismatch() {
        let mut stream = compress(b"payload");
        let last = stream.len() - 1;
        stream[last] ^= 0xff;
        assert!(matches!(inflate(&stream), Err(DecodeError::Checksum { .. })));
    }
}
