//! Base45 codec as used by the health certificate QR payloads (RFC 9285).
//!
//! Three input characters decode to two bytes, a trailing pair of characters
//! to one byte, most significant byte first. Only the 45 symbol alphabet of
//! digits, uppercase letters and ` $%*+-./:` is accepted; there is no
//! case folding.

use crate::error::DecodeError;

const BASE: u32 = 45;
const ALPHABET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Decode a base45 string into bytes.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::Alphabet("empty input".into()));
    }

    let mut values = Vec::with_capacity(input.len());
    for (offset, c) in input.chars().enumerate() {
        values.push(symbol_value(c, offset)?);
    }

    let mut out = Vec::with_capacity(values.len() / 3 * 2 + 1);
    for group in values.chunks(3) {
        match *group {
            [c0, c1, c2] => {
                let value = c0 + c1 * BASE + c2 * BASE * BASE;
                if value > u32::from(u16::MAX) {
                    return Err(DecodeError::Overflow {
                        value,
                        max: u32::from(u16::MAX),
                    });
                }
                out.push((value >> 8) as u8);
                out.push((value & 0xff) as u8);
            }
            [c0, c1] => {
                let value = c0 + c1 * BASE;
                if value > u32::from(u8::MAX) {
                    return Err(DecodeError::Overflow {
                        value,
                        max: u32::from(u8::MAX),
                    });
                }
                out.push(value as u8);
            }
            _ => {
                return Err(DecodeError::Alphabet(
                    "a lone trailing character cannot encode a byte".into(),
                ));
            }
        }
    }

    Ok(out)
}

/// Encode bytes as a base45 string.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() / 2 * 3 + 2);
    for pair in data.chunks(2) {
        if let [hi, lo] = *pair {
            let value = u32::from(u16::from_be_bytes([hi, lo]));
            out.push(ALPHABET[(value % BASE) as usize] as char);
            out.push(ALPHABET[(value / BASE % BASE) as usize] as char);
            out.push(ALPHABET[(value / (BASE * BASE)) as usize] as char);
        } else {
            let value = u32::from(pair[0]);
            out.push(ALPHABET[(value % BASE) as usize] as char);
            out.push(ALPHABET[(value / BASE) as usize] as char);
        }
    }
    out
}

fn symbol_value(c: char, offset: usize) -> Result<u32, DecodeError> {
    let value = match c {
        '0'..='9' => c as u32 - '0' as u32,
        'A'..='Z' => c as u32 - 'A' as u32 + 10,
        ' ' => 36,
        '$' => 37,
        '%' => 38,
        '*' => 39,
        '+' => 40,
        '-' => 41,
        '.' => 42,
        '/' => 43,
        ':' => 44,
        _ => {
            return Err(DecodeError::Alphabet(format!(
                "invalid character {:?} at offset {}",
                c, offset
            )));
        }
    };
    Ok(value)
}
