//! Base-62 codec used for every short code
//!
//! Digits first, then uppercase, then lowercase.

use crate::errors::{LinkforgeError, Result};

pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = 62;

/// Encode a value; `0` maps to the first alphabet symbol.
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    // u64::MAX needs 11 symbols
    let mut buf = [0u8; 11];
    let mut pos = buf.len();
    while value > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(value % BASE) as usize];
        value /= BASE;
    }
    buf[pos..].iter().map(|&b| b as char).collect()
}

pub fn decode(code: &str) -> Result<u64> {
    if code.is_empty() {
        return Err(LinkforgeError::validation("Cannot decode an empty code"));
    }

    code.bytes().try_fold(0u64, |acc, byte| {
        let digit = symbol_value(byte).ok_or_else(|| {
            LinkforgeError::validation(format!(
                "Invalid character '{}' in code '{}'",
                byte as char, code
            ))
        })?;
        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| LinkforgeError::validation(format!("Code '{}' overflows u64", code)))
    })
}

fn symbol_value(byte: u8) -> Option<u64> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u64),
        b'A'..=b'Z' => Some((byte - b'A') as u64 + 10),
        b'a'..=b'z' => Some((byte - b'a') as u64 + 36),
        _ => None,
    }
}
