//! XOR checksum carried by ID and RDM frames
//!
//! The checksum is the XOR of the five bytes spelled by the 10 hex digit
//! payload, transmitted as 2 hex digits.

use crate::types::{FRAME_CHECKSUM_LEN, FRAME_PAYLOAD_LEN};

/// Parse two ASCII hex digits into a byte
pub(crate) fn hex_byte(pair: &[u8]) -> Option<u8> {
    match pair {
        [hi, lo] => Some((hex_nibble(*hi)? << 4) | hex_nibble(*lo)?),
        _ => None,
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Parse ASCII hex digits (no sign, no whitespace) into an integer
pub(crate) fn parse_hex(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() || digits.len() > 16 {
        return None;
    }
    digits
        .iter()
        .try_fold(0u64, |acc, &c| hex_nibble(c).map(|d| (acc << 4) | u64::from(d)))
}

/// XOR-reduce the payload byte pairs left to right.
///
/// Returns `None` if `payload` is not exactly 10 hex digits.
pub fn compute(payload: &[u8]) -> Option<u8> {
    if payload.len() != FRAME_PAYLOAD_LEN {
        return None;
    }
    payload
        .chunks(2)
        .try_fold(0u8, |acc, pair| hex_byte(pair).map(|b| acc ^ b))
}

/// Check `checksum` (2 hex digits) against `payload` (10 hex digits).
///
/// Malformed input of either field never verifies.
pub fn verify(payload: &[u8], checksum: &[u8]) -> bool {
    if checksum.len() != FRAME_CHECKSUM_LEN {
        return false;
    }
    match (compute(payload), hex_byte(checksum)) {
        (Some(computed), Some(expected)) => computed == expected,
        _ => false,
    }
}
