//! Collision-free identifier prefixes
//!
//! Every generated identifier in a file starts with `_` followed by the
//! base58 (Flickr alphabet) rendering of the 32-bit FNV-1a hash of the file
//! name, so that files compiled into the same Go package never clash.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

const FLICKR_ALPHABET: &[u8; 58] = b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

/// 32-bit FNV-1a
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME))
}

/// Render a number in base58 with the Flickr alphabet (most significant digit first)
pub fn base58_flickr(mut value: u64) -> String {
    if value == 0 {
        return (FLICKR_ALPHABET[0] as char).to_string();
    }
    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        // value % 58 < 58, index is in range
        digits.push(FLICKR_ALPHABET[(value % 58) as usize]);
        value /= 58;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Identifier prefix for a file
pub fn file_prefix(filename: &str) -> String {
    format!("_{}", base58_flickr(u64::from(fnv1a_32(filename.as_bytes()))))
}

/// Quote `value` as a Go interpreted string literal
///
/// JSON string escapes are a subset of Go's, so a JSON string is a valid Go
/// literal.
pub fn go_string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}
