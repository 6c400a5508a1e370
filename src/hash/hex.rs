use crate::hash::engine::{Digest, DIGEST_SIZE};

pub const HEX_DIGEST_SIZE: usize = DIGEST_SIZE * 2;

pub type HexDigest = [u8; HEX_DIGEST_SIZE];

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Lowercase hex encoding of a digest, upper nibble first.
pub fn to_hex(digest: &Digest) -> HexDigest {
    let mut hex = [0u8; HEX_DIGEST_SIZE];
    for (i, &byte) in digest.iter().enumerate() {
        hex[i * 2] = HEX_CHARS[(byte >> 4) as usize];
        hex[i * 2 + 1] = HEX_CHARS[(byte & 0x0f) as usize];
    }
    hex
}
