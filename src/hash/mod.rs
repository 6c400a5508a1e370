//! SHA-256 streaming engine and hex encoding.
//!
//! [`engine::HashEngine`] accumulates line bytes across reads and resets
//! itself after every successful finalize, so one engine serves every line
//! of a connection. [`hex::to_hex`] turns the digest into the lowercase
//! hex form that goes back on the wire.

pub mod engine;
pub mod hex;

pub use engine::{Digest, HashEngine, HashError, DIGEST_SIZE};
pub use hex::{to_hex, HexDigest, HEX_DIGEST_SIZE};
