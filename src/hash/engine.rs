use sha2::{Digest as _, Sha256};
use thiserror::Error;

/// SHA-256 digest width in bytes.
pub const DIGEST_SIZE: usize = 32;

pub type Digest = [u8; DIGEST_SIZE];

/// Hash-engine failure kinds.
///
/// The engine contract treats the primitive as a black box whose context
/// allocation and folding may fail; the `sha2` backend never does, so these
/// only surface if the backend is swapped for one that can.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("hash context initialization failed")]
    Init,
    #[error("hash update failed")]
    Update,
    #[error("hash finalization failed")]
    Finalize,
}

/// Streaming SHA-256 accumulator.
///
/// `update` folds byte chunks into the running digest; `finalize` emits the
/// 32-byte digest of everything fed since creation or the last successful
/// finalize and resets the engine to the empty-input state. A session keeps
/// exactly one engine for its whole lifetime.
pub struct HashEngine {
    context: Sha256,
}

impl HashEngine {
    pub fn create() -> Result<Self, HashError> {
        Ok(Self {
            context: Sha256::new(),
        })
    }

    /// Folds `bytes` into the running digest. An empty slice is a no-op.
    pub fn update(&mut self, bytes: &[u8]) -> Result<(), HashError> {
        self.context.update(bytes);
        Ok(())
    }

    /// Emits the digest of all bytes seen so far and resets to the
    /// empty-input state. With no prior `update`, this is the digest of the
    /// empty string.
    pub fn finalize(&mut self) -> Result<Digest, HashError> {
        Ok(self.context.finalize_reset().into())
    }
}
