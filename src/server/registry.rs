use std::sync::Arc;

use tokio::sync::RwLock;

use crate::session::SessionHandle;

/// Handles reserved up-front; the vector grows past this under load.
const RESERVED_SESSIONS: usize = 256;

/// Serialized collection of live session handles.
///
/// All mutation (register, reap, terminate-all) goes through the inner
/// lock, so registration of a new session is ordered before any later reap
/// pass.
#[derive(Clone)]
pub struct SessionRegistry {
    handles: Arc<RwLock<Vec<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            handles: Arc::new(RwLock::new(Vec::with_capacity(RESERVED_SESSIONS))),
        }
    }

    pub async fn register(&self, handle: SessionHandle) {
        self.handles.write().await.push(handle);
    }

    /// Drops every handle whose session has ended. Returns how many were
    /// removed.
    pub async fn reap(&self) -> usize {
        let mut handles = self.handles.write().await;
        let before = handles.len();
        handles.retain(|handle| handle.is_alive());
        before - handles.len()
    }

    /// Terminates every registered session and clears the registry.
    /// Returns how many handles were signalled.
    pub async fn terminate_all(&self) -> usize {
        let mut handles = self.handles.write().await;
        for handle in handles.iter() {
            handle.terminate();
        }
        let count = handles.len();
        handles.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.handles.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
