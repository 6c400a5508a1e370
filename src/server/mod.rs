//! Server lifecycle: accepting connections, tracking sessions, reaping.
//!
//! - **`listener`**: the accept loop, reaper task, and graceful shutdown
//! - **`registry`**: the serialized vector of live session handles

pub mod listener;
pub mod registry;

pub use listener::Server;
pub use registry::SessionRegistry;
