//! Per-connection session handling.
//!
//! Each accepted TCP connection is driven by a [`connection::Session`]: an
//! asynchronous state machine that reads newline-terminated lines and
//! answers every completed line with the lowercase SHA-256 hex digest of
//! the line's bytes, followed by `\n`.
//!
//! # Session State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Receive   │ ← Wait for incoming bytes
//!        └──────┬──────┘
//!               │ n > 0 bytes read
//!               ▼
//!        ┌──────────────────┐
//!        │     Encode       │ ← Fold buffered bytes into the hash
//!        └──────┬───────────┘
//!               │
//!               ├─ no terminator → Receive (hash what we have, read more)
//!               │
//!               │ line complete
//!               ▼
//!        ┌──────────────────┐
//!        │     Respond      │ ← Write 64 hex chars + '\n'
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ bytes pending → Encode (drain next line)
//!               └─ buffer empty → Receive
//! ```
//!
//! Peer EOF, I/O errors, deadline expiry, and termination all lead to the
//! terminal Closed state, which shuts the socket down both ways.
//!
//! The submodules:
//!
//! - **`connection`**: the session state machine and its task entry point
//! - **`buffer`**: fixed-capacity line buffer with terminator scanning
//! - **`handle`**: weak liveness observer with an idempotent terminate

pub mod buffer;
pub mod connection;
pub mod handle;

pub use buffer::{Inspection, LineBuffer, BUFFER_SIZE};
pub use connection::{Session, SessionConfig, RESPONSE_SIZE};
pub use handle::SessionHandle;
