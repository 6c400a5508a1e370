use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::hash::{to_hex, HashEngine, HashError, HEX_DIGEST_SIZE};
use crate::logging::Logger;
use crate::session::buffer::LineBuffer;
use crate::session::handle::{SessionHandle, SessionShared};

/// Wire terminator for both request lines and responses.
const LINE_TERM: u8 = b'\n';

/// 64 hex characters followed by the terminator.
pub const RESPONSE_SIZE: usize = HEX_DIGEST_SIZE + 1;

/// Per-session knobs carried over from the server configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    /// Deadline applied to each socket read and write. `None` disables it.
    pub connection_timeout: Option<Duration>,
}

/// Represents the state of a session in its processing lifecycle.
///
/// - `Receiving`: awaiting bytes from the peer
/// - `Encoding`: folding buffered bytes into the hash
/// - `Responding`: writing the hex digest line back
/// - `Closed`: session is being terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Receiving,
    Encoding,
    Responding,
    Closed,
}

/// Handles a single client connection of the line-hashing service.
///
/// The `Session` owns the TCP stream, a fixed read buffer, a response
/// buffer, and a streaming hash engine. It cycles Receive → Encode →
/// Respond until the peer disconnects, an error occurs, or the session is
/// terminated through its [`SessionHandle`].
///
/// # State Machine
///
/// 1. **Receiving**: reads into the (drained) buffer; EOF or error closes
/// 2. **Encoding**: hashes bytes up to the first `\n`; without a terminator
///    the whole buffer is hashed and the read re-armed, so lines longer
///    than the buffer are still hashed correctly
/// 3. **Responding**: finalizes the digest and writes 65 bytes (64 hex
///    characters + `\n`); loops back to Encoding while buffered lines
///    remain, otherwise to Receiving
///
/// At most one socket operation is outstanding per direction, and responses
/// are written in line order.
///
/// # Example
///
/// ```ignore
/// use hashline::logging::TracingLogger;
/// use hashline::session::{Session, SessionConfig};
/// use tokio::net::TcpListener;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let listener = TcpListener::bind("127.0.0.1:2323").await?;
///     let logger = TracingLogger::shared();
///
///     loop {
///         let (socket, _) = listener.accept().await?;
///         let _handle = Session::spawn(socket, SessionConfig::default(), logger.clone())?;
///     }
/// }
/// ```
pub struct Session {
    stream: TcpStream,
    peer: String,
    buffer: LineBuffer,
    response: [u8; RESPONSE_SIZE],
    engine: HashEngine,
    state: SessionState,
    shared: Arc<SessionShared>,
    timeout: Option<Duration>,
    logger: Arc<dyn Logger>,
}

impl Session {
    /// Starts a session on its own task and returns the handle observing it.
    ///
    /// The handle can be used to check liveness and to terminate the
    /// session from any thread. Construction fails only if the hash engine
    /// cannot be initialized; the caller is expected to log and drop the
    /// socket in that case.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the hash context cannot be created.
    pub fn spawn(
        stream: TcpStream,
        config: SessionConfig,
        logger: Arc<dyn Logger>,
    ) -> Result<SessionHandle, HashError> {
        let engine = HashEngine::create()?;
        let shared = SessionShared::new();
        let handle = SessionHandle::new(Arc::downgrade(&shared));

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());

        let session = Session {
            stream,
            peer,
            buffer: LineBuffer::new(),
            response: [0u8; RESPONSE_SIZE],
            engine,
            state: SessionState::Receiving,
            shared,
            timeout: config.connection_timeout,
            logger,
        };

        tokio::spawn(session.run());

        Ok(handle)
    }

    /// Drives the state machine until the session closes, then shuts the
    /// socket down both ways. Consumes the session; when this returns, the
    /// last strong reference to the shared state drops and every handle
    /// starts reporting not-alive.
    async fn run(mut self) {
        loop {
            self.state = match self.state {
                SessionState::Receiving => self.receive().await,
                SessionState::Encoding => self.encode(),
                SessionState::Responding => self.respond().await,
                SessionState::Closed => break,
            };
        }

        let _ = self.stream.shutdown().await;
    }

    /// Receive state: the buffer is drained, so the read targets the whole
    /// backing array. A `0`-byte read is EOF.
    async fn receive(&mut self) -> SessionState {
        let shared = Arc::clone(&self.shared);
        let received = tokio::select! {
            _ = shared.cancelled() => None,
            res = read_with_deadline(&mut self.stream, self.buffer.read_slot(), self.timeout) => {
                Some(res)
            }
        };

        match received {
            None => self.close_terminated(),
            Some(Ok(0)) => {
                self.logger
                    .message(&format!("session {}: peer closed the connection", self.peer));
                SessionState::Closed
            }
            Some(Ok(n)) => {
                self.buffer.set_pending(n);
                SessionState::Encoding
            }
            Some(Err(err)) => self.close_on_io_error("read", err),
        }
    }

    /// Encode state: hashes the bytes of the first (possibly partial) line
    /// and drops them from the buffer.
    fn encode(&mut self) -> SessionState {
        if self.buffer.pending() == 0 {
            return SessionState::Receiving;
        }

        let inspection = self.buffer.inspect(LINE_TERM);
        if let Err(err) = self
            .engine
            .update(&self.buffer.data()[..inspection.data_len])
        {
            self.logger
                .error(&format!("session {}: hash update failed: {err}", self.peer));
            return SessionState::Closed;
        }
        self.buffer.consume(inspection.consume);

        if inspection.terminated {
            SessionState::Responding
        } else {
            SessionState::Receiving
        }
    }

    /// Respond state: finalizes the line's digest and writes the 65-byte
    /// response. Keeps draining buffered lines before re-arming the read.
    async fn respond(&mut self) -> SessionState {
        let digest = match self.engine.finalize() {
            Ok(digest) => digest,
            Err(err) => {
                self.logger.error(&format!(
                    "session {}: hash finalization failed: {err}",
                    self.peer
                ));
                return SessionState::Closed;
            }
        };
        self.response[..HEX_DIGEST_SIZE].copy_from_slice(&to_hex(&digest));
        self.response[HEX_DIGEST_SIZE] = LINE_TERM;

        let shared = Arc::clone(&self.shared);
        let written = tokio::select! {
            _ = shared.cancelled() => None,
            res = write_with_deadline(&mut self.stream, &self.response, self.timeout) => {
                Some(res)
            }
        };

        match written {
            None => self.close_terminated(),
            Some(Ok(())) => {
                if self.buffer.pending() > 0 {
                    SessionState::Encoding
                } else {
                    SessionState::Receiving
                }
            }
            Some(Err(err)) => self.close_on_io_error("write", err),
        }
    }

    fn close_terminated(&self) -> SessionState {
        self.logger
            .message(&format!("session {}: terminated", self.peer));
        SessionState::Closed
    }

    fn close_on_io_error(&self, op: &str, err: io::Error) -> SessionState {
        if err.kind() == io::ErrorKind::TimedOut {
            self.logger
                .warning(&format!("session {}: {op} deadline exceeded", self.peer));
        } else {
            self.logger
                .error(&format!("session {}: {op} failed: {err}", self.peer));
        }
        SessionState::Closed
    }
}

async fn read_with_deadline(
    stream: &mut TcpStream,
    slot: &mut [u8],
    deadline: Option<Duration>,
) -> io::Result<usize> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, stream.read(slot))
            .await
            .unwrap_or_else(|_| Err(deadline_error("read"))),
        None => stream.read(slot).await,
    }
}

// The deadline only covers the first chunk. Dropping a `write_all` mid-way
// can leave a truncated response on the wire, while a single `write` that
// has not completed has sent nothing; once bytes are out, the rest of the
// response is finished without a deadline so the peer sees 65 bytes or none.
async fn write_with_deadline(
    stream: &mut TcpStream,
    bytes: &[u8],
    deadline: Option<Duration>,
) -> io::Result<()> {
    let Some(limit) = deadline else {
        return stream.write_all(bytes).await;
    };

    let written = tokio::time::timeout(limit, stream.write(bytes))
        .await
        .unwrap_or_else(|_| Err(deadline_error("write")))?;
    if written == 0 {
        return Err(io::ErrorKind::WriteZero.into());
    }

    stream.write_all(&bytes[written..]).await
}

fn deadline_error(op: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{op} deadline exceeded"))
}
