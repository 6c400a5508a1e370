use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::Config;
use crate::logging::Logger;
use crate::server::registry::SessionRegistry;
use crate::session::{Session, SessionConfig};

/// Floor for the reap period, whatever the configuration says.
const MIN_REAP_INTERVAL: Duration = Duration::from_millis(200);

/// Resolves once `shutdown` holds `true`, whether that's already the case
/// or becomes so later. Equivalent to `Receiver::wait_for`, but never holds
/// the borrowed value across an `.await`, so the future stays `Send`.
async fn wait_for_stop(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
}

/// TCP hashing server.
///
/// Owns the listening socket and the registry of live sessions. [`run`]
/// accepts connections and spawns a [`Session`] per peer; a background
/// reaper periodically sweeps handles whose session has ended, so the
/// registry stays bounded as clients come and go. [`stop`] shuts the whole
/// thing down gracefully: no further accepts, reaper cancelled, every live
/// session terminated.
///
/// [`run`]: Server::run
/// [`stop`]: Server::stop
pub struct Server {
    listener: TcpListener,
    registry: SessionRegistry,
    session_config: SessionConfig,
    reap_interval: Duration,
    shutdown: watch::Sender<bool>,
    logger: Arc<dyn Logger>,
}

impl Server {
    /// Binds an IPv4 listener on the configured port.
    ///
    /// The reap interval is floored at 200 ms; the connection timeout is
    /// handed through to each session.
    pub async fn bind(config: Config, logger: Arc<dyn Logger>) -> anyhow::Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let (shutdown, _) = watch::channel(false);

        logger.message(&format!("listening on {}", listener.local_addr()?));

        Ok(Self {
            listener,
            registry: SessionRegistry::new(),
            session_config: SessionConfig {
                connection_timeout: config.connection_timeout,
            },
            reap_interval: config.reap_interval.max(MIN_REAP_INTERVAL),
            shutdown,
            logger,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of handles currently registered, dead ones included until the
    /// next reap pass.
    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }

    /// Accepts connections until [`stop`] is called.
    ///
    /// Transient accept errors are logged and the accept re-armed; one bad
    /// connection never stops the server. Returns once the shutdown signal
    /// is observed and the reaper has exited.
    ///
    /// [`stop`]: Server::stop
    pub async fn run(&self) -> anyhow::Result<()> {
        let reaper = self.spawn_reaper();
        let mut shutdown = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = wait_for_stop(&mut shutdown) => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.admit(stream, peer).await,
                    Err(err) => self.logger.warning(&format!("accept failed: {err}")),
                }
            }
        }

        reaper.await.ok();
        Ok(())
    }

    /// Initiates graceful shutdown: stops the acceptor and the reap timer,
    /// then terminates every registered session. Idempotent.
    pub async fn stop(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }

        let terminated = self.registry.terminate_all().await;
        self.logger
            .message(&format!("stopping: terminated {terminated} live sessions"));
    }

    async fn admit(&self, stream: TcpStream, peer: SocketAddr) {
        // A connection can sit in the kernel backlog and be accepted after
        // stop() has already swept the registry; it must not start a session
        // that nothing tracks.
        if *self.shutdown.borrow() {
            self.logger
                .message(&format!("refusing connection from {peer}: server stopping"));
            return;
        }

        self.logger
            .message(&format!("accepted connection from {peer}"));

        match Session::spawn(stream, self.session_config, self.logger.clone()) {
            Ok(handle) => {
                self.registry.register(handle.clone()).await;
                // stop() may have run between the check above and this
                // registration and missed the handle; terminate it directly.
                if *self.shutdown.borrow() {
                    handle.terminate();
                }
            }
            // The socket is dropped here; the peer sees the connection close.
            Err(err) => self
                .logger
                .error(&format!("failed to start session for {peer}: {err}")),
        }
    }

    fn spawn_reaper(&self) -> JoinHandle<()> {
        let registry = self.registry.clone();
        let logger = self.logger.clone();
        let mut shutdown = self.shutdown.subscribe();
        let period = self.reap_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = wait_for_stop(&mut shutdown) => break,
                    _ = ticker.tick() => {
                        let removed = registry.reap().await;
                        if removed > 0 {
                            logger.message(&format!("reaped {removed} dead session handles"));
                        }
                    }
                }
            }
        })
    }
}
