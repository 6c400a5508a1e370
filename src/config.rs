use std::time::Duration;

pub const DEFAULT_PORT: u16 = 23;

const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Per-operation socket deadline. `None` disables the deadline.
    pub connection_timeout: Option<Duration>,
    /// How often dead session handles are swept from the registry.
    pub reap_interval: Duration,
}

impl Config {
    pub fn load() -> Self {
        let port = std::env::var("HASHLINE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let connection_timeout = match std::env::var("HASHLINE_CONNECTION_TIMEOUT_MS") {
            Ok(v) => v.parse().ok().map(Duration::from_millis),
            Err(_) => Some(DEFAULT_CONNECTION_TIMEOUT),
        };

        let reap_interval = std::env::var("HASHLINE_REAP_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REAP_INTERVAL);

        Self {
            port,
            connection_timeout,
            reap_interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connection_timeout: Some(DEFAULT_CONNECTION_TIMEOUT),
            reap_interval: DEFAULT_REAP_INTERVAL,
        }
    }
}
