//! Tests for configuration loading

use std::time::Duration;

use hashline::config::{Config, DEFAULT_PORT};

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.connection_timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.reap_interval, Duration::from_secs(2));
}

// Environment mutations live in one test so parallel test threads never
// observe each other's variables.
#[test]
fn test_load_from_env() {
    std::env::remove_var("HASHLINE_PORT");
    std::env::remove_var("HASHLINE_CONNECTION_TIMEOUT_MS");
    std::env::remove_var("HASHLINE_REAP_INTERVAL_MS");

    let config = Config::load();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.connection_timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.reap_interval, Duration::from_secs(2));

    std::env::set_var("HASHLINE_PORT", "2323");
    std::env::set_var("HASHLINE_CONNECTION_TIMEOUT_MS", "1500");
    std::env::set_var("HASHLINE_REAP_INTERVAL_MS", "250");

    let config = Config::load();
    assert_eq!(config.port, 2323);
    assert_eq!(config.connection_timeout, Some(Duration::from_millis(1500)));
    assert_eq!(config.reap_interval, Duration::from_millis(250));

    // An unparsable timeout disables the deadline instead of silently
    // falling back to the default.
    std::env::set_var("HASHLINE_CONNECTION_TIMEOUT_MS", "off");
    let config = Config::load();
    assert_eq!(config.connection_timeout, None);

    // Garbage port falls back to the default.
    std::env::set_var("HASHLINE_PORT", "not-a-port");
    let config = Config::load();
    assert_eq!(config.port, DEFAULT_PORT);

    std::env::remove_var("HASHLINE_PORT");
    std::env::remove_var("HASHLINE_CONNECTION_TIMEOUT_MS");
    std::env::remove_var("HASHLINE_REAP_INTERVAL_MS");
}
