//! Hashline - TCP line-hashing service
//!
//! Core library for the line-delimited SHA-256 digest server.

pub mod config;
pub mod hash;
pub mod logging;
pub mod server;
pub mod session;
