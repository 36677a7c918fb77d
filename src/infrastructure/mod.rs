//! Infrastructure layer module
//!
//! This module contains the adapters and external integrations:
//! - HTTP session client against the remote optimization service
//! - Scripted in-memory session client for tests and dry-runs
//! - Configuration document loading
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the
//! domain layer.

pub mod config;
pub mod http;
pub mod logging;
pub mod scripted;

pub use config::{ConfigError, ConfigLoader};
pub use http::{HttpSessionClient, HttpSessionClientConfig};
pub use scripted::{PollOutcome, ScriptedSessionClient};
