//! Configuration document infrastructure
//!
//! Hierarchical document loading using figment:
//! - JSON and YAML campaign documents
//! - Environment variable overrides
//! - Schema failures reported as validation violations

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, ENV_PREFIX};
