//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interface that infrastructure
//! adapters must implement:
//! - `SessionClient`: the remote optimization session protocol
//!
//! The trait defines the contract that allows the domain to be independent
//! of transport and wire-format choices.

pub mod session_client;

pub use session_client::{
    MeasurementRecord, ServiceError, SessionClient, SessionHandle, Suggestion,
};
