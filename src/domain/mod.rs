//! Domain layer for the optimization session client
//!
//! This module contains the experiment configuration model, the validation
//! rules that gate it, and the port the session driver talks through.

pub mod error;
pub mod models;
pub mod ports;
pub mod validate;

// Re-export the types most callers touch.
pub use error::{CampaignError, DriverError, Rule, ValidationError, Violation};
pub use ports::{MeasurementRecord, ServiceError, SessionClient, SessionHandle, Suggestion};
pub use validate::{validate, ValidatedConfig};
