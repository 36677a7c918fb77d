//! Optloop - Remote Black-Box Optimization Client
//!
//! Optloop validates experiment configurations and drives optimization
//! campaigns against a remote suggestion service: open or resume a
//! session, poll for parameter suggestions, run the experiment on your
//! side, and report measured objective values back.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Configuration model, validation rules, and
//!   the session port
//! - **Service Layer** (`services`): The campaign driver built on the port
//! - **Infrastructure Layer** (`infrastructure`): HTTP and scripted port
//!   implementations, document loading, logging
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use optloop::infrastructure::{ConfigLoader, HttpSessionClient};
//! use optloop::services::OptimizationDriver;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load_validated("campaign.yaml")?;
//!     let client = Arc::new(HttpSessionClient::new("http://localhost:8000")?);
//!
//!     let mut driver = OptimizationDriver::new(client, config);
//!     driver.initialize().await?;
//!
//!     while !driver.state().is_terminal() {
//!         let batch = driver
//!             .get_new_suggestions(10, Duration::from_secs(5))
//!             .await?;
//!         let mut measured = Vec::new();
//!         for mut rec in batch {
//!             let outcome = 0.0; // run the experiment here
//!             rec.record_measurement("yield", outcome);
//!             measured.push(rec);
//!         }
//!         driver.send_measurements(&measured).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::error::{CampaignError, DriverError, Rule, ValidationError, Violation};
pub use domain::models::{
    Algorithm, Constraint, MultiObjectiveConfig, MultiObjectiveFunction, Objective, ObjectiveGoal,
    OptimizationConfig, Parameter, ParameterKind, ParamValue, Recommendation,
};
pub use domain::ports::{
    MeasurementRecord, ServiceError, SessionClient, SessionHandle, Suggestion,
};
pub use domain::validate::{validate, ValidatedConfig};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::http::{HttpSessionClient, HttpSessionClientConfig};
pub use services::{initialize_optimization, DriverState, OptimizationDriver, PollSchedule};
