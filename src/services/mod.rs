//! Service layer for optimization campaigns
//!
//! Home of the session driver that turns the raw suggestion/measurement
//! protocol into a budgeted, resumable campaign loop.

pub mod driver;

pub use driver::{initialize_optimization, DriverState, OptimizationDriver, PollSchedule};
