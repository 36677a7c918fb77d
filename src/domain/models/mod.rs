//! Domain models for optimization campaigns
//!
//! The configuration document (parameters, objectives, constraints, run
//! settings) and the suggestion/measurement exchange types.

pub mod config;
pub mod constraint;
pub mod objective;
pub mod parameter;
pub mod recommendation;

pub use config::{Algorithm, OptimizationConfig};
pub use constraint::{Constraint, ExclusionConstraint, ExclusionTerm, Interval, LinearConstraint, LinearTerm};
pub use objective::{
    MultiObjectiveConfig, MultiObjectiveFunction, Objective, ObjectiveGoal, Tolerance,
};
pub use parameter::{CategoryDescriptor, Parameter, ParameterKind};
pub use recommendation::{ParamValue, Recommendation};
