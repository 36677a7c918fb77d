//! Suggestion and measurement exchange model.
//!
//! The remote optimizer issues suggestions (parameter assignments to try);
//! the driver hands them out as [`Recommendation`]s with bookkeeping
//! attached, and callers fill in measured objective values before sending
//! them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single parameter assignment inside a suggestion.
///
/// Numeric parameters carry numbers, categorical parameters carry the
/// chosen option label. Untagged on the wire: `0.42` or `"ethanol"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Value for a continuous or discrete parameter.
    Number(f64),
    /// Option label of a categorical parameter.
    Category(String),
}

impl ParamValue {
    /// The numeric value, when this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Category(_) => None,
        }
    }

    /// The option label, when this is a category.
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Category(label) => Some(label),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Category(label) => f.write_str(label),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

/// One suggested experiment, as handed to the caller by the driver.
///
/// `iteration` and `batch_position` are assigned locally by the driver so
/// that numbering is gapless and deterministic for a given run, whatever
/// identifiers the remote service uses internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Identifier the remote service assigned to this suggestion.
    /// Measurements are reported back against this id.
    pub suggestion_id: String,

    /// Zero-based index of the batch this suggestion arrived in.
    pub iteration: u32,

    /// Zero-based position of this suggestion within its batch.
    pub batch_position: u32,

    /// Suggested value for every parameter in the configuration.
    pub parameters: HashMap<String, ParamValue>,

    /// Measured objective values, filled in by the caller after running
    /// the experiment. Keys must match the configured objective names.
    #[serde(default)]
    pub measurements: HashMap<String, f64>,

    /// When the driver handed this suggestion out.
    pub issued_at: DateTime<Utc>,
}

impl Recommendation {
    /// A freshly issued recommendation with no measurements yet.
    pub fn issued(
        suggestion_id: impl Into<String>,
        iteration: u32,
        batch_position: u32,
        parameters: HashMap<String, ParamValue>,
    ) -> Self {
        Self {
            suggestion_id: suggestion_id.into(),
            iteration,
            batch_position,
            parameters,
            measurements: HashMap::new(),
            issued_at: Utc::now(),
        }
    }

    /// Records the measured value for one objective, replacing any earlier
    /// value for the same objective.
    pub fn record_measurement(&mut self, objective: impl Into<String>, value: f64) {
        self.measurements.insert(objective.into(), value);
    }

    /// The suggested value for one parameter.
    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }
}
