//! Domain error types: configuration violations and driver failures.

use std::fmt;
use thiserror::Error;

use super::ports::ServiceError;

/// Machine-readable identifier of a configuration validation rule.
///
/// Every [`Violation`] carries the rule that produced it, so callers can
/// react to specific failures without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// The document does not match the configuration schema.
    Schema,
    /// The configuration name is empty.
    ConfigEmptyName,
    /// A parameter has an empty name.
    ParameterEmptyName,
    /// Two parameters share a name.
    ParameterDuplicateName,
    /// A numeric parameter's bounds are not ordered `low < high`.
    ParameterBoundsOrder,
    /// A discrete parameter's stride is not positive or exceeds its range.
    ParameterStride,
    /// A categorical parameter declares no options.
    ParameterNoOptions,
    /// A categorical parameter lists the same option twice.
    ParameterDuplicateCategory,
    /// Category descriptors are present but their keys are inconsistent.
    ParameterDescriptorKeys,
    /// An objective has an empty name.
    ObjectiveEmptyName,
    /// Two objectives share a name.
    ObjectiveDuplicateName,
    /// An objective's `target` value disagrees with its goal.
    ObjectiveTargetGoal,
    /// Several objectives are declared but no multi-objective function.
    MofMissing,
    /// An objective's per-objective settings do not match the selected
    /// multi-objective function.
    MofSchemeMismatch,
    /// Two objectives share a hierarchy rank.
    HierarchyRankDuplicate,
    /// Hierarchy ranks do not form a contiguous run from zero.
    HierarchyRankGap,
    /// A non-terminal hierarchy entry lacks a tolerance.
    HierarchyToleranceMissing,
    /// A hierarchy tolerance is out of range or carries both shapes.
    HierarchyToleranceRange,
    /// The lowest-priority hierarchy entry carries a nonzero tolerance.
    HierarchyTerminalTolerance,
    /// A scalarization weight is negative or not a number.
    WeightNegative,
    /// All scalarization weights are zero.
    WeightAllZero,
    /// A constraint references a parameter that does not exist.
    ConstraintUnknownParameter,
    /// A constraint or exclusion term has no content.
    ConstraintEmptyTerms,
    /// An interval or target pair is not ordered `low < high`.
    ConstraintIntervalOrder,
    /// A linear constraint carries the wrong number of targets.
    ConstraintTargetCount,
    /// A conditional exclusion lacks a condition or consequence term.
    ConstraintConditionShape,
    /// The batch size is zero.
    BatchSize,
    /// The budget is zero.
    Budget,
}

impl Rule {
    /// Stable identifier, `area/check` shaped.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "config/schema",
            Self::ConfigEmptyName => "config/empty-name",
            Self::ParameterEmptyName => "parameter/empty-name",
            Self::ParameterDuplicateName => "parameter/duplicate-name",
            Self::ParameterBoundsOrder => "parameter/bounds-order",
            Self::ParameterStride => "parameter/stride",
            Self::ParameterNoOptions => "parameter/no-options",
            Self::ParameterDuplicateCategory => "parameter/duplicate-category",
            Self::ParameterDescriptorKeys => "parameter/descriptor-keys",
            Self::ObjectiveEmptyName => "objective/empty-name",
            Self::ObjectiveDuplicateName => "objective/duplicate-name",
            Self::ObjectiveTargetGoal => "objective/target-goal",
            Self::MofMissing => "multi-objective/missing",
            Self::MofSchemeMismatch => "multi-objective/scheme-mismatch",
            Self::HierarchyRankDuplicate => "multi-objective/rank-duplicate",
            Self::HierarchyRankGap => "multi-objective/rank-gap",
            Self::HierarchyToleranceMissing => "multi-objective/tolerance-missing",
            Self::HierarchyToleranceRange => "multi-objective/tolerance-range",
            Self::HierarchyTerminalTolerance => "multi-objective/terminal-tolerance",
            Self::WeightNegative => "multi-objective/weight-negative",
            Self::WeightAllZero => "multi-objective/weight-all-zero",
            Self::ConstraintUnknownParameter => "constraint/unknown-parameter",
            Self::ConstraintEmptyTerms => "constraint/empty-terms",
            Self::ConstraintIntervalOrder => "constraint/interval-order",
            Self::ConstraintTargetCount => "constraint/target-count",
            Self::ConstraintConditionShape => "constraint/condition-shape",
            Self::BatchSize => "config/batch-size",
            Self::Budget => "config/budget",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The rule that was broken.
    pub rule: Rule,
    /// Path of the offending field, e.g. `objectives[1].multi_objective`.
    pub path: String,
    /// Human-readable explanation.
    pub message: String,
}

impl Violation {
    /// A violation of `rule` at `path`.
    pub fn new(rule: Rule, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.rule, self.path, self.message)
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A configuration was rejected, with every broken rule listed.
///
/// Validation never stops at the first problem: all violations found in one
/// pass are reported together.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid configuration ({} violation(s)): {}", .violations.len(), format_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Wraps a non-empty list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { violations }
    }

    /// A single schema-level violation, for documents that fail to
    /// deserialize before rule checks can run.
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(Rule::Schema, path, message)])
    }

    /// All violations, in the order the checks ran.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True when at least one violation broke `rule`.
    pub fn contains_rule(&self, rule: Rule) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}

/// Failures surfaced by the optimization driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A suggestion or measurement call arrived before `initialize`.
    #[error("Driver not initialized: call initialize() before exchanging suggestions")]
    NotInitialized,

    /// A previous permanent failure poisoned the session.
    #[error("Session is in the failed state and can no longer be used")]
    SessionFailed,

    /// The session client reported an error.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A recommendation's measurement keys do not match the configured
    /// objectives, or a value is not a finite number.
    #[error(
        "Measurements for suggestion '{suggestion_id}' do not match the configured objectives \
         (missing: {missing:?}, unexpected: {extra:?}, non-finite: {non_finite:?})"
    )]
    MeasurementMismatch {
        /// The offending recommendation's suggestion id.
        suggestion_id: String,
        /// Configured objectives with no measured value.
        missing: Vec<String>,
        /// Measured names that are not configured objectives.
        extra: Vec<String>,
        /// Objectives whose measured value is NaN or infinite.
        non_finite: Vec<String>,
    },

    /// A measurement was submitted for a suggestion this driver never
    /// issued, or one that was already submitted.
    #[error("Suggestion '{suggestion_id}' was not issued by this driver or was already settled")]
    UnknownSuggestion {
        /// The unrecognized suggestion id.
        suggestion_id: String,
    },

    /// The remote service issued a suggestion whose parameter keys do not
    /// match the configuration.
    #[error(
        "Suggestion '{suggestion_id}' does not cover the configured parameters \
         (missing: {missing:?}, unexpected: {extra:?})"
    )]
    SuggestionKeyMismatch {
        /// The offending suggestion id.
        suggestion_id: String,
        /// Configured parameters absent from the suggestion.
        missing: Vec<String>,
        /// Suggested names that are not configured parameters.
        extra: Vec<String>,
    },
}

impl DriverError {
    /// True when retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Service(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// A campaign could not be started from a raw configuration.
///
/// Produced by the one-call bootstrap that validates a document and opens
/// its session together.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// The configuration broke validation rules.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The session could not be opened.
    #[error(transparent)]
    Driver(#[from] DriverError),
}
