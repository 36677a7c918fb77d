//! Measured objective model.
//!
//! Objectives are the quantities an experiment measures and reports back.
//! Configurations with more than one objective select a multi-objective
//! scheme, and each objective carries scheme-specific settings.

use serde::{Deserialize, Serialize};

/// One measured quantity of the experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Objective name, unique within a configuration. Measurement maps are
    /// keyed by this name.
    pub name: String,

    /// Direction of improvement.
    #[serde(default)]
    pub goal: ObjectiveGoal,

    /// Desired value. Required when the goal is `target`, forbidden
    /// otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,

    /// Free-form description forwarded to the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Scheme-specific settings. Required for every objective when the
    /// configuration selects a multi-objective function.
    #[serde(
        default,
        alias = "multi_objective_configuration",
        skip_serializing_if = "Option::is_none"
    )]
    pub multi_objective: Option<MultiObjectiveConfig>,
}

impl Objective {
    /// The hierarchy rank, when this objective carries one.
    pub fn hierarchy_rank(&self) -> Option<u32> {
        match self.multi_objective {
            Some(MultiObjectiveConfig::Hierarchy { hierarchy, .. }) => Some(hierarchy),
            _ => None,
        }
    }

    /// The scalarization weight, when this objective carries one.
    pub fn weight(&self) -> Option<f64> {
        match self.multi_objective {
            Some(MultiObjectiveConfig::Weighted { weight }) => Some(weight),
            _ => None,
        }
    }
}

/// Direction of improvement for an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveGoal {
    /// Smaller measurements are better.
    Min,
    /// Larger measurements are better.
    Max,
    /// Measurements close to the `target` value are better.
    Target,
}

impl ObjectiveGoal {
    /// Stable lowercase label, matching the wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Target => "target",
        }
    }
}

impl Default for ObjectiveGoal {
    fn default() -> Self {
        Self::Max
    }
}

/// How multiple objectives are combined into a single optimization target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiObjectiveFunction {
    /// Lexicographic hierarchy with per-level tolerances.
    Chimera,
    /// Weighted scalarization of all objectives.
    WeightedSum,
}

impl MultiObjectiveFunction {
    /// Stable lowercase label, matching the wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chimera => "chimera",
            Self::WeightedSum => "weighted_sum",
        }
    }
}

/// Per-objective settings for the selected multi-objective scheme.
///
/// The variant is inferred from the fields present: a `hierarchy` rank
/// selects the hierarchy shape, a `weight` selects the weighted shape. A
/// hierarchy entry may carry at most one of `relative` and `absolute`;
/// documents carrying both deserialize and are rejected by validation so
/// that the error reports every violation at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultiObjectiveConfig {
    /// Settings for the `chimera` scheme.
    Hierarchy {
        /// Priority rank. Rank 0 is the most important objective; ranks must
        /// form a contiguous permutation of `0..objective_count`.
        hierarchy: u32,

        /// Tolerated degradation as a percentage of the objective's observed
        /// range, in `0.0..=100.0`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relative: Option<f64>,

        /// Tolerated degradation in the objective's own units, non-negative.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        absolute: Option<f64>,
    },
    /// Settings for the `weighted_sum` scheme.
    Weighted {
        /// Non-negative scalarization weight. Weights are normalized by
        /// their sum before use, so only their ratios matter.
        weight: f64,
    },
}

impl MultiObjectiveConfig {
    /// The tolerance attached to a hierarchy entry.
    ///
    /// Returns `None` for weighted entries, bare hierarchy entries, and
    /// entries that carry both tolerance shapes (those fail validation).
    pub fn tolerance(&self) -> Option<Tolerance> {
        match self {
            Self::Hierarchy {
                relative: Some(r),
                absolute: None,
                ..
            } => Some(Tolerance::Relative(*r)),
            Self::Hierarchy {
                relative: None,
                absolute: Some(a),
                ..
            } => Some(Tolerance::Absolute(*a)),
            _ => None,
        }
    }

    /// True when a hierarchy entry carries both tolerance shapes at once.
    pub fn has_conflicting_tolerance(&self) -> bool {
        matches!(
            self,
            Self::Hierarchy {
                relative: Some(_),
                absolute: Some(_),
                ..
            }
        )
    }
}

/// Tolerated degradation for one level of a chimera hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Percentage of the objective's observed range, in `0.0..=100.0`.
    Relative(f64),
    /// Absolute degradation in the objective's own units, non-negative.
    Absolute(f64),
}

impl Tolerance {
    /// The raw tolerance magnitude.
    pub fn value(&self) -> f64 {
        match self {
            Self::Relative(v) | Self::Absolute(v) => *v,
        }
    }

    /// True when the tolerance permits no degradation at all.
    pub fn is_zero(&self) -> bool {
        self.value() == 0.0
    }
}
