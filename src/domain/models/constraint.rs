//! Feasibility constraint model.
//!
//! Constraints restrict which parameter combinations the remote optimizer
//! may propose. Linear constraints relate weighted sums of numeric
//! parameters to target values; exclusion constraints carve intervals out
//! of the search space.

use serde::{Deserialize, Serialize};

/// A restriction on the combinations the optimizer may suggest.
///
/// Serialized with a `type` tag (`linear_eq`, `linear_lte`, `linear_gte`,
/// `linear_between`, `exclusion`, `conditional_exclusion`) alongside the
/// variant's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Weighted sum equals the single target.
    LinearEq(LinearConstraint),
    /// Weighted sum is at most the single target.
    LinearLte(LinearConstraint),
    /// Weighted sum is at least the single target.
    LinearGte(LinearConstraint),
    /// Weighted sum lies between the two targets (low, high).
    LinearBetween(LinearConstraint),
    /// The listed intervals are excluded from each referenced parameter.
    Exclusion(ExclusionConstraint),
    /// The first term is the condition; while a suggestion falls inside the
    /// condition's intervals, the remaining terms' intervals are excluded.
    ConditionalExclusion(ExclusionConstraint),
}

impl Constraint {
    /// Stable lowercase label, matching the wire `type` tag.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::LinearEq(_) => "linear_eq",
            Self::LinearLte(_) => "linear_lte",
            Self::LinearGte(_) => "linear_gte",
            Self::LinearBetween(_) => "linear_between",
            Self::Exclusion(_) => "exclusion",
            Self::ConditionalExclusion(_) => "conditional_exclusion",
        }
    }

    /// The constraint's display label: its name when set, otherwise its
    /// kind.
    pub fn label(&self) -> &str {
        let name = match self {
            Self::LinearEq(c) | Self::LinearLte(c) | Self::LinearGte(c) | Self::LinearBetween(c) => {
                c.name.as_deref()
            }
            Self::Exclusion(c) | Self::ConditionalExclusion(c) => c.name.as_deref(),
        };
        name.unwrap_or_else(|| self.kind_str())
    }

    /// Names of all parameters this constraint references, in term order.
    pub fn referenced_parameters(&self) -> Vec<&str> {
        match self {
            Self::LinearEq(c) | Self::LinearLte(c) | Self::LinearGte(c) | Self::LinearBetween(c) => {
                c.terms.iter().map(|t| t.parameter.as_str()).collect()
            }
            Self::Exclusion(c) | Self::ConditionalExclusion(c) => {
                c.terms.iter().map(|t| t.parameter.as_str()).collect()
            }
        }
    }

    /// How many target values the linear kinds require. `None` for the
    /// exclusion kinds, which carry no targets.
    pub fn expected_target_count(&self) -> Option<usize> {
        match self {
            Self::LinearEq(_) | Self::LinearLte(_) | Self::LinearGte(_) => Some(1),
            Self::LinearBetween(_) => Some(2),
            Self::Exclusion(_) | Self::ConditionalExclusion(_) => None,
        }
    }

    /// The linear payload, for the four linear kinds.
    pub fn as_linear(&self) -> Option<&LinearConstraint> {
        match self {
            Self::LinearEq(c) | Self::LinearLte(c) | Self::LinearGte(c) | Self::LinearBetween(c) => {
                Some(c)
            }
            _ => None,
        }
    }

    /// The exclusion payload, for the two exclusion kinds.
    pub fn as_exclusion(&self) -> Option<&ExclusionConstraint> {
        match self {
            Self::Exclusion(c) | Self::ConditionalExclusion(c) => Some(c),
            _ => None,
        }
    }
}

/// Payload of the four linear constraint kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Optional display name used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The weighted parameters forming the left-hand side.
    pub terms: Vec<LinearTerm>,

    /// Right-hand side target values. One value for `eq`/`lte`/`gte`, an
    /// ordered (low, high) pair for `between`.
    pub targets: Vec<f64>,
}

/// One weighted parameter in a linear constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTerm {
    /// Name of a numeric parameter in the same configuration.
    pub parameter: String,

    /// Coefficient applied to the parameter's value.
    pub weight: f64,
}

/// Payload of the two exclusion constraint kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionConstraint {
    /// Optional display name used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Per-parameter excluded intervals. Conditional exclusions require at
    /// least two terms, with the first acting as the condition.
    pub terms: Vec<ExclusionTerm>,
}

/// Excluded intervals for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionTerm {
    /// Name of a numeric parameter in the same configuration.
    pub parameter: String,

    /// Intervals removed from the parameter's range.
    pub bounds: Vec<Interval>,
}

/// A numeric interval, serialized as a `[low, high]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Interval {
    /// Lower endpoint.
    pub low: f64,
    /// Upper endpoint. Must be strictly greater than `low`.
    pub high: f64,
}

impl Interval {
    /// True when the endpoints are finite and ordered `low < high`.
    pub fn is_well_formed(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low < self.high
    }
}

impl From<(f64, f64)> for Interval {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<Interval> for (f64, f64) {
    fn from(interval: Interval) -> Self {
        (interval.low, interval.high)
    }
}
