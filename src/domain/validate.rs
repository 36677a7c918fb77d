//! Configuration validation.
//!
//! [`validate`] runs every structural, cross-reference, and scheme rule
//! against an [`OptimizationConfig`] in one pass and reports all
//! violations together. A [`ValidatedConfig`] can only be obtained through
//! this gate, so everything downstream of it can rely on the invariants.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ops::Deref;

use serde::Serialize;

use super::error::{Rule, ValidationError, Violation};
use super::models::config::OptimizationConfig;
use super::models::constraint::{Constraint, ExclusionConstraint, LinearConstraint};
use super::models::objective::{
    MultiObjectiveConfig, MultiObjectiveFunction, Objective, ObjectiveGoal, Tolerance,
};
use super::models::parameter::{CategoryDescriptor, Parameter, ParameterKind};

/// A configuration that passed every validation rule.
///
/// Immutable by construction; dereferences to the underlying
/// [`OptimizationConfig`] for reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedConfig {
    config: OptimizationConfig,
}

impl ValidatedConfig {
    /// The underlying document.
    pub fn as_config(&self) -> &OptimizationConfig {
        &self.config
    }

    /// Unwraps the document, giving up the validation guarantee.
    pub fn into_inner(self) -> OptimizationConfig {
        self.config
    }

    /// Parameter names in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.config.parameters.iter().map(|p| p.name.as_str())
    }

    /// Objective names in declaration order.
    pub fn objective_names(&self) -> impl Iterator<Item = &str> {
        self.config.objectives.iter().map(|o| o.name.as_str())
    }

    /// Looks up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.config.parameters.iter().find(|p| p.name == name)
    }

    /// Scalarization weights normalized by their sum, in objective order.
    ///
    /// `Some` only when the weighted scheme is in effect. Validation
    /// guarantees the sum is positive.
    pub fn normalized_weights(&self) -> Option<Vec<(String, f64)>> {
        if !self.config.is_multi_objective()
            || self.config.multi_objective_function != Some(MultiObjectiveFunction::WeightedSum)
        {
            return None;
        }
        let total: f64 = self.config.objectives.iter().filter_map(Objective::weight).sum();
        Some(
            self.config
                .objectives
                .iter()
                .map(|o| (o.name.clone(), o.weight().unwrap_or(0.0) / total))
                .collect(),
        )
    }
}

impl Deref for ValidatedConfig {
    type Target = OptimizationConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

/// Runs every validation rule against `config`.
///
/// A pure function of its input: no state is carried between calls, and a
/// failed validation reports every broken rule, not just the first.
///
/// # Errors
/// Returns a [`ValidationError`] listing one [`Violation`] per broken rule.
pub fn validate(config: OptimizationConfig) -> Result<ValidatedConfig, ValidationError> {
    let mut violations = Vec::new();

    check_parameters(&config.parameters, &mut violations);
    check_objectives(&config.objectives, &mut violations);
    check_multi_objective(&config, &mut violations);
    check_constraints(&config, &mut violations);
    check_execution_fields(&config, &mut violations);

    if violations.is_empty() {
        Ok(ValidatedConfig { config })
    } else {
        Err(ValidationError::new(violations))
    }
}

fn check_parameters(parameters: &[Parameter], out: &mut Vec<Violation>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (i, param) in parameters.iter().enumerate() {
        let path = format!("parameters[{i}]");

        if param.name.trim().is_empty() {
            out.push(Violation::new(
                Rule::ParameterEmptyName,
                format!("{path}.name"),
                "parameter name must not be empty",
            ));
        } else if let Some(first) = seen.insert(param.name.as_str(), i) {
            out.push(Violation::new(
                Rule::ParameterDuplicateName,
                format!("{path}.name"),
                format!(
                    "parameter name '{}' already used at parameters[{first}]",
                    param.name
                ),
            ));
        }

        match &param.kind {
            ParameterKind::Continuous {
                low_value,
                high_value,
            } => {
                check_bounds(*low_value, *high_value, &path, out);
            }
            ParameterKind::Discrete {
                low_value,
                high_value,
                stride,
            } => {
                let bounds_ok = check_bounds(*low_value, *high_value, &path, out);
                if !(stride.is_finite() && *stride > 0.0) {
                    out.push(Violation::new(
                        Rule::ParameterStride,
                        format!("{path}.stride"),
                        format!("stride must be a positive number, got {stride}"),
                    ));
                } else if bounds_ok && *stride > high_value - low_value {
                    out.push(Violation::new(
                        Rule::ParameterStride,
                        format!("{path}.stride"),
                        format!(
                            "stride {stride} exceeds the range span {}",
                            high_value - low_value
                        ),
                    ));
                }
            }
            ParameterKind::Categorical { options } => check_options(options, &path, out),
        }
    }
}

fn check_bounds(low: f64, high: f64, path: &str, out: &mut Vec<Violation>) -> bool {
    if low.is_finite() && high.is_finite() && low < high {
        true
    } else {
        out.push(Violation::new(
            Rule::ParameterBoundsOrder,
            path.to_string(),
            format!("bounds must be finite and ordered low < high, got [{low}, {high}]"),
        ));
        false
    }
}

fn check_options(options: &[CategoryDescriptor], path: &str, out: &mut Vec<Violation>) {
    if options.is_empty() {
        out.push(Violation::new(
            Rule::ParameterNoOptions,
            format!("{path}.options"),
            "categorical parameter must declare at least one option",
        ));
        return;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (j, option) in options.iter().enumerate() {
        if let Some(first) = seen.insert(option.category.as_str(), j) {
            out.push(Violation::new(
                Rule::ParameterDuplicateCategory,
                format!("{path}.options[{j}].category"),
                format!(
                    "category '{}' already listed at options[{first}]",
                    option.category
                ),
            ));
        }
    }

    // If any option carries descriptors, every option must carry the same
    // descriptor keys.
    let reference = options
        .iter()
        .enumerate()
        .find_map(|(j, o)| o.properties.as_ref().map(|p| (j, p)));
    let Some((ref_idx, ref_props)) = reference else {
        return;
    };
    let ref_keys: BTreeSet<&String> = ref_props.keys().collect();

    for (j, option) in options.iter().enumerate() {
        match &option.properties {
            None => out.push(Violation::new(
                Rule::ParameterDescriptorKeys,
                format!("{path}.options[{j}].properties"),
                format!(
                    "category '{}' lacks descriptor properties while '{}' declares them",
                    option.category, options[ref_idx].category
                ),
            )),
            Some(props) => {
                let keys: BTreeSet<&String> = props.keys().collect();
                if keys != ref_keys {
                    out.push(Violation::new(
                        Rule::ParameterDescriptorKeys,
                        format!("{path}.options[{j}].properties"),
                        format!(
                            "category '{}' has descriptor keys {keys:?} but '{}' has {ref_keys:?}",
                            option.category, options[ref_idx].category
                        ),
                    ));
                }
            }
        }
    }
}

fn check_objectives(objectives: &[Objective], out: &mut Vec<Violation>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (i, objective) in objectives.iter().enumerate() {
        let path = format!("objectives[{i}]");

        if objective.name.trim().is_empty() {
            out.push(Violation::new(
                Rule::ObjectiveEmptyName,
                format!("{path}.name"),
                "objective name must not be empty",
            ));
        } else if let Some(first) = seen.insert(objective.name.as_str(), i) {
            out.push(Violation::new(
                Rule::ObjectiveDuplicateName,
                format!("{path}.name"),
                format!(
                    "objective name '{}' already used at objectives[{first}]",
                    objective.name
                ),
            ));
        }

        match (objective.goal, objective.target) {
            (ObjectiveGoal::Target, None) => out.push(Violation::new(
                Rule::ObjectiveTargetGoal,
                format!("{path}.target"),
                format!("objective '{}' has goal 'target' but no target value", objective.name),
            )),
            (ObjectiveGoal::Target, Some(t)) if !t.is_finite() => out.push(Violation::new(
                Rule::ObjectiveTargetGoal,
                format!("{path}.target"),
                format!("target must be finite, got {t}"),
            )),
            (ObjectiveGoal::Min | ObjectiveGoal::Max, Some(_)) => out.push(Violation::new(
                Rule::ObjectiveTargetGoal,
                format!("{path}.target"),
                format!(
                    "objective '{}' carries a target value but its goal is '{}'",
                    objective.name,
                    objective.goal.as_str()
                ),
            )),
            _ => {}
        }
    }
}

fn check_multi_objective(config: &OptimizationConfig, out: &mut Vec<Violation>) {
    let n = config.objectives.len();

    // A single objective needs no scheme; any per-objective settings are
    // simply ignored.
    if n <= 1 {
        return;
    }

    let Some(function) = config.multi_objective_function else {
        out.push(Violation::new(
            Rule::MofMissing,
            "multi_objective_function",
            format!("{n} objectives declared but no multi-objective function selected"),
        ));
        return;
    };

    match function {
        MultiObjectiveFunction::Chimera => check_hierarchy(&config.objectives, out),
        MultiObjectiveFunction::WeightedSum => check_weights(&config.objectives, out),
    }
}

fn check_hierarchy(objectives: &[Objective], out: &mut Vec<Violation>) {
    let n = objectives.len();
    let mut by_rank: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut scheme_ok = true;

    for (i, objective) in objectives.iter().enumerate() {
        let path = format!("objectives[{i}].multi_objective");
        match &objective.multi_objective {
            None => {
                scheme_ok = false;
                out.push(Violation::new(
                    Rule::MofSchemeMismatch,
                    path,
                    format!(
                        "objective '{}' lacks the hierarchy configuration required by chimera",
                        objective.name
                    ),
                ));
            }
            Some(MultiObjectiveConfig::Weighted { .. }) => {
                scheme_ok = false;
                out.push(Violation::new(
                    Rule::MofSchemeMismatch,
                    path,
                    format!(
                        "objective '{}' carries a weight but chimera is selected",
                        objective.name
                    ),
                ));
            }
            Some(entry @ MultiObjectiveConfig::Hierarchy { hierarchy, .. }) => {
                by_rank.entry(*hierarchy).or_default().push(i);
                check_hierarchy_tolerance(objective, entry, *hierarchy as usize, n, &path, out);
            }
        }
    }

    let mut unique = true;
    for (rank, holders) in &by_rank {
        if holders.len() > 1 {
            unique = false;
            let names = holders
                .iter()
                .map(|&i| format!("'{}'", objectives[i].name))
                .collect::<Vec<_>>()
                .join(" and ");
            let last = holders.last().copied().unwrap_or(0);
            out.push(Violation::new(
                Rule::HierarchyRankDuplicate,
                format!("objectives[{last}].multi_objective.hierarchy"),
                format!("hierarchy rank {rank} is assigned to {names}"),
            ));
        }
    }

    // Contiguity is only meaningful once every objective is ranked and the
    // ranks are unique.
    if scheme_ok && unique {
        let expected: BTreeSet<u32> = (0..u32::try_from(n).unwrap_or(u32::MAX)).collect();
        let actual: BTreeSet<u32> = by_rank.keys().copied().collect();
        if actual != expected {
            let missing: Vec<u32> = expected.difference(&actual).copied().collect();
            let stray: Vec<u32> = actual.difference(&expected).copied().collect();
            let mut detail = Vec::new();
            if !missing.is_empty() {
                detail.push(format!("missing {missing:?}"));
            }
            if !stray.is_empty() {
                detail.push(format!("out of range {stray:?}"));
            }
            out.push(Violation::new(
                Rule::HierarchyRankGap,
                "objectives",
                format!(
                    "hierarchy ranks must cover 0..={} exactly: {}",
                    n - 1,
                    detail.join(", ")
                ),
            ));
        }
    }
}

fn check_hierarchy_tolerance(
    objective: &Objective,
    entry: &MultiObjectiveConfig,
    rank: usize,
    objective_count: usize,
    path: &str,
    out: &mut Vec<Violation>,
) {
    if entry.has_conflicting_tolerance() {
        out.push(Violation::new(
            Rule::HierarchyToleranceRange,
            path.to_string(),
            format!(
                "objective '{}' carries both a relative and an absolute tolerance",
                objective.name
            ),
        ));
        return;
    }

    match entry.tolerance() {
        Some(Tolerance::Relative(v)) if !(0.0..=100.0).contains(&v) => {
            out.push(Violation::new(
                Rule::HierarchyToleranceRange,
                path.to_string(),
                format!("relative tolerance must lie in 0..=100, got {v}"),
            ));
        }
        Some(Tolerance::Absolute(v)) if !(v.is_finite() && v >= 0.0) => {
            out.push(Violation::new(
                Rule::HierarchyToleranceRange,
                path.to_string(),
                format!("absolute tolerance must be a non-negative number, got {v}"),
            ));
        }
        Some(t) if rank + 1 == objective_count && !t.is_zero() => {
            out.push(Violation::new(
                Rule::HierarchyTerminalTolerance,
                path.to_string(),
                format!(
                    "objective '{}' holds the lowest priority and must not tolerate degradation",
                    objective.name
                ),
            ));
        }
        None if rank + 1 < objective_count => {
            out.push(Violation::new(
                Rule::HierarchyToleranceMissing,
                path.to_string(),
                format!(
                    "objective '{}' at rank {rank} requires a relative or absolute tolerance",
                    objective.name
                ),
            ));
        }
        _ => {}
    }
}

fn check_weights(objectives: &[Objective], out: &mut Vec<Violation>) {
    let mut weights = Vec::new();
    let mut scheme_ok = true;

    for (i, objective) in objectives.iter().enumerate() {
        let path = format!("objectives[{i}].multi_objective");
        match &objective.multi_objective {
            None => {
                scheme_ok = false;
                out.push(Violation::new(
                    Rule::MofSchemeMismatch,
                    path,
                    format!(
                        "objective '{}' lacks the weight required by weighted_sum",
                        objective.name
                    ),
                ));
            }
            Some(MultiObjectiveConfig::Hierarchy { .. }) => {
                scheme_ok = false;
                out.push(Violation::new(
                    Rule::MofSchemeMismatch,
                    path,
                    format!(
                        "objective '{}' carries a hierarchy entry but weighted_sum is selected",
                        objective.name
                    ),
                ));
            }
            Some(MultiObjectiveConfig::Weighted { weight }) => {
                if weight.is_finite() && *weight >= 0.0 {
                    weights.push(*weight);
                } else {
                    scheme_ok = false;
                    out.push(Violation::new(
                        Rule::WeightNegative,
                        format!("{path}.weight"),
                        format!("weight must be a non-negative number, got {weight}"),
                    ));
                }
            }
        }
    }

    if scheme_ok && weights.iter().all(|w| *w == 0.0) {
        out.push(Violation::new(
            Rule::WeightAllZero,
            "objectives",
            "at least one objective weight must be positive",
        ));
    }
}

fn check_constraints(config: &OptimizationConfig, out: &mut Vec<Violation>) {
    let known: HashSet<&str> = config.parameters.iter().map(|p| p.name.as_str()).collect();

    for (i, constraint) in config.constraints.iter().enumerate() {
        let path = format!("constraints[{i}]");
        if let Some(linear) = constraint.as_linear() {
            check_linear(constraint, linear, &known, &path, out);
        } else if let Some(exclusion) = constraint.as_exclusion() {
            let conditional = matches!(constraint, Constraint::ConditionalExclusion(_));
            check_exclusion(constraint, exclusion, conditional, &known, &path, out);
        }
    }
}

fn check_linear(
    constraint: &Constraint,
    linear: &LinearConstraint,
    known: &HashSet<&str>,
    path: &str,
    out: &mut Vec<Violation>,
) {
    if linear.terms.is_empty() {
        out.push(Violation::new(
            Rule::ConstraintEmptyTerms,
            format!("{path}.terms"),
            format!("constraint '{}' declares no terms", constraint.label()),
        ));
    }

    for (j, term) in linear.terms.iter().enumerate() {
        if !known.contains(term.parameter.as_str()) {
            out.push(Violation::new(
                Rule::ConstraintUnknownParameter,
                format!("{path}.terms[{j}].parameter"),
                format!(
                    "constraint '{}' references unknown parameter '{}'",
                    constraint.label(),
                    term.parameter
                ),
            ));
        }
    }

    let expected = constraint.expected_target_count().unwrap_or(1);
    if linear.targets.len() == expected {
        if let Some(bad) = linear.targets.iter().find(|t| !t.is_finite()) {
            out.push(Violation::new(
                Rule::ConstraintTargetCount,
                format!("{path}.targets"),
                format!("target values must be finite, got {bad}"),
            ));
        } else if expected == 2 && linear.targets[0] >= linear.targets[1] {
            out.push(Violation::new(
                Rule::ConstraintIntervalOrder,
                format!("{path}.targets"),
                format!(
                    "between targets must be ordered low < high, got [{}, {}]",
                    linear.targets[0], linear.targets[1]
                ),
            ));
        }
    } else {
        out.push(Violation::new(
            Rule::ConstraintTargetCount,
            format!("{path}.targets"),
            format!(
                "constraint '{}' expects exactly {expected} target value(s), found {}",
                constraint.label(),
                linear.targets.len()
            ),
        ));
    }
}

fn check_exclusion(
    constraint: &Constraint,
    exclusion: &ExclusionConstraint,
    conditional: bool,
    known: &HashSet<&str>,
    path: &str,
    out: &mut Vec<Violation>,
) {
    if conditional && exclusion.terms.len() < 2 {
        out.push(Violation::new(
            Rule::ConstraintConditionShape,
            format!("{path}.terms"),
            format!(
                "constraint '{}' needs a condition term and at least one excluded term",
                constraint.label()
            ),
        ));
    } else if exclusion.terms.is_empty() {
        out.push(Violation::new(
            Rule::ConstraintEmptyTerms,
            format!("{path}.terms"),
            format!("constraint '{}' declares no terms", constraint.label()),
        ));
    }

    for (j, term) in exclusion.terms.iter().enumerate() {
        if !known.contains(term.parameter.as_str()) {
            out.push(Violation::new(
                Rule::ConstraintUnknownParameter,
                format!("{path}.terms[{j}].parameter"),
                format!(
                    "constraint '{}' references unknown parameter '{}'",
                    constraint.label(),
                    term.parameter
                ),
            ));
        }
        if term.bounds.is_empty() {
            out.push(Violation::new(
                Rule::ConstraintEmptyTerms,
                format!("{path}.terms[{j}].bounds"),
                format!("term for parameter '{}' lists no intervals", term.parameter),
            ));
        }
        for (k, interval) in term.bounds.iter().enumerate() {
            if !interval.is_well_formed() {
                out.push(Violation::new(
                    Rule::ConstraintIntervalOrder,
                    format!("{path}.terms[{j}].bounds[{k}]"),
                    format!(
                        "interval must be finite and ordered low < high, got [{}, {}]",
                        interval.low, interval.high
                    ),
                ));
            }
        }
    }
}

fn check_execution_fields(config: &OptimizationConfig, out: &mut Vec<Violation>) {
    if config.name.trim().is_empty() {
        out.push(Violation::new(
            Rule::ConfigEmptyName,
            "name",
            "campaign name must not be empty",
        ));
    }
    if config.batch_size == 0 {
        out.push(Violation::new(
            Rule::BatchSize,
            "batch_size",
            "batch size must be at least 1",
        ));
    }
    if config.budget == 0 {
        out.push(Violation::new(
            Rule::Budget,
            "budget",
            "budget must be at least 1",
        ));
    }
}
