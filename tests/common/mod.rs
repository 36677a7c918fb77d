//! Common test fixtures for integration tests
//!
//! Builders for configurations, objectives, and suggestions shared across
//! the integration test files.

use std::collections::HashMap;

use optloop::domain::models::{
    CategoryDescriptor, MultiObjectiveConfig, MultiObjectiveFunction, Objective, ObjectiveGoal,
    OptimizationConfig, Parameter, ParameterKind, ParamValue,
};
use optloop::domain::ports::Suggestion;
use optloop::domain::validate::{validate, ValidatedConfig};

/// A continuous parameter over `[low, high]`.
#[allow(dead_code)]
pub fn continuous(name: &str, low: f64, high: f64) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParameterKind::Continuous {
            low_value: low,
            high_value: high,
        },
        description: None,
    }
}

/// A discrete parameter stepping by `stride` over `[low, high]`.
#[allow(dead_code)]
pub fn discrete(name: &str, low: f64, high: f64, stride: f64) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParameterKind::Discrete {
            low_value: low,
            high_value: high,
            stride,
        },
        description: None,
    }
}

/// A categorical parameter with bare option labels.
#[allow(dead_code)]
pub fn categorical(name: &str, options: &[&str]) -> Parameter {
    Parameter {
        name: name.to_string(),
        kind: ParameterKind::Categorical {
            options: options.iter().map(|o| CategoryDescriptor::new(*o)).collect(),
        },
        description: None,
    }
}

/// A plain objective without scheme settings.
#[allow(dead_code)]
pub fn objective(name: &str, goal: ObjectiveGoal) -> Objective {
    Objective {
        name: name.to_string(),
        goal,
        target: None,
        description: None,
        multi_objective: None,
    }
}

/// An objective carrying a chimera hierarchy entry.
#[allow(dead_code)]
pub fn chimera(
    name: &str,
    goal: ObjectiveGoal,
    rank: u32,
    relative: Option<f64>,
    absolute: Option<f64>,
) -> Objective {
    Objective {
        multi_objective: Some(MultiObjectiveConfig::Hierarchy {
            hierarchy: rank,
            relative,
            absolute,
        }),
        ..objective(name, goal)
    }
}

/// An objective carrying a scalarization weight.
#[allow(dead_code)]
pub fn weighted(name: &str, goal: ObjectiveGoal, weight: f64) -> Objective {
    Objective {
        multi_objective: Some(MultiObjectiveConfig::Weighted { weight }),
        ..objective(name, goal)
    }
}

/// A configuration over the given search space, otherwise defaulted.
#[allow(dead_code)]
pub fn config(parameters: Vec<Parameter>, objectives: Vec<Objective>) -> OptimizationConfig {
    OptimizationConfig {
        name: "sample-campaign".to_string(),
        parameters,
        objectives,
        ..OptimizationConfig::default()
    }
}

/// Two continuous parameters and a two-level chimera hierarchy:
/// maximize conductivity (rank 0, 10 % tolerance), minimize toxicity
/// (rank 1, terminal zero tolerance).
#[allow(dead_code)]
pub fn chimera_pair_config() -> OptimizationConfig {
    let mut cfg = config(
        vec![
            continuous("param_a", 0.0, 10.0),
            continuous("param_b", 0.0, 10.0),
        ],
        vec![
            chimera("conductivity", ObjectiveGoal::Max, 0, Some(10.0), None),
            chimera("toxicity", ObjectiveGoal::Min, 1, Some(0.0), None),
        ],
    );
    cfg.multi_objective_function = Some(MultiObjectiveFunction::Chimera);
    cfg
}

/// A minimal single-objective configuration with the given run limits.
#[allow(dead_code)]
pub fn single_objective_config(budget: u32, batch_size: u32) -> OptimizationConfig {
    let mut cfg = config(
        vec![
            continuous("param_a", 0.0, 1.0),
            continuous("param_b", -5.0, 5.0),
        ],
        vec![objective("conductivity", ObjectiveGoal::Max)],
    );
    cfg.budget = budget;
    cfg.batch_size = batch_size;
    cfg
}

/// Validates a configuration that the test expects to be well formed.
#[allow(dead_code)]
pub fn validated(config: OptimizationConfig) -> ValidatedConfig {
    validate(config).expect("fixture configuration should validate")
}

/// A numeric suggestion over the given parameter values.
#[allow(dead_code)]
pub fn suggestion(id: &str, values: &[(&str, f64)]) -> Suggestion {
    Suggestion {
        id: id.to_string(),
        values: values
            .iter()
            .map(|(name, value)| ((*name).to_string(), ParamValue::Number(*value)))
            .collect(),
    }
}

/// Measurement maps keyed by objective name.
#[allow(dead_code)]
pub fn measurements(values: &[(&str, f64)]) -> HashMap<String, f64> {
    values
        .iter()
        .map(|(name, value)| ((*name).to_string(), *value))
        .collect()
}
