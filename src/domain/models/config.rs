//! Experiment configuration aggregate.
//!
//! [`OptimizationConfig`] is the full experiment document: identity,
//! search space, objectives, constraints, and execution settings. Every
//! field but the search-space lists has a default, so minimal documents
//! stay short.

use serde::{Deserialize, Serialize};

use super::constraint::Constraint;
use super::objective::{MultiObjectiveFunction, Objective};
use super::parameter::Parameter;

/// Complete description of one optimization campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// Campaign name. Sessions are addressed by name within a group, so
    /// reusing a name resumes (or restarts) the same campaign.
    #[serde(default = "default_name")]
    pub name: String,

    /// Free-form description forwarded to the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Namespace that scopes session names.
    #[serde(default = "default_group")]
    pub group: String,

    /// The search space.
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// The measured quantities.
    #[serde(default)]
    pub objectives: Vec<Objective>,

    /// Feasibility restrictions on suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,

    /// How multiple objectives combine. Required when more than one
    /// objective is declared, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_objective_function: Option<MultiObjectiveFunction>,

    /// The optimizer the remote service should run.
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Suggestions requested per iteration.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Total number of suggestion batches the session may issue.
    #[serde(default = "default_budget")]
    pub budget: u32,

    /// Seed forwarded to the remote optimizer for reproducible runs.
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Stop any live session with the same name and create a fresh one
    /// instead of resuming it.
    #[serde(default)]
    pub always_restart: bool,

    /// Ask the service to preload measurements from earlier sessions of the
    /// same campaign when creating a session.
    #[serde(default)]
    pub inherit_data: bool,
}

fn default_name() -> String {
    "SampleOptimization".to_string()
}

fn default_group() -> String {
    "default".to_string()
}

const fn default_batch_size() -> u32 {
    1
}

const fn default_budget() -> u32 {
    20
}

const fn default_random_seed() -> u64 {
    2022
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            group: default_group(),
            parameters: Vec::new(),
            objectives: Vec::new(),
            constraints: Vec::new(),
            multi_objective_function: None,
            algorithm: Algorithm::default(),
            batch_size: default_batch_size(),
            budget: default_budget(),
            random_seed: default_random_seed(),
            always_restart: false,
            inherit_data: false,
        }
    }
}

impl OptimizationConfig {
    /// True when the configuration declares more than one objective and so
    /// must select a multi-objective function.
    pub fn is_multi_objective(&self) -> bool {
        self.objectives.len() > 1
    }
}

/// Optimizer implementations the remote service can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Dragonfly-based Bayesian optimization.
    Falcondngo,
    /// Gaussian-process Bayesian optimization.
    Falcongpbo,
    /// Bayesian reaction optimization for discrete spaces.
    Edboplus,
    /// Exhaustive grid sweep.
    Grid,
    /// Uniform random sampling.
    Randomsearch,
    /// Scientific-method sequential optimizer.
    Semopt,
}

impl Algorithm {
    /// Stable lowercase label, matching the wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Falcondngo => "falcondngo",
            Self::Falcongpbo => "falcongpbo",
            Self::Edboplus => "edboplus",
            Self::Grid => "grid",
            Self::Randomsearch => "randomsearch",
            Self::Semopt => "semopt",
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Edboplus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_fills_defaults() {
        let json = r#"{
            "parameters": [
                {"name": "temperature", "type": "continuous", "low_value": 20.0, "high_value": 80.0}
            ],
            "objectives": [{"name": "yield", "goal": "max"}]
        }"#;
        let config: OptimizationConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.name, "SampleOptimization");
        assert_eq!(config.group, "default");
        assert_eq!(config.algorithm, Algorithm::Edboplus);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.budget, 20);
        assert_eq!(config.random_seed, 2022);
        assert!(!config.always_restart);
        assert!(!config.inherit_data);
        assert!(!config.is_multi_objective());
    }

    #[test]
    fn algorithm_wire_names_are_lowercase() {
        for algorithm in [
            Algorithm::Falcondngo,
            Algorithm::Falcongpbo,
            Algorithm::Edboplus,
            Algorithm::Grid,
            Algorithm::Randomsearch,
            Algorithm::Semopt,
        ] {
            let encoded = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(encoded, format!("\"{}\"", algorithm.as_str()));
        }
    }

    #[test]
    fn yaml_document_deserializes() {
        let yaml = r"
name: PolymerScreen
group: materials
parameters:
  - name: solvent
    type: categorical
    options:
      - category: ethanol
      - category: toluene
objectives:
  - name: conductivity
    goal: max
batch_size: 4
budget: 12
";
        let config: OptimizationConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.name, "PolymerScreen");
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.parameters.len(), 1);
    }
}
