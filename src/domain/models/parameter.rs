//! Search-space parameter model.
//!
//! A parameter is one dimension of the experiment search space. The remote
//! optimizer proposes a value for every parameter in each suggestion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dimension of the optimization search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, unique within a configuration. Suggestion value maps
    /// are keyed by this name.
    pub name: String,

    /// The kind of range this parameter spans.
    #[serde(flatten)]
    pub kind: ParameterKind,

    /// Free-form description forwarded to the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Describes the value range of a parameter.
///
/// Serialized with a `type` tag (`continuous` / `discrete` / `categorical`)
/// alongside the variant's own fields, matching the experiment document
/// schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Real-valued range `[low_value, high_value]`.
    Continuous {
        /// Lower bound (inclusive).
        low_value: f64,
        /// Upper bound (inclusive). Must be strictly greater than the lower
        /// bound.
        high_value: f64,
    },
    /// Evenly spaced numeric grid over `[low_value, high_value]`.
    Discrete {
        /// Lower bound (inclusive).
        low_value: f64,
        /// Upper bound (inclusive).
        high_value: f64,
        /// Spacing between admissible values. Must be positive and no larger
        /// than the span of the range.
        stride: f64,
    },
    /// Closed set of named options, optionally annotated with numeric
    /// descriptor properties.
    Categorical {
        /// The admissible options. If any option carries descriptor
        /// properties, every option must carry properties with the same keys.
        options: Vec<CategoryDescriptor>,
    },
}

impl ParameterKind {
    /// Stable lowercase label, matching the wire `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continuous { .. } => "continuous",
            Self::Discrete { .. } => "discrete",
            Self::Categorical { .. } => "categorical",
        }
    }

    /// Numeric bounds for continuous and discrete kinds.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Self::Continuous {
                low_value,
                high_value,
            }
            | Self::Discrete {
                low_value,
                high_value,
                ..
            } => Some((*low_value, *high_value)),
            Self::Categorical { .. } => None,
        }
    }

    /// True for the categorical kind.
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Categorical { .. })
    }
}

/// One option of a categorical parameter.
///
/// Descriptor properties let the optimizer reason about categories
/// numerically (e.g. a solvent's polarity). They are optional, but a
/// configuration is only valid when either no option or every option of a
/// parameter carries the same property keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    /// Option label. Suggestions reference categorical values by this label.
    pub category: String,

    /// Named numeric descriptor properties for this option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, f64>>,
}

impl CategoryDescriptor {
    /// A bare option without descriptor properties.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            properties: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_parameter_deserializes_from_document_shape() {
        let json = r#"{"name": "temperature", "type": "continuous", "low_value": 20.0, "high_value": 80.0}"#;
        let param: Parameter = serde_json::from_str(json).unwrap();

        assert_eq!(param.name, "temperature");
        assert_eq!(param.kind.as_str(), "continuous");
        assert_eq!(param.kind.bounds(), Some((20.0, 80.0)));
    }

    #[test]
    fn categorical_parameter_carries_descriptor_properties() {
        let json = r#"{
            "name": "solvent",
            "type": "categorical",
            "options": [
                {"category": "ethanol", "properties": {"polarity": 0.65}},
                {"category": "toluene", "properties": {"polarity": 0.1}}
            ]
        }"#;
        let param: Parameter = serde_json::from_str(json).unwrap();

        assert!(param.kind.is_categorical());
        assert!(param.kind.bounds().is_none());
        let ParameterKind::Categorical { options } = &param.kind else {
            panic!("expected categorical kind");
        };
        assert_eq!(options.len(), 2);
        assert_eq!(
            options[0].properties.as_ref().unwrap().get("polarity"),
            Some(&0.65)
        );
    }

    #[test]
    fn missing_kind_fields_are_schema_errors() {
        let json = r#"{"name": "temperature", "type": "continuous", "low_value": 20.0}"#;
        assert!(serde_json::from_str::<Parameter>(json).is_err());
    }
}
