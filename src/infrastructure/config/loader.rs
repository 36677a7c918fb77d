//! Configuration document loading.
//!
//! Optimization campaigns are described by JSON or YAML documents. The
//! loader layers programmatic defaults, the document itself, and
//! `OPTLOOP_*` environment overrides, then reports anything the schema
//! rejects as ordinary validation violations so callers see one error
//! shape regardless of where a document went wrong.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::error::{Rule, ValidationError, Violation};
use crate::domain::models::OptimizationConfig;
use crate::domain::validate::{validate, ValidatedConfig};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "OPTLOOP_";

/// Configuration loading error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document path does not exist.
    #[error("Configuration file not found: {}", path.display())]
    NotFound {
        /// The path that was probed.
        path: PathBuf,
    },

    /// The document extension names no supported format.
    #[error(
        "Unsupported configuration format '{extension}' for {}. Must be one of: json, yaml, yml",
        path.display()
    )]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
        /// Its extension, possibly empty.
        extension: String,
    },

    /// The document failed schema or rule validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Loader for campaign configuration documents.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a configuration document with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. The document file, JSON or YAML by extension
    /// 3. Environment variables (`OPTLOOP_*` prefix, `__` nesting)
    ///
    /// The result has not been rule-checked; see
    /// [`ConfigLoader::load_validated`] for the one-step form.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<OptimizationConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let defaults = Figment::from(Serialized::defaults(OptimizationConfig::default()));
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let figment = match extension.as_str() {
            "json" => defaults.merge(Json::file(path)),
            "yaml" | "yml" => defaults.merge(Yaml::file(path)),
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                })
            }
        };

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| schema_violations(e).into())
    }

    /// Parses a JSON document over the defaults, without environment
    /// overrides.
    pub fn from_json_str(document: &str) -> Result<OptimizationConfig, ConfigError> {
        Figment::from(Serialized::defaults(OptimizationConfig::default()))
            .merge(Json::string(document))
            .extract()
            .map_err(|e| schema_violations(e).into())
    }

    /// Parses a YAML document over the defaults, without environment
    /// overrides.
    pub fn from_yaml_str(document: &str) -> Result<OptimizationConfig, ConfigError> {
        Figment::from(Serialized::defaults(OptimizationConfig::default()))
            .merge(Yaml::string(document))
            .extract()
            .map_err(|e| schema_violations(e).into())
    }

    /// Loads a document and runs the full rule check in one step.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<ValidatedConfig, ConfigError> {
        let config = Self::load_from_file(path)?;
        Ok(validate(config)?)
    }
}

/// Converts a figment extraction failure into schema violations.
///
/// Every individual error keeps its field path, so a document with
/// several bad fields reports them all at once like the rule checks do.
fn schema_violations(error: figment::Error) -> ValidationError {
    let violations: Vec<Violation> = error
        .into_iter()
        .map(|e| {
            let path = if e.path.is_empty() {
                "<document>".to_string()
            } else {
                e.path.join(".")
            };
            Violation::new(Rule::Schema, path, e.kind.to_string())
        })
        .collect();
    ValidationError::new(violations)
}
