//! Wire types for the optimization service's REST surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::models::ParamValue;
use crate::domain::ports::{MeasurementRecord, Suggestion};

/// Lifecycle state a session reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// The session accepts polls and measurements.
    Running,
    /// The session was stopped by a client.
    Stopped,
    /// The optimizer finished the session on its own.
    Completed,
    /// A state this client version does not know.
    #[serde(other)]
    Unknown,
}

impl SessionState {
    /// True when the session can still be driven.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// One session as the service describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDto {
    /// Service-assigned identifier.
    pub id: String,
    /// Campaign name the session runs under.
    pub name: String,
    /// Reported lifecycle state.
    pub state: SessionState,
    /// Suggestion batches the session has already issued.
    #[serde(default)]
    pub completed_iterations: u32,
}

/// Body of a suggestion poll response.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsResponse {
    /// Fresh suggestions, possibly none.
    #[serde(default)]
    pub suggestions: Vec<SuggestionDto>,
}

/// One suggested parameter assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionDto {
    /// Service-assigned suggestion identifier.
    pub id: String,
    /// Proposed value per parameter name.
    pub values: HashMap<String, ParamValue>,
}

impl From<SuggestionDto> for Suggestion {
    fn from(dto: SuggestionDto) -> Self {
        Self {
            id: dto.id,
            values: dto.values,
        }
    }
}

/// Body of a measurement submission.
#[derive(Debug, Serialize)]
pub struct MeasurementsRequest<'a> {
    /// One report per measured suggestion.
    pub reports: Vec<MeasurementReport<'a>>,
}

/// One measured suggestion inside a submission.
#[derive(Debug, Serialize)]
pub struct MeasurementReport<'a> {
    /// The suggestion the values answer.
    pub suggestion_id: &'a str,
    /// Measured value per objective name.
    pub values: &'a HashMap<String, f64>,
}

impl<'a> From<&'a [MeasurementRecord]> for MeasurementsRequest<'a> {
    fn from(records: &'a [MeasurementRecord]) -> Self {
        Self {
            reports: records
                .iter()
                .map(|record| MeasurementReport {
                    suggestion_id: &record.suggestion_id,
                    values: &record.values,
                })
                .collect(),
        }
    }
}

/// Error body shape the service uses when it can manage one.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Detailed failure description.
    #[serde(default)]
    pub detail: Option<String>,
    /// Short failure description, older servers.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_session_states_do_not_break_decoding() {
        let dto: SessionDto = serde_json::from_str(
            r#"{"id": "s-1", "name": "run", "state": "archived", "completed_iterations": 3}"#,
        )
        .unwrap();
        assert_eq!(dto.state, SessionState::Unknown);
        assert!(!dto.state.is_live());

        let running: SessionDto =
            serde_json::from_str(r#"{"id": "s-2", "name": "run", "state": "running"}"#).unwrap();
        assert!(running.state.is_live());
        assert_eq!(running.completed_iterations, 0);
    }

    #[test]
    fn measurement_request_serializes_reports() {
        let records = vec![MeasurementRecord {
            suggestion_id: "sugg-1".to_string(),
            values: HashMap::from([("yield".to_string(), 0.82)]),
        }];

        let body = serde_json::to_value(MeasurementsRequest::from(records.as_slice())).unwrap();
        assert_eq!(body["reports"][0]["suggestion_id"], "sugg-1");
        assert!((body["reports"][0]["values"]["yield"].as_f64().unwrap() - 0.82).abs() < 1e-12);
    }
}
