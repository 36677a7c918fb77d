use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::models::ParamValue;
use crate::domain::validate::ValidatedConfig;

/// A live optimization session on the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
    /// Service-assigned session identifier, used to address follow-up calls.
    pub id: String,
    /// Campaign name the session was opened under.
    pub name: String,
    /// Group that scopes the campaign name.
    pub group: String,
    /// Number of suggestion batches the session has already issued. Zero
    /// for fresh sessions, possibly nonzero when resuming.
    pub iteration: u32,
    /// True when an existing live session was picked up instead of a new
    /// one being created.
    pub resumed: bool,
    /// When this handle was obtained.
    pub opened_at: DateTime<Utc>,
}

/// One raw suggestion as returned by the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Service-assigned suggestion identifier.
    pub id: String,
    /// Proposed value for every parameter of the configuration.
    pub values: HashMap<String, ParamValue>,
}

/// Measured objective values for one suggestion, ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    /// The suggestion these measurements answer.
    pub suggestion_id: String,
    /// Measured value per configured objective name.
    pub values: HashMap<String, f64>,
}

/// Error types for session client operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The service could not be reached at all.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request did not complete within the client's deadline.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The service asked the client to slow down.
    #[error("Rate limited by the service: {0}")]
    RateLimited(String),

    /// The service answered with a server-side failure.
    #[error("Service unavailable (HTTP {status}): {message}")]
    Unavailable {
        /// The HTTP status code.
        status: u16,
        /// Response detail, when the body carried any.
        message: String,
    },

    /// Credentials were missing, expired, or insufficient.
    #[error("Authentication rejected (HTTP {status}): {message}")]
    Auth {
        /// The HTTP status code.
        status: u16,
        /// Response detail, when the body carried any.
        message: String,
    },

    /// The service understood the request and refused it.
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected {
        /// The HTTP status code.
        status: u16,
        /// Response detail, when the body carried any.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("Malformed service response: {0}")]
    Protocol(String),
}

impl ServiceError {
    /// Classifies an HTTP error status into a service error.
    ///
    /// Transient statuses (408, 429, 5xx) map to retryable variants;
    /// everything else in the 4xx range is a permanent rejection.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth { status, message },
            408 => Self::Timeout(format!("HTTP 408: {message}")),
            429 => Self::RateLimited(message),
            400..=499 => Self::Rejected { status, message },
            _ => Self::Unavailable { status, message },
        }
    }

    /// True when retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) | Self::RateLimited(_) | Self::Unavailable { .. } => true,
            Self::Auth { .. } | Self::Rejected { .. } | Self::Protocol(_) => false,
        }
    }
}

/// Port trait for the remote optimization session protocol.
///
/// Implementations own transport, authentication, and wire formats. The
/// driver built on top only sees sessions, suggestions, and measurements.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Open a session for the configured campaign.
    ///
    /// Looks for a live session with the configuration's name and group.
    /// When one exists it is resumed, unless the configuration demands a
    /// restart, in which case it is stopped and a fresh session is created.
    /// Creation passes the configuration's data-inheritance wish along.
    ///
    /// # Returns
    /// * `Ok(SessionHandle)` - An addressable live session
    /// * `Err(ServiceError)` - The session could not be obtained
    ///
    /// # Errors
    /// - `ServiceError::Auth` - Credentials rejected (non-retryable)
    /// - `ServiceError::Rejected` - The service refused the configuration (non-retryable)
    /// - `ServiceError::Connection` / `Timeout` / `Unavailable` - Transport trouble (retryable)
    async fn initialize_or_resume(
        &self,
        config: &ValidatedConfig,
    ) -> Result<SessionHandle, ServiceError>;

    /// Ask once whether new suggestions are ready.
    ///
    /// A single poll with no waiting or retrying; an empty list is a
    /// normal outcome while the optimizer is still computing.
    ///
    /// # Returns
    /// * `Ok(Vec<Suggestion>)` - Zero or more fresh suggestions
    /// * `Err(ServiceError)` - The poll failed
    async fn poll_suggestions(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<Suggestion>, ServiceError>;

    /// Report measured objective values for previously issued suggestions.
    ///
    /// # Returns
    /// * `Ok(())` - The service accepted the whole batch
    /// * `Err(ServiceError)` - Nothing may be assumed accepted
    async fn submit_measurements(
        &self,
        session: &SessionHandle,
        measurements: &[MeasurementRecord],
    ) -> Result<(), ServiceError>;
}
