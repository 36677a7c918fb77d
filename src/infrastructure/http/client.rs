//! HTTP implementation of the session protocol.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::types::{ApiErrorBody, MeasurementsRequest, SessionDto, SuggestionsResponse};
use crate::domain::ports::{
    MeasurementRecord, ServiceError, SessionClient, SessionHandle, Suggestion,
};
use crate::domain::validate::ValidatedConfig;

/// Configuration for the HTTP session client.
#[derive(Debug, Clone)]
pub struct HttpSessionClientConfig {
    /// Service root URL; a trailing slash is tolerated.
    pub base_url: String,

    /// API key sent as `x-api-key` when present.
    pub api_key: Option<String>,

    /// Per-request timeout in seconds. Bounds each network call on its
    /// own; the driver's polling sleep is a separate concern.
    pub timeout_secs: u64,

    /// User agent announced to the service.
    pub user_agent: String,
}

impl Default for HttpSessionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            timeout_secs: 30,
            user_agent: concat!("optloop/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// [`SessionClient`] speaking the optimization service's REST surface.
///
/// Each request carries a fresh `x-request-id` for server-side
/// correlation. Connection pooling comes with the underlying
/// `reqwest::Client`.
pub struct HttpSessionClient {
    http_client: ReqwestClient,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSessionClient {
    /// Creates a client against `base_url` with default configuration.
    ///
    /// # Returns
    /// * `Ok(HttpSessionClient)` - Ready to serve the port
    /// * `Err(anyhow::Error)` - The HTTP client could not be built
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpSessionClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Creates a client from explicit configuration.
    pub fn with_config(config: HttpSessionClientConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Attaches correlation and authentication headers.
    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("x-request-id", Uuid::new_v4().to_string());
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    /// Sends a request and maps transport and status failures.
    async fn execute(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<Response, ServiceError> {
        let response = self
            .decorate(builder)
            .send()
            .await
            .map_err(|e| transport_error(&e, what))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::from_status(
            status.as_u16(),
            error_message(&body, what),
        ))
    }

    async fn list_sessions(&self, name: &str, group: &str) -> Result<Vec<SessionDto>, ServiceError> {
        let response = self
            .execute(
                self.http_client
                    .get(format!("{}/sessions", self.base_url))
                    .query(&[("name", name), ("group", group)]),
                "list sessions",
            )
            .await?;
        decode(response, "session list").await
    }

    async fn stop_session(&self, id: &str) -> Result<(), ServiceError> {
        self.execute(
            self.http_client
                .post(format!("{}/sessions/{id}/stop", self.base_url)),
            "stop session",
        )
        .await?;
        Ok(())
    }

    async fn create_session(&self, config: &ValidatedConfig) -> Result<SessionDto, ServiceError> {
        let response = self
            .execute(
                self.http_client
                    .post(format!("{}/sessions", self.base_url))
                    .json(config.as_config()),
                "create session",
            )
            .await?;
        decode(response, "created session").await
    }

    fn handle_from(dto: SessionDto, config: &ValidatedConfig, resumed: bool) -> SessionHandle {
        SessionHandle {
            id: dto.id,
            name: dto.name,
            group: config.group.clone(),
            iteration: if resumed { dto.completed_iterations } else { 0 },
            resumed,
            opened_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SessionClient for HttpSessionClient {
    #[instrument(skip(self, config), fields(campaign = %config.name, group = %config.group), err)]
    async fn initialize_or_resume(
        &self,
        config: &ValidatedConfig,
    ) -> Result<SessionHandle, ServiceError> {
        let sessions = self.list_sessions(&config.name, &config.group).await?;
        let mut live: Vec<SessionDto> = sessions
            .into_iter()
            .filter(|s| s.state.is_live())
            .collect();

        // A demanded restart stops every running same-name session before
        // a fresh one is created. Data inheritance rides along in the
        // posted document either way.
        if config.always_restart {
            for session in &live {
                debug!(session_id = %session.id, "stopping running session before restart");
                self.stop_session(&session.id).await?;
            }
            live.clear();
        }

        if let Some(dto) = live.into_iter().next() {
            debug!(
                session_id = %dto.id,
                iteration = dto.completed_iterations,
                "resuming live session"
            );
            return Ok(Self::handle_from(dto, config, true));
        }

        let created = self.create_session(config).await?;
        debug!(session_id = %created.id, "created session");
        Ok(Self::handle_from(created, config, false))
    }

    #[instrument(skip(self, session), fields(session_id = %session.id), err)]
    async fn poll_suggestions(
        &self,
        session: &SessionHandle,
    ) -> Result<Vec<Suggestion>, ServiceError> {
        let response = self
            .execute(
                self.http_client.get(format!(
                    "{}/sessions/{}/suggestions",
                    self.base_url, session.id
                )),
                "poll suggestions",
            )
            .await?;
        let body: SuggestionsResponse = decode(response, "suggestion batch").await?;
        Ok(body.suggestions.into_iter().map(Suggestion::from).collect())
    }

    #[instrument(
        skip(self, session, measurements),
        fields(session_id = %session.id, batch = measurements.len()),
        err
    )]
    async fn submit_measurements(
        &self,
        session: &SessionHandle,
        measurements: &[MeasurementRecord],
    ) -> Result<(), ServiceError> {
        let request = MeasurementsRequest::from(measurements);
        self.execute(
            self.http_client
                .post(format!(
                    "{}/sessions/{}/measurements",
                    self.base_url, session.id
                ))
                .json(&request),
            "submit measurements",
        )
        .await?;
        Ok(())
    }
}

/// Deserializes a success body, mapping decode failures to `Protocol`.
async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ServiceError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::Protocol(format!("{what}: {e}")))
}

/// Classifies a transport-level failure.
fn transport_error(error: &reqwest::Error, what: &str) -> ServiceError {
    if error.is_timeout() {
        ServiceError::Timeout(format!("{what}: {error}"))
    } else if error.is_decode() {
        ServiceError::Protocol(format!("{what}: {error}"))
    } else {
        ServiceError::Connection(format!("{what}: {error}"))
    }
}

/// Pulls the most useful message out of an error body.
fn error_message(body: &str, what: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = parsed.detail.or(parsed.message) {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        what.to_string()
    } else {
        trimmed.to_string()
    }
}
