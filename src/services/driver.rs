//! Optimization session driver.
//!
//! [`OptimizationDriver`] runs one optimization campaign against a remote
//! service through the [`SessionClient`] port: it opens (or resumes) the
//! session, polls for suggestion batches with a bounded retry loop, assigns
//! local iteration numbering, and posts measurements back.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::domain::error::{CampaignError, DriverError};
use crate::domain::models::{OptimizationConfig, Recommendation};
use crate::domain::ports::{MeasurementRecord, ServiceError, SessionClient, SessionHandle, Suggestion};
use crate::domain::validate::{validate, ValidatedConfig};

/// Lifecycle state of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, session not yet opened.
    Unstarted,
    /// Session open, suggestions may be exchanged.
    Active,
    /// The configured budget of suggestion batches has been consumed.
    /// Measurements for already issued suggestions are still accepted.
    Exhausted,
    /// A permanent service error poisoned the session. Terminal.
    Failed,
}

impl DriverState {
    /// Stable lowercase label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Active => "active",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        }
    }

    /// True when no further suggestion batches will ever be issued.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}

/// Explicit state of one bounded polling loop.
///
/// Tracks attempts remaining and the delay owed before the next attempt,
/// so the loop's schedule can be tested without sleeping: the first
/// attempt is immediate, every later attempt waits the configured sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    total: u32,
    used: u32,
    sleep: Duration,
}

impl PollSchedule {
    /// A schedule allowing `max_retries` single-shot attempts separated by
    /// `sleep_time`.
    pub fn new(max_retries: u32, sleep_time: Duration) -> Self {
        Self {
            total: max_retries,
            used: 0,
            sleep: sleep_time,
        }
    }

    /// Consumes one attempt, returning the delay owed before it runs.
    /// `None` once all attempts are used.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.used >= self.total {
            return None;
        }
        let delay = if self.used == 0 { Duration::ZERO } else { self.sleep };
        self.used += 1;
        Some(delay)
    }

    /// Attempts consumed so far.
    pub fn attempts_used(&self) -> u32 {
        self.used
    }

    /// Attempts still available.
    pub fn attempts_remaining(&self) -> u32 {
        self.total - self.used
    }
}

/// Drives one optimization session from initialization to budget
/// exhaustion.
///
/// Not a concurrent type: all operations take `&mut self`, and exactly one
/// in-flight poll or submission is assumed per session. Iteration and
/// batch numbering depend on the caller sequencing calls strictly; there
/// is deliberately no internal locking. Per-call network timeouts are the
/// session client's responsibility and are independent of the polling
/// loop's inter-attempt sleep.
pub struct OptimizationDriver {
    /// Session protocol implementation (injected dependency).
    client: Arc<dyn SessionClient>,
    /// The immutable campaign configuration.
    config: ValidatedConfig,
    state: DriverState,
    session: Option<SessionHandle>,
    /// Index the next issued batch will carry.
    counter: u32,
    /// Suggestion ids issued but not yet settled by a submission.
    issued: HashSet<String>,
}

impl std::fmt::Debug for OptimizationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizationDriver")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("session", &self.session)
            .field("counter", &self.counter)
            .field("issued", &self.issued)
            .finish_non_exhaustive()
    }
}

impl OptimizationDriver {
    /// Creates a driver for one campaign.
    ///
    /// The driver owns this configuration and exactly one session handle
    /// for its whole lifetime.
    pub fn new(client: Arc<dyn SessionClient>, config: ValidatedConfig) -> Self {
        Self {
            client,
            config,
            state: DriverState::Unstarted,
            session: None,
            counter: 0,
            issued: HashSet::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The campaign configuration this driver runs.
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// The session handle, once `initialize` has succeeded.
    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    /// Index the next suggestion batch will carry.
    pub fn iteration(&self) -> u32 {
        self.counter
    }

    /// Number of issued suggestions still awaiting measurements.
    pub fn pending_suggestions(&self) -> usize {
        self.issued.len()
    }

    /// Opens or resumes the remote session.
    ///
    /// When the client resumes a live session and the configuration
    /// inherits prior data, the session's reported progress is adopted as
    /// the starting iteration; a resumed session that already consumed
    /// the budget lands directly in `Exhausted`. Calling this again after
    /// success is a local no-op returning the same handle.
    ///
    /// # Errors
    /// - `DriverError::SessionFailed` - the driver was poisoned earlier
    /// - `DriverError::Service` - the client could not obtain a session;
    ///   transient errors leave the driver `Unstarted` so the call may be
    ///   retried, permanent errors poison it
    #[instrument(skip(self), fields(campaign = %self.config.name, group = %self.config.group), err)]
    pub async fn initialize(&mut self) -> Result<&SessionHandle, DriverError> {
        match self.state {
            DriverState::Unstarted => {}
            DriverState::Failed => return Err(DriverError::SessionFailed),
            DriverState::Active | DriverState::Exhausted => {
                return self.session.as_ref().ok_or(DriverError::NotInitialized);
            }
        }

        let handle = self
            .client
            .initialize_or_resume(&self.config)
            .await
            .map_err(|e| self.note_service_error(e))?;

        // Prior progress counts against the budget only when the session
        // was picked up again and the campaign inherits its data.
        self.counter = if handle.resumed && self.config.inherit_data {
            handle.iteration
        } else {
            0
        };
        self.state = if self.counter >= self.config.budget {
            info!(
                session_id = %handle.id,
                iteration = self.counter,
                "resumed session has already consumed its budget"
            );
            DriverState::Exhausted
        } else {
            DriverState::Active
        };

        info!(
            session_id = %handle.id,
            resumed = handle.resumed,
            iteration = self.counter,
            budget = self.config.budget,
            "session ready"
        );
        self.session = Some(handle);
        self.session.as_ref().ok_or(DriverError::NotInitialized)
    }

    /// Polls for the next suggestion batch.
    ///
    /// Performs up to `max_retries` single-shot polls, the first
    /// immediately and each later one after `sleep_time`, stopping at the
    /// first non-empty batch. Exhausting all attempts without suggestions
    /// returns an empty sequence: that is the expected way the service
    /// says "try again later", not an error.
    ///
    /// A non-empty batch is wrapped into [`Recommendation`]s carrying the
    /// driver's own gapless iteration and batch numbering, the iteration
    /// counter advances by one, and the driver moves to `Exhausted` once
    /// the configured budget is consumed. In `Exhausted` state this
    /// returns empty immediately without touching the network.
    ///
    /// # Errors
    /// - `DriverError::NotInitialized` - `initialize` has not succeeded
    /// - `DriverError::SessionFailed` - the driver was poisoned earlier
    /// - `DriverError::Service` - the final attempt failed transiently, or
    ///   any attempt failed permanently (poisoning the driver)
    /// - `DriverError::SuggestionKeyMismatch` - the service issued a batch
    ///   not matching the configured parameters (poisons the driver)
    #[instrument(skip(self), fields(iteration = self.counter), err)]
    pub async fn get_new_suggestions(
        &mut self,
        max_retries: u32,
        sleep_time: Duration,
    ) -> Result<Vec<Recommendation>, DriverError> {
        let session = match self.state {
            DriverState::Unstarted => return Err(DriverError::NotInitialized),
            DriverState::Failed => return Err(DriverError::SessionFailed),
            DriverState::Exhausted => {
                debug!("budget consumed, returning empty without polling");
                return Ok(Vec::new());
            }
            DriverState::Active => match self.session.clone() {
                Some(session) => session,
                None => return Err(DriverError::NotInitialized),
            },
        };

        let client = Arc::clone(&self.client);
        let mut schedule = PollSchedule::new(max_retries, sleep_time);
        let mut last_error: Option<ServiceError> = None;

        while let Some(delay) = schedule.next_delay() {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match client.poll_suggestions(&session).await {
                Ok(batch) if batch.is_empty() => {
                    last_error = None;
                    debug!(
                        attempt = schedule.attempts_used(),
                        remaining = schedule.attempts_remaining(),
                        "no suggestions ready yet"
                    );
                }
                Ok(batch) => return self.issue_batch(batch),
                Err(e) if e.is_transient() => {
                    warn!(
                        attempt = schedule.attempts_used(),
                        remaining = schedule.attempts_remaining(),
                        error = %e,
                        "transient poll failure"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    self.state = DriverState::Failed;
                    return Err(DriverError::Service(e));
                }
            }
        }

        // All attempts used. Surface a transient error only if the last
        // attempt itself failed; an empty final poll means "try later".
        match last_error {
            Some(e) => Err(DriverError::Service(e)),
            None => {
                info!(attempts = schedule.attempts_used(), "polling exhausted without suggestions");
                Ok(Vec::new())
            }
        }
    }

    /// Validates and submits measured recommendations.
    ///
    /// Every recommendation must carry a measurement for exactly the
    /// configured objective names, all values finite, and must refer to a
    /// suggestion this driver issued and has not yet settled. Any
    /// violation rejects the whole call before the network is touched.
    /// Accepted submissions settle their suggestion ids. Allowed in the
    /// `Exhausted` state so the final batch can still report.
    ///
    /// The driver never retries a submission itself; a transient service
    /// failure is surfaced and the batch stays unsettled, so the caller
    /// may simply call again.
    ///
    /// # Errors
    /// - `DriverError::NotInitialized` / `SessionFailed` - lifecycle misuse
    /// - `DriverError::MeasurementMismatch` - wrong or non-finite
    ///   measurement keys on a recommendation
    /// - `DriverError::UnknownSuggestion` - not issued here, or already
    ///   settled
    /// - `DriverError::Service` - the submission itself failed
    #[instrument(skip(self, recommendations), fields(batch = recommendations.len()), err)]
    pub async fn send_measurements(
        &mut self,
        recommendations: &[Recommendation],
    ) -> Result<(), DriverError> {
        let session = match self.state {
            DriverState::Unstarted => return Err(DriverError::NotInitialized),
            DriverState::Failed => return Err(DriverError::SessionFailed),
            DriverState::Active | DriverState::Exhausted => match self.session.clone() {
                Some(session) => session,
                None => return Err(DriverError::NotInitialized),
            },
        };

        if recommendations.is_empty() {
            debug!("empty measurement batch, nothing to submit");
            return Ok(());
        }

        // Validate the whole batch before anything leaves the process.
        let mut seen_in_batch: HashSet<&str> = HashSet::new();
        for rec in recommendations {
            if !self.issued.contains(&rec.suggestion_id)
                || !seen_in_batch.insert(rec.suggestion_id.as_str())
            {
                return Err(DriverError::UnknownSuggestion {
                    suggestion_id: rec.suggestion_id.clone(),
                });
            }
            self.check_measurements(rec)?;
        }

        let records: Vec<MeasurementRecord> = recommendations
            .iter()
            .map(|rec| MeasurementRecord {
                suggestion_id: rec.suggestion_id.clone(),
                values: rec.measurements.clone(),
            })
            .collect();

        self.client
            .submit_measurements(&session, &records)
            .await
            .map_err(|e| self.note_service_error(e))?;

        for rec in recommendations {
            self.issued.remove(&rec.suggestion_id);
        }
        info!(
            submitted = records.len(),
            pending = self.issued.len(),
            "measurements accepted"
        );
        Ok(())
    }

    /// Wraps a raw batch into recommendations and advances the counter.
    fn issue_batch(&mut self, batch: Vec<Suggestion>) -> Result<Vec<Recommendation>, DriverError> {
        let iteration = self.counter;
        let expected: HashSet<&str> = self.config.parameter_names().collect();

        let batch_size = self.config.batch_size as usize;
        if batch.len() > batch_size {
            debug!(
                received = batch.len(),
                configured = batch_size,
                "service sent more suggestions than the configured batch size"
            );
        }

        let mut recommendations = Vec::with_capacity(batch.len());
        for (position, suggestion) in batch.into_iter().enumerate() {
            let keys: HashSet<&str> = suggestion.values.keys().map(String::as_str).collect();
            if keys != expected {
                let missing = expected.difference(&keys).map(ToString::to_string).collect();
                let extra = keys.difference(&expected).map(ToString::to_string).collect();
                self.state = DriverState::Failed;
                return Err(DriverError::SuggestionKeyMismatch {
                    suggestion_id: suggestion.id,
                    missing,
                    extra,
                });
            }
            recommendations.push(Recommendation::issued(
                suggestion.id,
                iteration,
                position as u32,
                suggestion.values,
            ));
        }

        for rec in &recommendations {
            self.issued.insert(rec.suggestion_id.clone());
        }

        self.counter += 1;
        if self.counter >= self.config.budget {
            info!(iteration, budget = self.config.budget, "budget consumed");
            self.state = DriverState::Exhausted;
        }
        info!(
            iteration,
            count = recommendations.len(),
            "issued suggestion batch"
        );
        Ok(recommendations)
    }

    /// Checks one recommendation's measurements against the configured
    /// objectives.
    fn check_measurements(&self, rec: &Recommendation) -> Result<(), DriverError> {
        let expected: HashSet<&str> = self.config.objective_names().collect();
        let keys: HashSet<&str> = rec.measurements.keys().map(String::as_str).collect();

        let mut missing: Vec<String> =
            expected.difference(&keys).map(ToString::to_string).collect();
        let mut extra: Vec<String> = keys.difference(&expected).map(ToString::to_string).collect();
        let mut non_finite: Vec<String> = rec
            .measurements
            .iter()
            .filter(|(_, v)| !v.is_finite())
            .map(|(k, _)| k.clone())
            .collect();

        if missing.is_empty() && extra.is_empty() && non_finite.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        extra.sort_unstable();
        non_finite.sort_unstable();
        Err(DriverError::MeasurementMismatch {
            suggestion_id: rec.suggestion_id.clone(),
            missing,
            extra,
            non_finite,
        })
    }

    /// Converts a service error, poisoning the driver on permanent ones.
    fn note_service_error(&mut self, error: ServiceError) -> DriverError {
        if !error.is_transient() {
            warn!(error = %error, "permanent service error, session failed");
            self.state = DriverState::Failed;
        }
        DriverError::Service(error)
    }
}

/// Validates a raw configuration and opens its session in one call.
///
/// Convenience for callers that do not need to inspect the validated
/// configuration before going online. The returned driver is `Active`
/// (or already `Exhausted` when a resumed session consumed its budget).
///
/// # Errors
/// - `CampaignError::Invalid` - the configuration broke validation rules
/// - `CampaignError::Driver` - the session could not be opened
pub async fn initialize_optimization(
    config: OptimizationConfig,
    client: Arc<dyn SessionClient>,
) -> Result<OptimizationDriver, CampaignError> {
    let validated = validate(config)?;
    let mut driver = OptimizationDriver::new(client, validated);
    driver.initialize().await?;
    Ok(driver)
}
