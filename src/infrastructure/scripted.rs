//! Scripted in-memory session client.
//!
//! Replays a pre-arranged sequence of poll outcomes instead of talking
//! to a real optimization service. Used by the driver test suite and
//! handy for rehearsing a campaign loop offline.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::ports::{
    MeasurementRecord, ServiceError, SessionClient, SessionHandle, Suggestion,
};
use crate::domain::validate::ValidatedConfig;

/// One scripted answer to a suggestion poll.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The optimizer had nothing ready yet.
    Empty,
    /// A batch of fresh suggestions.
    Batch(Vec<Suggestion>),
    /// The poll failed with the given error.
    Fail(ServiceError),
}

/// In-memory [`SessionClient`] driven by a script.
///
/// Each poll consumes the next [`PollOutcome`] from the script; once the
/// script runs dry, every further poll answers with an empty batch.
/// Submitted measurement batches are recorded for later inspection, and
/// every call is counted so tests can assert that an operation did or
/// did not reach the adapter.
#[derive(Debug)]
pub struct ScriptedSessionClient {
    session_id: String,
    resume_from: Option<u32>,
    init_failures: Mutex<VecDeque<ServiceError>>,
    poll_script: Mutex<VecDeque<PollOutcome>>,
    submit_failures: Mutex<VecDeque<ServiceError>>,
    submitted: Mutex<Vec<Vec<MeasurementRecord>>>,
    initialize_calls: AtomicU32,
    poll_calls: AtomicU32,
    submit_calls: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedSessionClient {
    /// Creates a client that opens a fresh session on first contact.
    pub fn new() -> Self {
        Self {
            session_id: format!("scripted-{}", Uuid::new_v4()),
            resume_from: None,
            init_failures: Mutex::new(VecDeque::new()),
            poll_script: Mutex::new(VecDeque::new()),
            submit_failures: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            initialize_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
        }
    }

    /// Creates a client that reports an existing live session already at
    /// the given iteration count. A configuration that demands a restart
    /// still gets a fresh session.
    pub fn resuming(iteration: u32) -> Self {
        Self {
            resume_from: Some(iteration),
            ..Self::new()
        }
    }

    /// Queues an error for the next `initialize_or_resume` call.
    pub fn fail_next_initialize(&self, error: ServiceError) {
        lock(&self.init_failures).push_back(error);
    }

    /// Appends one outcome to the poll script.
    pub fn script_poll(&self, outcome: PollOutcome) {
        lock(&self.poll_script).push_back(outcome);
    }

    /// Appends a sequence of outcomes to the poll script.
    pub fn script_polls(&self, outcomes: impl IntoIterator<Item = PollOutcome>) {
        lock(&self.poll_script).extend(outcomes);
    }

    /// Queues an error for the next `submit_measurements` call.
    pub fn fail_next_submit(&self, error: ServiceError) {
        lock(&self.submit_failures).push_back(error);
    }

    /// Number of `initialize_or_resume` calls observed so far.
    pub fn initialize_calls(&self) -> u32 {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// Number of `poll_suggestions` calls observed so far.
    pub fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }

    /// Number of `submit_measurements` calls observed so far.
    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Every measurement batch accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<Vec<MeasurementRecord>> {
        lock(&self.submitted).clone()
    }
}

impl Default for ScriptedSessionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionClient for ScriptedSessionClient {
    async fn initialize_or_resume(
        &self,
        config: &ValidatedConfig,
    ) -> Result<SessionHandle, ServiceError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.init_failures).pop_front() {
            return Err(error);
        }
        let resume = match self.resume_from {
            Some(iteration) if !config.always_restart => Some(iteration),
            _ => None,
        };
        Ok(SessionHandle {
            id: self.session_id.clone(),
            name: config.name.clone(),
            group: config.group.clone(),
            iteration: resume.unwrap_or(0),
            resumed: resume.is_some(),
            opened_at: Utc::now(),
        })
    }

    async fn poll_suggestions(
        &self,
        _session: &SessionHandle,
    ) -> Result<Vec<Suggestion>, ServiceError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.poll_script).pop_front() {
            None | Some(PollOutcome::Empty) => Ok(Vec::new()),
            Some(PollOutcome::Batch(batch)) => Ok(batch),
            Some(PollOutcome::Fail(error)) => Err(error),
        }
    }

    async fn submit_measurements(
        &self,
        _session: &SessionHandle,
        measurements: &[MeasurementRecord],
    ) -> Result<(), ServiceError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.submit_failures).pop_front() {
            return Err(error);
        }
        lock(&self.submitted).push(measurements.to_vec());
        Ok(())
    }
}
