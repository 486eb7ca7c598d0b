// src/session.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::errors::{Result, RunnerError};
use crate::harness::TestHarness;
use crate::models::{RunDelta, TestResult};
use crate::tracker::DiffTracker;

/// Proof that a run was started; completes exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct RunTicket {
    seq: u64,
}

impl RunTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Default)]
struct SessionState {
    tracker: DiffTracker,
    issued: u64,
    applied: u64,
    /// Tickets at or below this were issued before the last reset.
    floor: u64,
}

/// One exercise/editor session and its cumulative result log.
pub struct TestSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    harness: Arc<TestHarness>,
    state: Mutex<SessionState>,
}

impl TestSession {
    pub fn new(harness: Arc<TestHarness>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            harness,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub async fn begin(&self) -> RunTicket {
        let mut state = self.state.lock().await;
        state.issued += 1;
        RunTicket { seq: state.issued }
    }

    /// Appends the results of a finished run and returns what is new.
    ///
    /// A run that finishes after a newer run was applied, or that started
    /// before the last [`reset`](Self::reset), is rejected and leaves the log untouched.
    pub async fn complete(&self, ticket: RunTicket, fresh: Vec<TestResult>) -> Result<RunDelta> {
        let mut state = self.state.lock().await;
        if ticket.seq <= state.applied || ticket.seq <= state.floor {
            log::warn!("Session {}: discarding stale run #{}", self.id, ticket.seq);
            return Err(RunnerError::StaleRun { seq: ticket.seq });
        }

        let mut full = state.tracker.retained().to_vec();
        full.extend(fresh);
        let delta = state.tracker.observe(full);
        state.applied = ticket.seq;

        log::debug!(
            "Session {}: run #{} added {} results (log now {})",
            self.id,
            ticket.seq,
            delta.results.len(),
            state.tracker.len()
        );

        Ok(RunDelta {
            seq: ticket.seq,
            reset: delta.reset,
            results: delta.results,
            finished_at: Utc::now().to_rfc3339(),
        })
    }

    /// Runs the harness and applies its results.
    pub async fn run(&self, user_code: &str, test_code: &str) -> Result<RunDelta> {
        let ticket = self.begin().await;
        log::info!("Session {}: starting run #{}", self.id, ticket.seq);
        let fresh = self.harness.run(user_code, test_code).await?;
        self.complete(ticket, fresh).await
    }

    /// Empties the log, e.g. when the user switches exercises. Runs still in
    /// flight will be discarded when they finish.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.tracker.clear();
        state.floor = state.issued;
        log::info!("Session {}: reset", self.id);
    }

    /// Snapshot of every result recorded since creation or the last reset.
    pub async fn log(&self) -> Vec<TestResult> {
        self.state.lock().await.tracker.retained().to_vec()
    }
}

/// Live sessions keyed by id.
pub struct SessionRegistry {
    harness: Arc<TestHarness>,
    sessions: RwLock<HashMap<Uuid, Arc<TestSession>>>,
}

impl SessionRegistry {
    pub fn new(harness: Arc<TestHarness>) -> Self {
        Self {
            harness,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> Arc<TestSession> {
        let session = Arc::new(TestSession::new(self.harness.clone()));
        self.sessions.write().await.insert(session.id(), session.clone());
        log::info!("Created session {}", session.id());
        session
    }

    pub async fn get(&self, id: &str) -> Result<Arc<TestSession>> {
        let uuid = parse_id(id)?;
        self.sessions
            .read()
            .await
            .get(&uuid)
            .cloned()
            .ok_or_else(|| RunnerError::SessionNotFound(id.to_string()))
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        let uuid = parse_id(id)?;
        match self.sessions.write().await.remove(&uuid) {
            Some(_) => {
                log::info!("Removed session {}", uuid);
                Ok(())
            }
            None => Err(RunnerError::SessionNotFound(id.to_string())),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| RunnerError::SessionNotFound(id.to_string()))
}
