//! Shared fixtures and mock `SessionRepository` implementations used by unit tests.
#![cfg(test)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use gaintrack_client::{RepositoryError, SessionRecord, SessionRepository, SetRecord};

/// Midnight UTC on day `n` of January 2025, continuing into later months.
pub fn day(n: u32) -> DateTime<Utc> {
    let base = Utc
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid base date");
    base + Duration::days(i64::from(n) - 1)
}

pub fn session(name: &str, d: u32, sets: Vec<SetRecord>) -> SessionRecord {
    SessionRecord::new(name, day(d), sets)
}

/// `sets` identical working sets.
pub fn uniform_session(
    name: &str,
    d: u32,
    weight: f64,
    sets: usize,
    reps: u32,
    rpe: Option<f64>,
) -> SessionRecord {
    session(
        name,
        d,
        (0..sets)
            .map(|_| SetRecord::working(weight, reps, rpe))
            .collect(),
    )
}

/// In-memory repository whose contents can be swapped mid-test.
pub struct MockRepository {
    sessions: Mutex<Vec<SessionRecord>>,
    calls: AtomicUsize,
}

impl MockRepository {
    pub fn new(sessions: Vec<SessionRecord>) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(sessions),
            calls: AtomicUsize::new(0),
        })
    }

    pub async fn replace(&self, sessions: Vec<SessionRecord>) {
        *self.sessions.lock().await = sessions;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRepository for MockRepository {
    async fn list_sessions(
        &self,
        exercise_name: Option<&str>,
    ) -> Result<Vec<SessionRecord>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .iter()
            .filter(|s| exercise_name.is_none_or(|n| s.exercise_name == n.trim()))
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

/// Repository that always fails with a transport-level status error.
pub struct FailingRepository;

#[async_trait]
impl SessionRepository for FailingRepository {
    async fn list_sessions(
        &self,
        _exercise_name: Option<&str>,
    ) -> Result<Vec<SessionRecord>, RepositoryError> {
        Err(RepositoryError::from_status(503, "unavailable"))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
