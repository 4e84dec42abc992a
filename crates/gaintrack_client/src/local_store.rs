//! On-device storage backend.
//!
//! Reads a JSON export of the app's local key-value store. Two layouts are
//! accepted: a bare array of workouts, or an object holding that array under
//! the `gaintrack_workouts` storage key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::Error as _;
use serde_json::Value;

use crate::validation::{WorkoutPayload, sessions_from_workouts, workouts_from_values};
use crate::{RepositoryError, SessionRecord, SessionRepository};

const WORKOUTS_KEY: &str = "gaintrack_workouts";

/// Pull the workout entries out of either accepted layout.
fn stored_workouts(document: Value) -> Result<Vec<Value>, serde_json::Error> {
    match document {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => match map.remove(WORKOUTS_KEY) {
            Some(Value::Array(entries)) => Ok(entries),
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(_) => Err(serde_json::Error::custom(format!(
                "`{WORKOUTS_KEY}` is not an array"
            ))),
        },
        _ => Err(serde_json::Error::custom(
            "expected an array of workouts or an object keyed by storage name",
        )),
    }
}

#[derive(Clone, Debug)]
pub struct LocalSessionRepository {
    data_path: PathBuf,
    history_limit: Option<usize>,
}

impl LocalSessionRepository {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            history_limit: None,
        }
    }

    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = Some(limit as usize);
        self
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Load raw workouts. A missing file is an empty history, not an error.
    async fn load_workouts(&self) -> Result<Vec<WorkoutPayload>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.data_path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.data_path.display(), "no local workout store yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RepositoryError::Io(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let document: Value = serde_json::from_slice(&bytes)?;
        Ok(workouts_from_values(stored_workouts(document)?))
    }
}

#[async_trait]
impl SessionRepository for LocalSessionRepository {
    async fn list_sessions(
        &self,
        exercise_name: Option<&str>,
    ) -> Result<Vec<SessionRecord>, RepositoryError> {
        let workouts = self.load_workouts().await?;
        let workout_count = workouts.len();
        let sessions = sessions_from_workouts(workouts, exercise_name, self.history_limit);
        tracing::debug!(
            path = %self.data_path.display(),
            workouts = workout_count,
            sessions = sessions.len(),
            "loaded local sessions"
        );
        metrics::histogram!("gaintrack_repository_sessions_loaded", "backend" => "local")
            .record(sessions.len() as f64);
        Ok(sessions)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
