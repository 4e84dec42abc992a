//! Session repository boundary for GainTrack workout history.
//!
//! Workouts arrive from either the on-device JSON store or the REST API in a
//! loosely typed shape. They are validated once, here, into strict
//! [`SessionRecord`]s: one record per exercise appearance in a workout.
//! Consumers depend only on the [`SessionRepository`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod local_store;
pub mod retry;
pub mod utils;
pub mod validation;

use config::{Backend, Config};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Auth(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl RepositoryError {
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// One logged set. Warmup sets never count toward performance aggregates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SetRecord {
    pub weight: f64,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub is_warmup: bool,
}

impl SetRecord {
    pub fn working(weight: f64, reps: u32, rpe: Option<f64>) -> Self {
        Self {
            weight,
            reps,
            rpe,
            is_warmup: false,
        }
    }

    pub fn warmup(weight: f64, reps: u32) -> Self {
        Self {
            weight,
            reps,
            rpe: None,
            is_warmup: true,
        }
    }
}

/// A single exercise appearance within a completed workout.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SessionRecord {
    pub exercise_name: String,
    pub date: DateTime<Utc>,
    pub sets: Vec<SetRecord>,
    /// Identifier of the workout this appearance belongs to, when the store has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
}

impl SessionRecord {
    pub fn new(exercise_name: impl Into<String>, date: DateTime<Utc>, sets: Vec<SetRecord>) -> Self {
        Self {
            exercise_name: exercise_name.into(),
            date,
            sets,
            workout_id: None,
        }
    }

    pub fn with_workout_id(mut self, workout_id: impl Into<String>) -> Self {
        self.workout_id = Some(workout_id.into());
        self
    }

    pub fn working_sets(&self) -> impl Iterator<Item = &SetRecord> {
        self.sets.iter().filter(|s| !s.is_warmup)
    }

    /// A session qualifies for progression math when it has at least one working set.
    pub fn is_qualifying(&self) -> bool {
        self.working_sets().next().is_some()
    }

    pub fn sets_completed(&self) -> usize {
        self.working_sets().count()
    }

    pub fn total_reps(&self) -> u32 {
        self.working_sets().map(|s| s.reps).sum()
    }

    pub fn max_weight(&self) -> Option<f64> {
        self.working_sets().map(|s| s.weight).reduce(f64::max)
    }

    pub fn total_volume(&self) -> f64 {
        self.working_sets().map(|s| s.weight * f64::from(s.reps)).sum()
    }

    /// Mean RPE over working sets that recorded one.
    pub fn avg_rpe(&self) -> Option<f64> {
        let rpes: Vec<f64> = self.working_sets().filter_map(|s| s.rpe).collect();
        if rpes.is_empty() {
            return None;
        }
        Some(rpes.iter().sum::<f64>() / rpes.len() as f64)
    }
}

/// Read-only source of historical sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// List sessions, optionally restricted to one exercise. Order is not
    /// guaranteed; callers sort by `date`.
    async fn list_sessions(
        &self,
        exercise_name: Option<&str>,
    ) -> Result<Vec<SessionRecord>, RepositoryError>;

    /// Short backend label used in logs and metrics.
    fn backend_name(&self) -> &'static str;
}

/// Build the repository selected by `config`.
pub fn repository_from_config(config: &Config) -> Arc<dyn SessionRepository> {
    match &config.backend {
        Backend::Local { data_path } => Arc::new(
            local_store::LocalSessionRepository::new(data_path.clone())
                .with_history_limit(config.history_limit),
        ),
        Backend::Remote {
            base_url,
            api_token,
        } => Arc::new(
            http_client::ReqwestSessionRepository::new(base_url, api_token.clone())
                .with_history_limit(config.history_limit)
                .with_retry_policy(retry::RetryPolicy::with_max_retries(config.max_retries)),
        ),
    }
}
