//! HTTP backend for the GainTrack REST API.
//!
//! This module provides a reqwest-based implementation of the
//! [`SessionRepository`](crate::SessionRepository) trait.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::retry::RetryPolicy;
use crate::validation::{WorkoutPayload, sessions_from_workouts, workouts_from_values};
use crate::{RepositoryError, SessionRecord, SessionRepository};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Session repository backed by `GET {base_url}/api/workouts`.
#[derive(Clone, Debug)]
pub struct ReqwestSessionRepository {
    base_url: String,
    api_token: SecretString,
    client: reqwest::Client,
    history_limit: u32,
    retry: RetryPolicy,
}

impl ReqwestSessionRepository {
    /// Create a new repository.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "https://api.gaintrack.app"
    /// * `api_token` - Session token sent as a bearer credential
    pub fn new(base_url: &str, api_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
            history_limit: crate::config::DEFAULT_HISTORY_LIMIT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.api_token.expose_secret())
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> RepositoryError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => RepositoryError::NotFound(body_snippet),
            401 | 403 => RepositoryError::Auth(body_snippet),
            _ => RepositoryError::from_status(status, body_snippet),
        }
    }

    async fn fetch_workouts_once(&self, url: &str) -> Result<Vec<WorkoutPayload>, RepositoryError> {
        let limit = self.history_limit.to_string();
        let resp = self
            .get_request(url)
            .query(&[("limit", limit.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        // Read body as text first so a shape mismatch can be logged with context.
        let text = resp.text().await?;
        let entries = serde_json::from_str::<Vec<serde_json::Value>>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(512).collect();
            tracing::warn!(error = %e, body = %body_snippet, "undecodable workouts payload");
            RepositoryError::Decode(e)
        })?;
        Ok(workouts_from_values(entries))
    }

    /// Fetch raw workouts, retrying transient failures.
    pub async fn fetch_workouts(&self) -> Result<Vec<WorkoutPayload>, RepositoryError> {
        let url = format!("{}/api/workouts", self.base_url);
        let url = url.as_str();
        let this = self;
        self.retry
            .retry_async(
                move || async move { this.fetch_workouts_once(url).await },
                RepositoryError::is_transient,
            )
            .await
    }
}

#[async_trait]
impl SessionRepository for ReqwestSessionRepository {
    async fn list_sessions(
        &self,
        exercise_name: Option<&str>,
    ) -> Result<Vec<SessionRecord>, RepositoryError> {
        let workouts = self.fetch_workouts().await?;
        let workout_count = workouts.len();
        let sessions =
            sessions_from_workouts(workouts, exercise_name, Some(self.history_limit as usize));
        tracing::debug!(
            workouts = workout_count,
            sessions = sessions.len(),
            "loaded remote sessions"
        );
        metrics::histogram!("gaintrack_repository_sessions_loaded", "backend" => "remote")
            .record(sessions.len() as f64);
        Ok(sessions)
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
