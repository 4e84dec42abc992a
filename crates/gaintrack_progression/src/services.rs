use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use gaintrack_client::{SessionRecord, SessionRepository};

use crate::domains::{aggregator, history, trend, warmup};
use crate::error::{ProgressionError, ProgressionResult};
use crate::policy::ProgressionPolicy;
use crate::types::{ExerciseProgression, SuggestionsReport, TrendResult, WarmupPlan};

/// Identity of an exercise's history as seen by the trend cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HistoryKey {
    latest: Option<DateTime<Utc>>,
    sessions: usize,
}

impl HistoryKey {
    fn of(history: &[&SessionRecord]) -> Self {
        Self {
            latest: history.iter().map(|s| s.date).max(),
            sessions: history.len(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedTrend {
    key: HistoryKey,
    result: TrendResult,
}

/// Fetches history through a [`SessionRepository`] and runs the engine over it.
///
/// Trend classifications are memoized per exercise and reused while the
/// exercise's latest session date and session count are unchanged. An edit
/// that keeps both (new weights or RPE on an existing workout) is not seen
/// until the exercise gains or loses a session. Exercises that leave the
/// history are evicted on the next [`suggestions`](Self::suggestions) call.
#[derive(Clone)]
pub struct ProgressionService {
    repository: Arc<dyn SessionRepository>,
    policy: Arc<ProgressionPolicy>,
    trend_cache: Arc<Mutex<HashMap<String, CachedTrend>>>,
}

impl ProgressionService {
    pub fn new(repository: Arc<dyn SessionRepository>, policy: ProgressionPolicy) -> Self {
        Self {
            repository,
            policy: Arc::new(policy),
            trend_cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn policy(&self) -> &ProgressionPolicy {
        &self.policy
    }

    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    /// Ranked suggestions across every exercise in the repository.
    pub async fn suggestions(&self) -> ProgressionResult<SuggestionsReport> {
        metrics::counter!("gaintrack_suggestion_requests_total").increment(1);
        let sessions = self.repository.list_sessions(None).await.map_err(|e| {
            tracing::warn!(backend = self.backend_name(), error = %e, "failed to load sessions");
            ProgressionError::from(e)
        })?;

        let policy = self.policy.as_ref();
        let mut cache = self.trend_cache.lock().await;
        let mut hits = 0usize;
        let report = aggregator::aggregate_suggestions_with(&sessions, policy, |name, history| {
            let key = HistoryKey::of(history);
            if let Some(cached) = cache.get(name)
                && cached.key == key
            {
                hits += 1;
                return cached.result.clone();
            }
            let result = trend::analyze_trend_refs(history, policy);
            cache.insert(
                name.to_string(),
                CachedTrend {
                    key,
                    result: result.clone(),
                },
            );
            result
        });
        let present: HashSet<&str> = sessions.iter().map(|s| s.exercise_name.as_str()).collect();
        cache.retain(|name, _| present.contains(name.as_str()));
        drop(cache);

        for suggestion in &report.suggestions {
            metrics::counter!(
                "gaintrack_suggestions_emitted_total",
                "confidence" => suggestion.confidence.as_str()
            )
            .increment(1);
        }
        tracing::debug!(
            sessions = sessions.len(),
            exercises = report.total_exercises_analyzed,
            suggestions = report.suggestions.len(),
            cached_trends = hits,
            "computed progression suggestions"
        );
        Ok(report)
    }

    pub async fn exercise_progression(
        &self,
        exercise_name: &str,
    ) -> ProgressionResult<ExerciseProgression> {
        let name = exercise_name.trim();
        if name.is_empty() {
            return Err(ProgressionError::Validation(
                "exercise_name must not be empty".into(),
            ));
        }
        let sessions = self.repository.list_sessions(Some(name)).await?;
        let report = history::exercise_progression(name, &sessions, &self.policy);
        tracing::debug!(
            exercise = name,
            sessions = report.total_sessions,
            trend = report.trend.as_str(),
            "computed exercise progression"
        );
        Ok(report)
    }

    pub fn warmup_plan(
        &self,
        working_weight: f64,
        exercise_name: Option<String>,
    ) -> ProgressionResult<WarmupPlan> {
        if !working_weight.is_finite() {
            return Err(ProgressionError::Validation(
                "working_weight must be a finite number".into(),
            ));
        }
        Ok(warmup::warmup_plan(working_weight, exercise_name))
    }

    /// Number of exercises with a memoized trend.
    pub async fn cached_trends(&self) -> usize {
        self.trend_cache.lock().await.len()
    }
}
