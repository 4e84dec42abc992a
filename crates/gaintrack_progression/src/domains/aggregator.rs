//! Cross-exercise suggestion report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gaintrack_client::SessionRecord;

use crate::domains::suggestion::calculate_suggestion_refs;
use crate::domains::trend::analyze_trend_refs;
use crate::policy::ProgressionPolicy;
use crate::types::{ProgressionSuggestion, SuggestionsReport, Trend, TrendResult};

/// Group sessions by exact exercise name; each group is oldest first.
pub fn group_by_exercise(sessions: &[SessionRecord]) -> BTreeMap<&str, Vec<&SessionRecord>> {
    let mut groups: BTreeMap<&str, Vec<&SessionRecord>> = BTreeMap::new();
    for session in sessions {
        groups
            .entry(session.exercise_name.as_str())
            .or_default()
            .push(session);
    }
    for history in groups.values_mut() {
        history.sort_by_key(|s| s.date);
    }
    groups
}

pub fn aggregate_suggestions(
    sessions: &[SessionRecord],
    policy: &ProgressionPolicy,
) -> SuggestionsReport {
    aggregate_suggestions_with(sessions, policy, |_, history| {
        analyze_trend_refs(history, policy)
    })
}

/// Like [`aggregate_suggestions`], with the trend supplied by `trend_of` so
/// callers can reuse earlier classifications.
///
/// Suggestions are ordered by confidence (high first), then by most recent
/// session, then by exercise name.
pub fn aggregate_suggestions_with<F>(
    sessions: &[SessionRecord],
    policy: &ProgressionPolicy,
    mut trend_of: F,
) -> SuggestionsReport
where
    F: FnMut(&str, &[&SessionRecord]) -> TrendResult,
{
    let groups = group_by_exercise(sessions);
    let total_exercises_analyzed = groups.len();

    let mut ranked: Vec<(DateTime<Utc>, ProgressionSuggestion)> = Vec::new();
    for (&name, history) in &groups {
        let trend = trend_of(name, history.as_slice());
        if trend.trend == Trend::InsufficientData {
            continue;
        }
        let Some(suggestion) = calculate_suggestion_refs(name, history, &trend, policy) else {
            continue;
        };
        let last_trained = history.last().map(|s| s.date).unwrap_or_default();
        ranked.push((last_trained, suggestion));
    }

    ranked.sort_by(|(date_a, a), (date_b, b)| {
        a.confidence
            .cmp(&b.confidence)
            .then_with(|| date_b.cmp(date_a))
            .then_with(|| a.exercise_name.cmp(&b.exercise_name))
    });

    SuggestionsReport {
        suggestions: ranked.into_iter().map(|(_, s)| s).collect(),
        total_exercises_analyzed,
    }
}
