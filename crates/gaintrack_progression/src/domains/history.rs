//! Per-exercise progression report: recent history, personal records, trend.

use gaintrack_client::SessionRecord;

use crate::domains::trend::{analyze_trend_refs, chronological_qualifying};
use crate::policy::ProgressionPolicy;
use crate::types::{ExerciseProgression, PerformanceSnapshot, PersonalRecords};

pub fn personal_records(sessions: &[&SessionRecord]) -> PersonalRecords {
    sessions
        .iter()
        .fold(PersonalRecords::default(), |mut pr, s| {
            if let Some(w) = s.max_weight() {
                pr.max_weight = pr.max_weight.max(w);
            }
            pr.max_volume = pr.max_volume.max(s.total_volume());
            pr
        })
}

/// Build the report for `exercise_name` from any slice of sessions; other
/// exercises are ignored. An unknown exercise yields an empty report.
pub fn exercise_progression(
    exercise_name: &str,
    sessions: &[SessionRecord],
    policy: &ProgressionPolicy,
) -> ExerciseProgression {
    let name = exercise_name.trim();
    let matching: Vec<&SessionRecord> = sessions
        .iter()
        .filter(|s| s.exercise_name == name)
        .collect();
    let ordered = chronological_qualifying(matching.iter().copied());

    let history = ordered
        .iter()
        .rev()
        .take(policy.history_limit)
        .filter_map(|s| PerformanceSnapshot::from_session(s))
        .collect();

    ExerciseProgression {
        exercise_name: name.to_string(),
        history,
        personal_records: personal_records(&ordered),
        trend: analyze_trend_refs(&matching, policy).trend,
        total_sessions: ordered.len(),
    }
}
