//! Trend classification over an exercise's recent sessions.

use gaintrack_client::SessionRecord;

use crate::policy::ProgressionPolicy;
use crate::types::{Trend, TrendResult};

/// Qualifying sessions (at least one working set), oldest first.
/// Sessions sharing a timestamp keep their input order.
pub(crate) fn chronological_qualifying<'a>(
    sessions: impl IntoIterator<Item = &'a SessionRecord>,
) -> Vec<&'a SessionRecord> {
    let mut ordered: Vec<&SessionRecord> =
        sessions.into_iter().filter(|s| s.is_qualifying()).collect();
    ordered.sort_by_key(|s| s.date);
    ordered
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowStats {
    max_weight: f64,
    volume: f64,
    rpe: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn stats_of(session: &SessionRecord) -> WindowStats {
    WindowStats {
        max_weight: session.max_weight().unwrap_or(0.0),
        volume: session.total_volume(),
        rpe: session.avg_rpe(),
    }
}

fn prior_stats(prior: &[&SessionRecord]) -> WindowStats {
    WindowStats {
        max_weight: mean(prior.iter().filter_map(|s| s.max_weight())).unwrap_or(0.0),
        volume: mean(prior.iter().map(|s| s.total_volume())).unwrap_or(0.0),
        rpe: mean(prior.iter().filter_map(|s| s.avg_rpe())),
    }
}

/// Improving is checked before declining, so a session that both lifts
/// heavier and drops volume counts as improving.
fn classify(recent: WindowStats, prior: WindowStats, policy: &ProgressionPolicy) -> Trend {
    let effort_held = match (recent.rpe, prior.rpe) {
        (Some(r), Some(p)) => r <= p + policy.rpe_tolerance,
        _ => true,
    };
    let effort_rose = match (recent.rpe, prior.rpe) {
        (Some(r), Some(p)) => r > p,
        _ => false,
    };
    let volume_up = prior.volume > 0.0
        && recent.volume >= prior.volume * (1.0 + policy.volume_gain_pct / 100.0);
    let volume_down = prior.volume > 0.0
        && recent.volume <= prior.volume * (1.0 - policy.volume_drop_pct / 100.0);

    if (recent.max_weight > prior.max_weight && effort_held) || volume_up {
        Trend::Improving
    } else if (recent.max_weight < prior.max_weight && effort_rose) || volume_down {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

pub(crate) fn analyze_trend_refs(
    sessions: &[&SessionRecord],
    policy: &ProgressionPolicy,
) -> TrendResult {
    let ordered = chronological_qualifying(sessions.iter().copied());
    if ordered.len() < policy.min_sessions.max(2) {
        return TrendResult {
            trend: Trend::InsufficientData,
            sessions_considered: ordered.len(),
        };
    }

    let start = ordered
        .len()
        .saturating_sub(policy.lookback_sessions.max(2));
    let window = &ordered[start..];
    let Some((recent, prior)) = window.split_last() else {
        return TrendResult {
            trend: Trend::InsufficientData,
            sessions_considered: 0,
        };
    };

    TrendResult {
        trend: classify(stats_of(recent), prior_stats(prior), policy),
        sessions_considered: window.len(),
    }
}

/// Classify one exercise's history. Input order does not matter; sessions
/// without working sets are ignored.
pub fn analyze_trend(sessions: &[SessionRecord], policy: &ProgressionPolicy) -> TrendResult {
    let refs: Vec<&SessionRecord> = sessions.iter().collect();
    analyze_trend_refs(&refs, policy)
}
