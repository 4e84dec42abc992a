//! Turns a classified trend into a concrete next-session weight.

use gaintrack_client::SessionRecord;

use crate::domains::trend::{analyze_trend_refs, chronological_qualifying};
use crate::policy::ProgressionPolicy;
use crate::types::{Confidence, PerformanceSnapshot, ProgressionSuggestion, Trend, TrendResult};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    ReadyToProgress,
    SmallStep,
    Consolidate,
    TestLimits,
    Hold,
    Deload,
}

impl Rule {
    fn select(trend: Trend, last_rpe: f64, policy: &ProgressionPolicy) -> Option<Self> {
        match trend {
            Trend::Improving if last_rpe <= policy.high_confidence_max_rpe => {
                Some(Rule::ReadyToProgress)
            }
            Trend::Improving if last_rpe <= policy.moderate_max_rpe => Some(Rule::SmallStep),
            Trend::Improving => Some(Rule::Consolidate),
            Trend::Stable => Some(Rule::TestLimits),
            Trend::Declining if policy.deload_on_decline => Some(Rule::Deload),
            Trend::Declining => Some(Rule::Hold),
            Trend::InsufficientData => None,
        }
    }

    fn percentage(self, policy: &ProgressionPolicy) -> f64 {
        match self {
            Rule::ReadyToProgress => policy.improving_increase_pct,
            Rule::SmallStep => policy.moderate_increase_pct,
            Rule::Consolidate | Rule::Hold => 0.0,
            Rule::TestLimits => policy.stable_increase_pct,
            Rule::Deload => policy.declining_adjustment_pct(),
        }
    }

    fn confidence(self) -> Confidence {
        match self {
            Rule::ReadyToProgress => Confidence::High,
            Rule::SmallStep | Rule::Consolidate | Rule::TestLimits => Confidence::Medium,
            Rule::Hold | Rule::Deload => Confidence::Low,
        }
    }

    fn reason(self, last_rpe: f64, pct: f64) -> String {
        match self {
            Rule::ReadyToProgress => format!(
                "Weight is climbing with manageable effort (RPE {last_rpe:.1}). Ready to add weight."
            ),
            Rule::SmallStep => format!(
                "Progressing well, but effort is rising (RPE {last_rpe:.1}). Small increase recommended."
            ),
            Rule::Consolidate => format!(
                "Progressing, but RPE is high ({last_rpe:.1}). Consolidate the current weight before adding more."
            ),
            Rule::TestLimits => {
                "Performance has been consistent. Try a small increase to test your limits."
                    .to_string()
            }
            Rule::Hold => {
                "Performance is trending down. Hold the current weight and focus on recovery."
                    .to_string()
            }
            Rule::Deload => format!(
                "Performance is trending down. Deload by {:.1}% to recover before pushing again.",
                pct.abs()
            ),
        }
    }
}

/// Round to the nearest multiple of `increment`, ties to even.
pub fn round_to_increment(value: f64, increment: f64) -> f64 {
    let rounded = (value / increment).round_ties_even() * increment;
    // collapse -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub(crate) fn calculate_suggestion_refs(
    exercise_name: &str,
    sessions: &[&SessionRecord],
    trend: &TrendResult,
    policy: &ProgressionPolicy,
) -> Option<ProgressionSuggestion> {
    let ordered = chronological_qualifying(sessions.iter().copied());
    let last = ordered.last()?;
    let current_weight = last.max_weight()?;
    if !(current_weight.is_finite() && current_weight > 0.0) {
        return None;
    }

    let last_rpe = last.avg_rpe().unwrap_or(policy.default_rpe);
    let rule = Rule::select(trend.trend, last_rpe, policy)?;
    let rule_pct = rule.percentage(policy);
    let increase_amount =
        round_to_increment(current_weight * rule_pct / 100.0, policy.rounding_increment);
    // a step that rounds away is reported as no change
    let (increase_percentage, reason) = if increase_amount == 0.0 && rule_pct != 0.0 {
        (
            0.0,
            format!(
                "{} A {:.1}% step is below the {} rounding increment at this weight, so keep it unchanged.",
                rule.reason(last_rpe, rule_pct),
                rule_pct.abs(),
                policy.rounding_increment
            ),
        )
    } else {
        (rule_pct, rule.reason(last_rpe, rule_pct))
    };

    let recent_performance = ordered
        .iter()
        .rev()
        .take(policy.recent_performance_limit)
        .filter_map(|s| PerformanceSnapshot::from_session(s))
        .collect();

    Some(ProgressionSuggestion {
        exercise_name: exercise_name.to_string(),
        current_weight,
        suggested_weight: current_weight + increase_amount,
        increase_amount,
        increase_percentage,
        confidence: rule.confidence(),
        reason,
        recent_performance,
    })
}

/// Suggestion for one exercise given its already-classified trend.
///
/// Returns `None` when the trend is `insufficient_data` or the most recent
/// qualifying session has no positive working weight.
pub fn calculate_suggestion(
    exercise_name: &str,
    sessions: &[SessionRecord],
    trend: &TrendResult,
    policy: &ProgressionPolicy,
) -> Option<ProgressionSuggestion> {
    let refs: Vec<&SessionRecord> = sessions.iter().collect();
    calculate_suggestion_refs(exercise_name, &refs, trend, policy)
}

/// Classify and suggest in one step.
pub fn suggest_for_exercise(
    exercise_name: &str,
    sessions: &[SessionRecord],
    policy: &ProgressionPolicy,
) -> Option<ProgressionSuggestion> {
    let refs: Vec<&SessionRecord> = sessions.iter().collect();
    let trend = analyze_trend_refs(&refs, policy);
    calculate_suggestion_refs(exercise_name, &refs, &trend, policy)
}
