use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use gaintrack_client::SessionRecord;

/// Direction of an exercise's recent performance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
            Trend::InsufficientData => "insufficient_data",
        }
    }
}

/// Variant order is ranking order: `High` sorts first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrendResult {
    pub trend: Trend,
    pub sessions_considered: usize,
}

/// Reduced view of one qualifying session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceSnapshot {
    pub date: DateTime<Utc>,
    pub max_weight: f64,
    pub total_volume: f64,
    pub sets_completed: usize,
    pub total_reps: u32,
    /// Mean RPE of working sets, one decimal place.
    pub avg_rpe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
}

impl PerformanceSnapshot {
    /// `None` for sessions without working sets.
    pub fn from_session(session: &SessionRecord) -> Option<Self> {
        Some(Self {
            date: session.date,
            max_weight: session.max_weight()?,
            total_volume: session.total_volume(),
            sets_completed: session.sets_completed(),
            total_reps: session.total_reps(),
            avg_rpe: session.avg_rpe().map(|r| (r * 10.0).round() / 10.0),
            workout_id: session.workout_id.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProgressionSuggestion {
    pub exercise_name: String,
    pub current_weight: f64,
    pub suggested_weight: f64,
    pub increase_amount: f64,
    /// Plain percentage, e.g. `5` for five percent.
    pub increase_percentage: f64,
    pub confidence: Confidence,
    pub reason: String,
    /// Most recent first.
    pub recent_performance: Vec<PerformanceSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionsReport {
    pub suggestions: Vec<ProgressionSuggestion>,
    pub total_exercises_analyzed: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersonalRecords {
    pub max_weight: f64,
    pub max_volume: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExerciseProgression {
    pub exercise_name: String,
    /// Most recent first.
    pub history: Vec<PerformanceSnapshot>,
    pub personal_records: PersonalRecords,
    pub trend: Trend,
    pub total_sessions: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WarmupSet {
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    /// Share of the working weight, in percent.
    pub percentage: u32,
    pub is_warmup: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WarmupPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_name: Option<String>,
    pub working_weight: f64,
    pub warmup_sets: Vec<WarmupSet>,
}

// === Tool Parameters ===

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ExerciseNameParam {
    /// Exercise name exactly as logged, e.g. "Bench Press"
    pub exercise_name: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct WarmupParams {
    /// Working-set weight to warm up towards
    pub working_weight: f64,
    pub exercise_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ProgressionReviewParams {
    /// Optional exercise to focus the review on
    pub exercise_name: Option<String>,
}
