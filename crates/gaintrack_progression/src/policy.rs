//! Tunable thresholds for trend classification and weight suggestions.
//!
//! The defaults reproduce the progression rules the mobile app displays
//! (5 % / 2.5 % steps, RPE 7 and 8.5 bands). They are policy, not physiology:
//! every value can be overridden.

use schemars::JsonSchema;
use serde::Serialize;

use crate::error::{ProgressionError, ProgressionResult};

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct ProgressionPolicy {
    /// Qualifying sessions needed before a trend or suggestion is computed.
    pub min_sessions: usize,
    /// Sessions (including the most recent) compared by the trend analyzer.
    pub lookback_sessions: usize,
    /// Allowed RPE increase that still counts as "no harder".
    pub rpe_tolerance: f64,
    /// Volume gain over the prior mean that marks an improving trend.
    pub volume_gain_pct: f64,
    /// Volume loss below the prior mean that marks a declining trend.
    pub volume_drop_pct: f64,
    pub high_confidence_max_rpe: f64,
    pub moderate_max_rpe: f64,
    pub improving_increase_pct: f64,
    pub moderate_increase_pct: f64,
    pub stable_increase_pct: f64,
    /// Suggest a deload instead of holding when the trend is declining.
    pub deload_on_decline: bool,
    pub deload_pct: f64,
    /// Suggested increases are rounded to a multiple of this.
    pub rounding_increment: f64,
    /// RPE assumed for a session that logged none.
    pub default_rpe: f64,
    pub recent_performance_limit: usize,
    pub history_limit: usize,
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self {
            min_sessions: 2,
            lookback_sessions: 5,
            rpe_tolerance: 0.5,
            volume_gain_pct: 5.0,
            volume_drop_pct: 10.0,
            high_confidence_max_rpe: 7.0,
            moderate_max_rpe: 8.5,
            improving_increase_pct: 5.0,
            moderate_increase_pct: 2.5,
            stable_increase_pct: 2.5,
            deload_on_decline: false,
            deload_pct: 5.0,
            rounding_increment: 0.5,
            default_rpe: 7.0,
            recent_performance_limit: 3,
            history_limit: 20,
        }
    }
}

impl ProgressionPolicy {
    pub fn from_env() -> ProgressionResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Read overrides through `get`, leaving unset values at their defaults.
    pub fn from_env_with<F>(mut get: F) -> ProgressionResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut policy = Self::default();
        if let Some(raw) = get("GAINTRACK_LOOKBACK_SESSIONS") {
            policy.lookback_sessions = raw.trim().parse().map_err(|_| {
                ProgressionError::Validation(format!(
                    "GAINTRACK_LOOKBACK_SESSIONS must be an integer, got {raw}"
                ))
            })?;
        }
        if let Some(raw) = get("GAINTRACK_DELOAD_ON_DECLINE") {
            policy.deload_on_decline = matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(raw) = get("GAINTRACK_ROUNDING_INCREMENT") {
            policy.rounding_increment = raw.trim().parse().map_err(|_| {
                ProgressionError::Validation(format!(
                    "GAINTRACK_ROUNDING_INCREMENT must be a number, got {raw}"
                ))
            })?;
        }
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> ProgressionResult<()> {
        if self.min_sessions < 2 {
            return Err(ProgressionError::Validation(
                "min_sessions must be at least 2".into(),
            ));
        }
        if self.lookback_sessions < 2 {
            return Err(ProgressionError::Validation(
                "lookback_sessions must be at least 2".into(),
            ));
        }
        if !(self.rounding_increment.is_finite() && self.rounding_increment > 0.0) {
            return Err(ProgressionError::Validation(
                "rounding_increment must be a positive number".into(),
            ));
        }
        if self.high_confidence_max_rpe > self.moderate_max_rpe {
            return Err(ProgressionError::Validation(
                "high_confidence_max_rpe must not exceed moderate_max_rpe".into(),
            ));
        }
        Ok(())
    }

    /// Increase (or deload) percentage applied to a declining exercise.
    pub fn declining_adjustment_pct(&self) -> f64 {
        if self.deload_on_decline {
            -self.deload_pct.abs()
        } else {
            0.0
        }
    }
}
