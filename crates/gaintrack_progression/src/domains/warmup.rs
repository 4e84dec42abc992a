//! Warm-up ramp towards a working weight.

use crate::types::{WarmupPlan, WarmupSet};

/// (percentage of working weight, reps)
pub const WARMUP_STEPS: [(u32, u32); 3] = [(40, 10), (60, 6), (80, 3)];
pub const WARMUP_ROUNDING: f64 = 5.0;
/// Ramp sets lighter than this are dropped.
pub const MIN_WARMUP_WEIGHT: f64 = 10.0;

pub fn warmup_sets(working_weight: f64) -> Vec<WarmupSet> {
    if !(working_weight.is_finite() && working_weight > 0.0) {
        return Vec::new();
    }
    WARMUP_STEPS
        .iter()
        .zip(1u32..)
        .filter_map(|(&(percentage, reps), set_number)| {
            let raw = working_weight * f64::from(percentage) / 100.0;
            let weight = (raw / WARMUP_ROUNDING).round_ties_even() * WARMUP_ROUNDING;
            (weight >= MIN_WARMUP_WEIGHT).then_some(WarmupSet {
                set_number,
                weight,
                reps,
                percentage,
                is_warmup: true,
            })
        })
        .collect()
}

pub fn warmup_plan(working_weight: f64, exercise_name: Option<String>) -> WarmupPlan {
    WarmupPlan {
        exercise_name: exercise_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        working_weight,
        warmup_sets: warmup_sets(working_weight),
    }
}
