//! Progression engine.
//!
//! Every function here is pure: it takes a snapshot of session records and a
//! [`ProgressionPolicy`](crate::policy::ProgressionPolicy) and returns owned
//! results. Fetching and caching live in [`crate::services`].
//!
//! # Modules
//!
//! - [`trend`]: classify an exercise as improving, stable or declining
//! - [`suggestion`]: next-session weight for one exercise
//! - [`aggregator`]: ranked suggestions across all exercises
//! - [`history`]: per-exercise history and personal records
//! - [`warmup`]: warm-up ramp for a working weight

pub mod aggregator;
pub mod history;
pub mod suggestion;
pub mod trend;
pub mod warmup;

pub use aggregator::{aggregate_suggestions, aggregate_suggestions_with, group_by_exercise};
pub use history::exercise_progression;
pub use suggestion::{calculate_suggestion, round_to_increment, suggest_for_exercise};
pub use trend::analyze_trend;
pub use warmup::{warmup_plan, warmup_sets};
