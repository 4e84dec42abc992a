//! Wire payloads for stored workouts and their validation into strict
//! [`SessionRecord`]s.
//!
//! Stored workouts are loosely typed: numbers can arrive as strings, fields
//! can be missing or null. Anything that cannot be trusted is dropped here,
//! so the progression engine only ever sees well-formed records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::parse_session_date;
use crate::{SessionRecord, SetRecord};

pub const RPE_MIN: f64 = 0.0;
pub const RPE_MAX: f64 = 10.0;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPayload {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub workout_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub exercises: Vec<ExercisePayload>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExercisePayload {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub exercise_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub exercise_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub sets: Vec<SetPayload>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SetPayload {
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub set_number: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub reps: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub rpe: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_bool")]
    pub is_warmup: Option<bool>,
}

/// Strings and numbers are kept as text; any other shape reads as missing.
fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Only JSON strings count as text; anything else reads as missing.
fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn deserialize_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(v) if v == 0.0 => Some(false),
            Some(v) if v == 1.0 => Some(true),
            _ => None,
        },
        Some(serde_json::Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Numbers may be stored as JSON numbers or numeric strings; anything else
/// becomes `None` and is rejected later by validation.
fn deserialize_opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode workouts one element at a time. Elements that are not workout
/// objects are skipped with a warning instead of failing the whole history.
pub fn workouts_from_values(values: Vec<serde_json::Value>) -> Vec<WorkoutPayload> {
    let total = values.len();
    let workouts: Vec<WorkoutPayload> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if !value.is_object() {
                tracing::warn!(index, "skipping workout entry that is not an object");
                return None;
            }
            match serde_json::from_value::<WorkoutPayload>(value) {
                Ok(workout) => Some(workout),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping undecodable workout");
                    None
                }
            }
        })
        .collect();
    if workouts.len() < total {
        metrics::counter!("gaintrack_workouts_skipped_total")
            .increment((total - workouts.len()) as u64);
    }
    workouts
}

/// Validate a set, or `None` when its weight or reps cannot be trusted.
pub fn validate_set(raw: &SetPayload) -> Option<SetRecord> {
    let weight = raw.weight.filter(|w| w.is_finite() && *w >= 0.0)?;
    let reps = raw
        .reps
        .filter(|r| r.is_finite() && *r >= 0.0 && r.fract() == 0.0 && *r <= f64::from(u32::MAX))?
        as u32;
    Some(SetRecord {
        weight,
        reps,
        rpe: sanitize_rpe(raw.rpe),
        is_warmup: raw.is_warmup.unwrap_or(false),
    })
}

/// Out-of-range RPE values are treated as not recorded.
pub fn sanitize_rpe(rpe: Option<f64>) -> Option<f64> {
    rpe.filter(|r| r.is_finite() && (RPE_MIN..=RPE_MAX).contains(r))
}

struct ValidatedWorkout {
    date: DateTime<Utc>,
    sessions: Vec<SessionRecord>,
}

fn validate_workout(raw: WorkoutPayload) -> Option<ValidatedWorkout> {
    let Some(date) = raw.date.as_deref().and_then(parse_session_date) else {
        tracing::warn!(
            workout_id = raw.workout_id.as_deref().unwrap_or("?"),
            date = raw.date.as_deref().unwrap_or(""),
            "dropping workout with unreadable date"
        );
        return None;
    };

    let mut sessions = Vec::with_capacity(raw.exercises.len());
    for exercise in raw.exercises {
        let name = exercise
            .exercise_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if name.is_empty() {
            tracing::debug!(
                workout_id = raw.workout_id.as_deref().unwrap_or("?"),
                "dropping exercise entry without a name"
            );
            continue;
        }
        let total = exercise.sets.len();
        let sets: Vec<SetRecord> = exercise.sets.iter().filter_map(validate_set).collect();
        if sets.len() < total {
            tracing::debug!(
                exercise = name,
                dropped = total - sets.len(),
                "dropping sets with invalid weight or reps"
            );
        }
        let session = SessionRecord::new(name, date, sets);
        sessions.push(match raw.workout_id.as_deref() {
            Some(id) => session.with_workout_id(id),
            None => session,
        });
    }

    Some(ValidatedWorkout { date, sessions })
}

/// Validate stored workouts into session records.
///
/// When `exercise_name` is set only workouts containing that exercise are
/// considered, and only its sessions are returned. When `limit` is set only
/// the most recent `limit` of those workouts are kept. Each exercise entry of
/// a workout becomes one session dated with the workout's date.
pub fn sessions_from_workouts(
    workouts: Vec<WorkoutPayload>,
    exercise_name: Option<&str>,
    limit: Option<usize>,
) -> Vec<SessionRecord> {
    let exercise_name = exercise_name.map(str::trim);
    let mut validated: Vec<ValidatedWorkout> = workouts
        .into_iter()
        .filter_map(validate_workout)
        .filter(|w| {
            exercise_name.is_none_or(|name| w.sessions.iter().any(|s| s.exercise_name == name))
        })
        .collect();
    validated.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        validated.truncate(limit);
    }
    let sessions = validated.into_iter().flat_map(|w| w.sessions).collect();
    filter_by_exercise(sessions, exercise_name)
}

/// Keep only sessions for `exercise_name` when one is given.
pub fn filter_by_exercise(
    sessions: Vec<SessionRecord>,
    exercise_name: Option<&str>,
) -> Vec<SessionRecord> {
    match exercise_name.map(str::trim) {
        Some(name) => sessions
            .into_iter()
            .filter(|s| s.exercise_name == name)
            .collect(),
        None => sessions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workouts(value: serde_json::Value) -> Vec<WorkoutPayload> {
        serde_json::from_value(value).expect("deserialize workouts")
    }

    #[test]
    fn lenient_numbers_from_strings() {
        let raw: SetPayload =
            serde_json::from_value(json!({"weight": "102.5", "reps": "5", "rpe": 8}))
                .expect("set");
        let set = validate_set(&raw).expect("valid set");
        assert_eq!(set.weight, 102.5);
        assert_eq!(set.reps, 5);
        assert_eq!(set.rpe, Some(8.0));
    }

    #[test]
    fn invalid_sets_are_dropped() {
        let negative = SetPayload {
            weight: Some(-5.0),
            reps: Some(5.0),
            ..Default::default()
        };
        let fractional_reps = SetPayload {
            weight: Some(50.0),
            reps: Some(5.5),
            ..Default::default()
        };
        let missing_weight = SetPayload {
            reps: Some(5.0),
            ..Default::default()
        };
        assert!(validate_set(&negative).is_none());
        assert!(validate_set(&fractional_reps).is_none());
        assert!(validate_set(&missing_weight).is_none());
    }

    #[test]
    fn out_of_range_rpe_is_cleared() {
        assert_eq!(sanitize_rpe(Some(11.0)), None);
        assert_eq!(sanitize_rpe(Some(-1.0)), None);
        assert_eq!(sanitize_rpe(Some(f64::NAN)), None);
        assert_eq!(sanitize_rpe(Some(9.5)), Some(9.5));
    }

    #[test]
    fn workouts_flatten_into_sessions_most_recent_first() {
        let raw = workouts(json!([
            {
                "workout_id": "wk_1",
                "date": "2025-01-01T10:00:00Z",
                "exercises": [
                    {"exercise_name": "Squats", "sets": [{"weight": 100, "reps": 5}]}
                ]
            },
            {
                "workout_id": "wk_2",
                "date": "2025-01-03",
                "exercises": [
                    {"exercise_name": " Bench Press ", "sets": [{"weight": 80, "reps": 8, "is_warmup": null}]},
                    {"exercise_name": "", "sets": [{"weight": 1, "reps": 1}]}
                ]
            }
        ]));
        let sessions = sessions_from_workouts(raw, None, None);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].exercise_name, "Bench Press");
        assert_eq!(sessions[1].exercise_name, "Squats");
    }

    #[test]
    fn unreadable_dates_drop_the_workout() {
        let raw = workouts(json!([
            {"workout_id": 7, "date": "yesterday", "exercises": [{"exercise_name": "Deadlift", "sets": []}]},
            {"workout_id": "wk_9", "exercises": null}
        ]));
        assert!(sessions_from_workouts(raw, None, None).is_empty());
    }

    #[test]
    fn limit_keeps_most_recent_workouts() {
        let raw = workouts(json!([
            {"date": "2025-01-01", "exercises": [{"exercise_name": "A", "sets": []}]},
            {"date": "2025-01-05", "exercises": [{"exercise_name": "B", "sets": []}]},
            {"date": "2025-01-03", "exercises": [{"exercise_name": "C", "sets": []}]}
        ]));
        let sessions = sessions_from_workouts(raw, None, Some(2));
        let names: Vec<&str> = sessions.iter().map(|s| s.exercise_name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn sessions_without_valid_sets_are_kept() {
        let raw = workouts(json!([
            {"date": "2025-01-01", "exercises": [{"exercise_name": "Rows", "sets": [{"weight": "heavy", "reps": 5}]}]}
        ]));
        let sessions = sessions_from_workouts(raw, None, None);
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].sets.is_empty());
        assert!(!sessions[0].is_qualifying());
    }

    #[test]
    fn filter_by_exercise_matches_trimmed_name() {
        let raw = workouts(json!([
            {"date": "2025-01-01", "exercises": [
                {"exercise_name": "Rows", "sets": []},
                {"exercise_name": "Squats", "sets": []}
            ]}
        ]));
        let sessions = sessions_from_workouts(raw, None, None);
        let rows = filter_by_exercise(sessions.clone(), Some(" Rows"));
        assert_eq!(rows.len(), 1);
        assert_eq!(filter_by_exercise(sessions, None).len(), 2);
    }

    #[test]
    fn odd_field_shapes_read_as_missing() {
        let raw: WorkoutPayload = serde_json::from_value(json!({
            "date": "2025-01-01",
            "name": {"en": "Push"},
            "exercises": [
                {"exercise_name": 42, "sets": [{"weight": 60, "reps": 5}]},
                {"exercise_name": "Dips", "sets": [
                    {"weight": 20, "reps": 8, "is_warmup": "false"},
                    {"weight": 10, "reps": 8, "is_warmup": 1},
                    {"weight": 10, "reps": 8, "is_warmup": "sometimes"}
                ]}
            ]
        }))
        .expect("lenient workout");
        assert_eq!(raw.name, None);
        assert_eq!(raw.exercises[0].exercise_name, None);
        let warmups: Vec<Option<bool>> =
            raw.exercises[1].sets.iter().map(|s| s.is_warmup).collect();
        assert_eq!(warmups, vec![Some(false), Some(true), None]);

        let sessions = sessions_from_workouts(vec![raw], None, None);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].exercise_name, "Dips");
        assert_eq!(sessions[0].sets_completed(), 2);
    }

    #[test]
    fn bad_elements_are_skipped_not_fatal() {
        let values = vec![
            json!({"workout_id": "wk_ok", "date": "2025-02-01", "exercises": [
                {"exercise_name": "Squats", "sets": [{"weight": 100, "reps": 5}]}
            ]}),
            serde_json::Value::Null,
            json!("not a workout"),
            json!({"date": "2025-02-02", "exercises": {"exercise_name": "Squats"}}),
            json!({"date": {"$date": "2025-02-03"}, "exercises": []}),
        ];
        let decoded = workouts_from_values(values);
        assert_eq!(decoded.len(), 2);

        let sessions = sessions_from_workouts(decoded, None, None);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].exercise_name, "Squats");
        assert_eq!(sessions[0].workout_id.as_deref(), Some("wk_ok"));
    }

    #[test]
    fn exercise_filter_applies_before_the_limit() {
        let mut values: Vec<serde_json::Value> = (1..=10)
            .map(|d| {
                json!({"date": format!("2024-01-{d:02}"), "exercises": [
                    {"exercise_name": "Deadlift", "sets": [{"weight": 180, "reps": 3}]}
                ]})
            })
            .collect();
        values.extend((1..=20).map(|d| {
            json!({"date": format!("2024-06-{d:02}"), "exercises": [
                {"exercise_name": "Rows", "sets": [{"weight": 70, "reps": 10}]}
            ]})
        }));
        let raw = workouts_from_values(values);

        let deadlifts = sessions_from_workouts(raw.clone(), Some("Deadlift"), Some(5));
        assert_eq!(deadlifts.len(), 5);
        assert!(deadlifts.iter().all(|s| s.exercise_name == "Deadlift"));
        assert_eq!(
            deadlifts[0].date.date_naive(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 10).expect("date")
        );

        assert!(sessions_from_workouts(raw, None, Some(5))
            .iter()
            .all(|s| s.exercise_name == "Rows"));
    }
}
