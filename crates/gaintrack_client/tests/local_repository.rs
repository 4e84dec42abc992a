use gaintrack_client::config::Config;
use gaintrack_client::local_store::LocalSessionRepository;
use gaintrack_client::{RepositoryError, SessionRepository, repository_from_config};
use tempfile::tempdir;

fn write_store(dir: &std::path::Path, body: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("workouts.json");
    std::fs::write(&path, serde_json::to_vec(body).expect("encode")).expect("write store");
    path
}

#[tokio::test]
async fn reads_bare_workout_array() {
    let dir = tempdir().expect("tempdir");
    let path = write_store(
        dir.path(),
        &serde_json::json!([
            {
                "workout_id": "wk_1700000000000",
                "date": "2025-03-01T08:00:00.000Z",
                "exercises": [
                    {"exercise_name": "Squats", "sets": [
                        {"weight": 60, "reps": 5, "is_warmup": true},
                        {"weight": 120, "reps": 5, "rpe": 8}
                    ]}
                ]
            }
        ]),
    );

    let repo = LocalSessionRepository::new(&path);
    let sessions = repo.list_sessions(None).await.expect("sessions");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].max_weight(), Some(120.0));
    assert_eq!(sessions[0].sets.len(), 2);
}

#[tokio::test]
async fn reads_keyed_storage_dump_with_history_limit() {
    let dir = tempdir().expect("tempdir");
    let path = write_store(
        dir.path(),
        &serde_json::json!({
            "gaintrack_workouts": [
                {"date": "2025-03-01", "exercises": [{"exercise_name": "Deadlift", "sets": [{"weight": 140, "reps": 3}]}]},
                {"date": "2025-03-08", "exercises": [{"exercise_name": "Deadlift", "sets": [{"weight": 145, "reps": 3}]}]},
                {"date": "2025-03-15", "exercises": [{"exercise_name": "Deadlift", "sets": [{"weight": 150, "reps": 3}]}]}
            ]
        }),
    );

    let repo = LocalSessionRepository::new(&path).with_history_limit(2);
    let sessions = repo.list_sessions(Some("Deadlift")).await.expect("sessions");
    let weights: Vec<f64> = sessions.iter().filter_map(|s| s.max_weight()).collect();
    assert_eq!(weights, vec![150.0, 145.0]);
}

#[tokio::test]
async fn malformed_records_are_skipped_and_the_rest_loads() {
    let good = serde_json::json!({
        "workout_id": "wk_good",
        "date": "2025-03-01",
        "exercises": [{"exercise_name": "Squats", "sets": [{"weight": 120, "reps": 5, "rpe": 8}]}]
    });
    let bad_variants = [
        serde_json::json!({"date": "2025-03-02", "exercises": [
            {"exercise_name": "Squats", "sets": [{"weight": 125, "reps": 5, "is_warmup": "false"}]}
        ]}),
        serde_json::json!({"date": "2025-03-02", "exercises": [
            {"exercise_name": 42, "sets": [{"weight": 125, "reps": 5}]}
        ]}),
        serde_json::json!({"date": {"$date": "2025-03-02"}, "exercises": []}),
        serde_json::Value::Null,
    ];

    for bad in bad_variants {
        let dir = tempdir().expect("tempdir");
        let path = write_store(dir.path(), &serde_json::json!([good.clone(), bad.clone()]));
        let repo = LocalSessionRepository::new(&path);
        let sessions = repo.list_sessions(None).await.expect("sessions");
        assert!(
            sessions
                .iter()
                .any(|s| s.workout_id.as_deref() == Some("wk_good")),
            "good workout lost next to {bad}"
        );
    }
}

#[tokio::test]
async fn exercise_history_reaches_past_the_workout_limit() {
    let dir = tempdir().expect("tempdir");
    let mut workouts: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            serde_json::json!({
                "workout_id": format!("wk_dl_{i}"),
                "date": format!("2024-01-{:02}", i + 1),
                "exercises": [{"exercise_name": "Deadlift", "sets": [{"weight": 140 + i * 5, "reps": 3}]}]
            })
        })
        .collect();
    workouts.extend((0..50).map(|i| {
        serde_json::json!({
            "date": format!("2024-{:02}-{:02}", 3 + i / 25, 1 + i % 25),
            "exercises": [{"exercise_name": "Bench Press", "sets": [{"weight": 80, "reps": 8}]}]
        })
    }));
    let path = write_store(dir.path(), &serde_json::Value::Array(workouts));

    let repo = LocalSessionRepository::new(&path).with_history_limit(50);
    let deadlifts = repo.list_sessions(Some("Deadlift")).await.expect("sessions");
    assert_eq!(deadlifts.len(), 10);
    assert_eq!(deadlifts[0].max_weight(), Some(185.0));
    assert_eq!(deadlifts[0].workout_id.as_deref(), Some("wk_dl_9"));

    let everything = repo.list_sessions(None).await.expect("sessions");
    assert_eq!(everything.len(), 50);
    assert!(everything.iter().all(|s| s.exercise_name == "Bench Press"));
}

#[tokio::test]
async fn corrupt_store_is_a_decode_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("workouts.json");
    std::fs::write(&path, b"[{\"date\": ").expect("write");

    let repo = LocalSessionRepository::new(&path);
    let err = repo.list_sessions(None).await.expect_err("decode error");
    assert!(matches!(err, RepositoryError::Decode(_)));
}

#[tokio::test]
async fn empty_file_is_empty_history() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("workouts.json");
    std::fs::write(&path, b"  \n").expect("write");

    let repo = LocalSessionRepository::new(&path);
    assert!(repo.list_sessions(None).await.expect("sessions").is_empty());
}

#[tokio::test]
async fn config_builds_local_repository() {
    let dir = tempdir().expect("tempdir");
    let path = write_store(dir.path(), &serde_json::json!([]));
    let path_str = path.to_string_lossy().to_string();

    let cfg = Config::from_env_with(|k| match k {
        "GAINTRACK_DATA_PATH" => Some(path_str.clone()),
        _ => None,
    })
    .expect("cfg");
    let repo = repository_from_config(&cfg);
    assert_eq!(repo.backend_name(), "local");
    assert!(repo.list_sessions(None).await.expect("sessions").is_empty());
}
