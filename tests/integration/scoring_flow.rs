use std::sync::Arc;

use chrono::{TimeZone, Utc};
use habitscore::db::repositories::completion_repository::CompletionRepository;
use habitscore::db::repositories::habit_repository::HabitRepository;
use habitscore::db::repositories::user_repository::UserRepository;
use habitscore::db::DbPool;
use habitscore::engine::ScoringEngine;
use habitscore::models::completion::CompletionUpsert;
use habitscore::models::habit::HabitCreateInput;
use habitscore::models::user::UserCreateInput;
use habitscore::utils::clock::FixedClock;
use tempfile::tempdir;

fn setup_engine(dir: &tempfile::TempDir) -> (ScoringEngine, DbPool, Arc<FixedClock>) {
    let db_path = dir.path().join("habitscore.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 6, 3, 12, 0, 0)
            .single()
            .expect("clock time"),
    ));
    let engine = ScoringEngine::with_clock(pool.clone(), clock.clone());
    (engine, pool, clock)
}

fn seed_user(pool: &DbPool, username: &str) -> String {
    pool.with_connection(|conn| {
        UserRepository::insert(
            conn,
            &UserCreateInput {
                username: username.into(),
                email: format!("{username}@example.com"),
            },
        )
    })
    .expect("insert user")
    .id
}

fn seed_habit(pool: &DbPool, user_id: &str, name: &str) -> String {
    pool.with_connection(|conn| {
        HabitRepository::insert(
            conn,
            &HabitCreateInput {
                user_id: user_id.into(),
                name: name.into(),
                color: None,
            },
        )
    })
    .expect("insert habit")
    .id
}

fn toggle_completion(
    engine: &ScoringEngine,
    pool: &DbPool,
    user_id: &str,
    habit_id: &str,
    date: &str,
    completed: bool,
) {
    pool.with_connection(|conn| {
        CompletionRepository::upsert_completion(
            conn,
            &CompletionUpsert {
                user_id: user_id.into(),
                habit_id: habit_id.into(),
                completion_date: date.into(),
                completed,
                notes: None,
            },
        )
    })
    .expect("upsert completion");

    // The toggle collaborator recalculates synchronously before returning.
    engine
        .record_completion_change(user_id, date)
        .expect("record completion change");
}

#[test]
fn toggles_scores_and_stats_flow() {
    let dir = tempdir().expect("temp dir");
    let (engine, pool, _clock) = setup_engine(&dir);

    let user_id = seed_user(&pool, "casey");
    let habit_a = seed_habit(&pool, &user_id, "Read");
    let habit_b = seed_habit(&pool, &user_id, "Run");

    // Day 1: both habits, day 2: none, day 3: both.
    toggle_completion(&engine, &pool, &user_id, &habit_a, "2025-06-01", true);
    toggle_completion(&engine, &pool, &user_id, &habit_b, "2025-06-01", true);
    engine
        .record_completion_change(&user_id, "2025-06-02")
        .expect("empty day score");
    toggle_completion(&engine, &pool, &user_id, &habit_a, "2025-06-03", true);
    toggle_completion(&engine, &pool, &user_id, &habit_b, "2025-06-03", true);

    let scores = engine
        .fetch_scores(&user_id, "2025-06-01", "2025-06-03")
        .expect("fetch scores");
    assert_eq!(scores.len(), 3);
    assert_eq!(scores[0].score, 200);
    assert_eq!(scores[1].score, 0);
    assert_eq!(scores[2].score, 200);
    assert!((scores[0].percentage - 100.0).abs() < 0.001);
    assert!((scores[1].percentage - 0.0).abs() < 0.001);

    let stats = engine
        .fetch_stats(&user_id, "2025-06-01", "2025-06-03")
        .expect("fetch stats");
    assert_eq!(stats.total_score, 400);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 1);
    let best = stats.best_day.expect("best day");
    assert_eq!(best.score_date, "2025-06-01");

    // Stats over a range with no rows stay total and zero-valued.
    let empty = engine
        .fetch_stats(&user_id, "2025-01-01", "2025-01-31")
        .expect("empty stats");
    assert_eq!(empty.total_score, 0);
    assert!(empty.best_day.is_none());
    assert_eq!(empty.current_streak, 0);
    assert_eq!(empty.longest_streak, 0);
}

#[test]
fn deactivation_changes_scores_only_on_recalculation() {
    let dir = tempdir().expect("temp dir");
    let (engine, pool, _clock) = setup_engine(&dir);

    let user_id = seed_user(&pool, "jamie");
    let habit_a = seed_habit(&pool, &user_id, "Meditate");
    let habit_b = seed_habit(&pool, &user_id, "Stretch");

    toggle_completion(&engine, &pool, &user_id, &habit_a, "2025-06-01", true);

    let before = engine
        .fetch_scores(&user_id, "2025-06-01", "2025-06-01")
        .expect("scores before");
    assert_eq!(before[0].total_habits, 2);
    assert!((before[0].percentage - 50.0).abs() < 0.001);

    pool.with_connection(|conn| HabitRepository::set_active(conn, &habit_b, false))
        .expect("deactivate habit");

    // Historical rows keep their snapshot until explicitly recalculated.
    let untouched = engine
        .fetch_scores(&user_id, "2025-06-01", "2025-06-01")
        .expect("scores after deactivation");
    assert_eq!(untouched[0].total_habits, 2);

    let repaired = engine
        .recalculate_range(&user_id, "2025-06-01", "2025-06-01")
        .expect("recalculate");
    assert_eq!(repaired[0].total_habits, 1);
    assert!((repaired[0].percentage - 100.0).abs() < 0.001);
    assert_eq!(repaired[0].created_at, untouched[0].created_at);
}

#[test]
fn completion_rates_and_calendar_reads() {
    let dir = tempdir().expect("temp dir");
    let (engine, pool, _clock) = setup_engine(&dir);

    let user_id = seed_user(&pool, "rowan");
    let habit = seed_habit(&pool, &user_id, "Hydrate");

    for day in ["2025-06-01", "2025-06-02", "2025-06-03"] {
        toggle_completion(&engine, &pool, &user_id, &habit, day, true);
    }

    let rate = engine
        .fetch_habit_completion_rate(&user_id, &habit, "2025-06-01", "2025-06-10")
        .expect("completion rate");
    assert_eq!(rate.completed_days, 3);
    assert_eq!(rate.total_days, 10);
    assert!((rate.rate - 30.0).abs() < 0.001);

    let monthly = engine
        .fetch_monthly_completion_rates(&user_id, 2025, 6)
        .expect("monthly rates");
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].completed_days, 3);
    assert_eq!(monthly[0].total_days, 30);
    assert_eq!(monthly[0].completion_rate, 10);

    let completions = engine
        .fetch_completions(&user_id, "2025-06-01", "2025-06-30")
        .expect("completions range");
    assert_eq!(completions.len(), 3);
    assert_eq!(completions[0].completion_date, "2025-06-01");

    let for_habit = engine
        .fetch_habit_completions(&user_id, &habit, "2025-06-02", "2025-06-03")
        .expect("habit completions");
    assert_eq!(for_habit.len(), 2);
}

#[test]
fn malformed_ranges_fail_before_touching_storage() {
    let dir = tempdir().expect("temp dir");
    let (engine, pool, _clock) = setup_engine(&dir);
    let user_id = seed_user(&pool, "sam");

    assert!(engine
        .fetch_stats(&user_id, "2025-06-10", "2025-06-01")
        .is_err());
    assert!(engine
        .fetch_scores(&user_id, "not-a-date", "2025-06-01")
        .is_err());
    assert!(engine
        .recalculate_range(&user_id, "2025-06-10", "2025-06-01")
        .is_err());
}
