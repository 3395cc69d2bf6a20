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

fn setup_engine(dir: &tempfile::TempDir) -> (ScoringEngine, DbPool) {
    let db_path = dir.path().join("leaderboard.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0)
            .single()
            .expect("clock time"),
    ));
    let engine = ScoringEngine::with_clock(pool.clone(), clock);
    (engine, pool)
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

fn seed_habits(pool: &DbPool, user_id: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|index| {
            pool.with_connection(|conn| {
                HabitRepository::insert(
                    conn,
                    &HabitCreateInput {
                        user_id: user_id.into(),
                        name: format!("habit-{index}"),
                        color: None,
                    },
                )
            })
            .expect("insert habit")
            .id
        })
        .collect()
}

fn complete_day(engine: &ScoringEngine, pool: &DbPool, user_id: &str, habits: &[String], date: &str) {
    for habit_id in habits {
        pool.with_connection(|conn| {
            CompletionRepository::upsert_completion(
                conn,
                &CompletionUpsert {
                    user_id: user_id.into(),
                    habit_id: habit_id.into(),
                    completion_date: date.into(),
                    completed: true,
                    notes: None,
                },
            )
        })
        .expect("upsert completion");
    }
    engine
        .record_completion_change(user_id, date)
        .expect("record completion change");
}

#[test]
fn ranks_users_by_monthly_score_with_zero_row_users_last() {
    let dir = tempdir().expect("temp dir");
    let (engine, pool) = setup_engine(&dir);

    let user_x = seed_user(&pool, "xavier");
    let user_y = seed_user(&pool, "yuki");
    let user_z = seed_user(&pool, "zoe");

    // X: one habit, five perfect days in June -> 500.
    let habits_x = seed_habits(&pool, &user_x, 1);
    for day in [
        "2025-06-01",
        "2025-06-02",
        "2025-06-03",
        "2025-06-04",
        "2025-06-05",
    ] {
        complete_day(&engine, &pool, &user_x, &habits_x, day);
    }

    // Y: three habits, three perfect days -> 900.
    let habits_y = seed_habits(&pool, &user_y, 3);
    for day in ["2025-06-01", "2025-06-02", "2025-06-03"] {
        complete_day(&engine, &pool, &user_y, &habits_y, day);
    }

    // Z stays registered with no score rows at all.
    let users = pool
        .with_connection(UserRepository::list_all)
        .expect("list users");
    assert_eq!(users.len(), 3);

    let leaderboard = engine.fetch_leaderboard().expect("fetch leaderboard");
    assert_eq!(leaderboard.len(), 3);

    assert_eq!(leaderboard[0].user_id, user_y);
    assert_eq!(leaderboard[0].score, 900);
    assert_eq!(leaderboard[0].rank, 1);

    assert_eq!(leaderboard[1].user_id, user_x);
    assert_eq!(leaderboard[1].score, 500);
    assert_eq!(leaderboard[1].rank, 2);

    assert_eq!(leaderboard[2].user_id, user_z);
    assert_eq!(leaderboard[2].score, 0);
    assert_eq!(leaderboard[2].rank, 3);
    assert_eq!(leaderboard[2].username, "zoe");
}

#[test]
fn only_the_current_month_counts() {
    let dir = tempdir().expect("temp dir");
    let (engine, pool) = setup_engine(&dir);

    let user_id = seed_user(&pool, "harper");
    let habits = seed_habits(&pool, &user_id, 1);

    // May scores sit outside the June window the pinned clock selects.
    complete_day(&engine, &pool, &user_id, &habits, "2025-05-31");
    complete_day(&engine, &pool, &user_id, &habits, "2025-06-10");
    complete_day(&engine, &pool, &user_id, &habits, "2025-07-01");

    let leaderboard = engine.fetch_leaderboard().expect("fetch leaderboard");
    assert_eq!(leaderboard.len(), 1);
    assert_eq!(leaderboard[0].score, 100);
}

#[test]
fn equal_totals_rank_deterministically_by_user_id() {
    let dir = tempdir().expect("temp dir");
    let (engine, pool) = setup_engine(&dir);

    let user_a = seed_user(&pool, "alex");
    let user_b = seed_user(&pool, "blair");

    for user_id in [&user_a, &user_b] {
        let habits = seed_habits(&pool, user_id, 1);
        complete_day(&engine, &pool, user_id, &habits, "2025-06-05");
    }

    let first = engine.fetch_leaderboard().expect("first fetch");
    let second = engine.fetch_leaderboard().expect("second fetch");

    assert_eq!(first[0].score, first[1].score);
    assert!(first[0].user_id < first[1].user_id);
    assert_eq!(
        first.iter().map(|e| e.user_id.clone()).collect::<Vec<_>>(),
        second.iter().map(|e| e.user_id.clone()).collect::<Vec<_>>()
    );
}
