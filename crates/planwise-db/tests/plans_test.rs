//! Integration tests for inserting and listing plans.
//!
//! Each test runs in its own temporary database provided by
//! `planwise-test-utils`.

use sqlx::PgPool;

use planwise_db::pool;
use planwise_db::queries::plans::{self, DEFAULT_LIST_LIMIT};
use planwise_test_utils::TestDb;

fn steps(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Insert a row with an explicit creation time, bypassing `insert_plan`.
async fn insert_at(pool: &PgPool, goal: &str, tasks: &str, minutes_ago: i32) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO plans (goal, tasks, feedback, created_at) \
         VALUES ($1, $2, 'feedback', now() - make_interval(mins => $3)) \
         RETURNING id",
    )
    .bind(goal)
    .bind(tasks)
    .bind(minutes_ago)
    .fetch_one(pool)
    .await
    .expect("raw insert should succeed")
}

#[tokio::test]
async fn insert_and_list_round_trip() {
    let db = TestDb::create().await;

    let tasks = steps(&["Plan meals", "Exercise"]);
    let id = plans::insert_plan(&db.pool, "Week 1", &tasks, "1. Sleep more")
        .await
        .expect("insert_plan should succeed");
    assert!(id > 0);

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .expect("list should succeed");
    assert!(!listing.is_partial());
    assert_eq!(listing.plans.len(), 1);

    let plan = &listing.plans[0];
    assert_eq!(plan.id, id);
    assert_eq!(plan.goal, "Week 1");
    assert_eq!(plan.tasks, tasks);
    assert_eq!(plan.feedback, "1. Sleep more");

    db.cleanup().await;
}

#[tokio::test]
async fn ids_increase_with_each_insert() {
    let db = TestDb::create().await;

    let first = plans::insert_plan(&db.pool, "a", &[], "f").await.unwrap();
    let second = plans::insert_plan(&db.pool, "b", &[], "f").await.unwrap();
    assert!(second > first);

    db.cleanup().await;
}

#[tokio::test]
async fn steps_with_commas_round_trip() {
    let db = TestDb::create().await;

    let tasks = steps(&["Buy eggs, milk, bread", "Call mom"]);
    plans::insert_plan(&db.pool, "Errands", &tasks, "ok")
        .await
        .unwrap();

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing.plans[0].tasks, tasks);

    db.cleanup().await;
}

#[tokio::test]
async fn empty_steps_list_comes_back_empty() {
    let db = TestDb::create().await;

    plans::insert_plan(&db.pool, "Nothing yet", &[], "start small")
        .await
        .unwrap();
    insert_at(&db.pool, "legacy empty", "", 5).await;

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing.plans.len(), 2);
    for plan in &listing.plans {
        assert!(plan.tasks.is_empty(), "{} should have no tasks", plan.goal);
    }

    db.cleanup().await;
}

#[tokio::test]
async fn legacy_comma_joined_rows_are_split() {
    let db = TestDb::create().await;

    insert_at(&db.pool, "Legacy", "Plan meals,Exercise", 1).await;

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing.plans[0].tasks, steps(&["Plan meals", "Exercise"]));

    db.cleanup().await;
}

#[tokio::test]
async fn list_is_newest_first_and_capped() {
    let db = TestDb::create().await;

    for i in 0..25 {
        insert_at(&db.pool, &format!("plan-{i}"), "[]", 100 - i).await;
    }

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing.plans.len(), 20);
    assert_eq!(listing.plans[0].goal, "plan-24");
    assert_eq!(listing.plans[19].goal, "plan-5");
    for pair in listing.plans.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "plans must be ordered newest first"
        );
    }

    let three = plans::list_recent_plans(&db.pool, 3).await.unwrap();
    assert_eq!(three.plans.len(), 3);

    db.cleanup().await;
}

#[tokio::test]
async fn soft_deleted_rows_are_excluded() {
    let db = TestDb::create().await;

    let kept = insert_at(&db.pool, "kept", "[]", 2).await;
    let gone = insert_at(&db.pool, "gone", "[]", 1).await;
    sqlx::query("UPDATE plans SET deleted_at = now() WHERE id = $1")
        .bind(gone)
        .execute(&db.pool)
        .await
        .unwrap();

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .unwrap();
    let ids: Vec<i64> = listing.plans.iter().map(|p| p.id).collect();
    assert_eq!(ids, [kept]);

    db.cleanup().await;
}

#[tokio::test]
async fn undecodable_rows_are_reported_not_fatal() {
    let db = TestDb::create().await;

    // A table inherited from an older deployment may allow NULLs.
    sqlx::query("ALTER TABLE plans ALTER COLUMN feedback DROP NOT NULL")
        .execute(&db.pool)
        .await
        .unwrap();
    let good = insert_at(&db.pool, "good", "[\"a\"]", 2).await;
    let bad: i64 = sqlx::query_scalar(
        "INSERT INTO plans (goal, tasks, feedback) VALUES ('bad', '[]', NULL) RETURNING id",
    )
    .fetch_one(&db.pool)
    .await
    .unwrap();

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .expect("a bad row must not fail the listing");
    assert_eq!(listing.plans.len(), 1);
    assert_eq!(listing.plans[0].id, good);
    assert!(listing.is_partial());
    assert_eq!(listing.skipped.len(), 1);
    assert_eq!(listing.skipped[0].id, Some(bad));
    assert!(!listing.skipped[0].reason.is_empty());

    db.cleanup().await;
}

#[tokio::test]
async fn list_on_empty_table_is_empty() {
    let db = TestDb::create().await;

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .unwrap();
    assert!(listing.plans.is_empty());
    assert!(listing.skipped.is_empty());

    db.cleanup().await;
}

#[tokio::test]
async fn rows_in_table_with_int4_ids_and_zoneless_timestamps_are_listed() {
    let db = TestDb::create_unmigrated().await;

    sqlx::query(
        "CREATE TABLE plans ( \
             id SERIAL PRIMARY KEY, \
             goal TEXT NOT NULL, \
             tasks TEXT NOT NULL DEFAULT '', \
             feedback TEXT NOT NULL, \
             created_at TIMESTAMP NOT NULL DEFAULT now(), \
             deleted_at TIMESTAMP)",
    )
    .execute(&db.pool)
    .await
    .expect("older table should be created");
    sqlx::query("INSERT INTO plans (goal, tasks, feedback) VALUES ('old', 'a,b', 'fb')")
        .execute(&db.pool)
        .await
        .expect("older row should insert");
    pool::run_migrations(&db.pool)
        .await
        .expect("migrations should leave the older table in place");

    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .expect("list should succeed");
    assert!(listing.skipped.is_empty(), "skipped: {:?}", listing.skipped);
    assert_eq!(listing.plans.len(), 1);
    assert_eq!(listing.plans[0].goal, "old");
    assert_eq!(listing.plans[0].tasks, steps(&["a", "b"]));

    plans::insert_plan(&db.pool, "new", &steps(&["c"]), "fb2")
        .await
        .expect("insert into older table should succeed");
    let listing = plans::list_recent_plans(&db.pool, DEFAULT_LIST_LIMIT)
        .await
        .unwrap();
    assert_eq!(listing.plans.len(), 2);
    assert_eq!(listing.plans[0].goal, "new");

    db.cleanup().await;
}

#[tokio::test]
async fn insert_fails_once_pool_is_closed() {
    let db = TestDb::create().await;

    db.pool.close().await;
    let result = plans::insert_plan(&db.pool, "late", &[], "f").await;
    assert!(result.is_err());

    db.cleanup().await;
}
