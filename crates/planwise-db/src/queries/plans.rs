//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use sqlx::{FromRow, PgPool, Row};
use tracing::debug;

use crate::models::{Plan, PlanListing, SkippedRow};
use crate::task_list;

/// Number of plans returned by the listing endpoint.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Insert a new plan row stamped with the server clock. Returns the
/// generated id.
pub async fn insert_plan(
    pool: &PgPool,
    goal: &str,
    tasks: &[String],
    feedback: &str,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO plans (goal, tasks, feedback, created_at) \
         VALUES ($1, $2, $3, now()) \
         RETURNING id::int8",
    )
    .bind(goal)
    .bind(task_list::encode(tasks))
    .bind(feedback)
    .fetch_one(pool)
    .await
    .context("failed to insert plan")?;

    Ok(id)
}

/// List up to `limit` active plans, newest first.
///
/// Rows are decoded individually. A row that fails to decode does not fail
/// the listing; it is reported in [`PlanListing::skipped`].
///
/// `id` and `created_at` are cast so tables created with `SERIAL` ids or
/// zone-less timestamps still decode.
pub async fn list_recent_plans(pool: &PgPool, limit: i64) -> Result<PlanListing> {
    let rows = sqlx::query(
        "SELECT id::int8 AS id, goal, tasks, feedback, created_at::timestamptz AS created_at \
         FROM plans \
         WHERE deleted_at IS NULL \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to list plans")?;

    let mut listing = PlanListing {
        plans: Vec::with_capacity(rows.len()),
        skipped: Vec::new(),
    };
    for row in &rows {
        match Plan::from_row(row) {
            Ok(plan) => listing.plans.push(plan),
            Err(e) => {
                let id = row.try_get::<i64, _>("id").ok();
                debug!(?id, error = %e, "skipping undecodable plan row");
                listing.skipped.push(SkippedRow {
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(listing)
}
