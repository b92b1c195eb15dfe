//! Plan persistence seam.
//!
//! Handlers depend on [`PlanStore`] rather than on a pool directly, so the
//! request pipeline can run against an in-memory store in tests.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use planwise_db::models::PlanListing;
use planwise_db::queries::plans as plan_queries;

/// A storage operation failed.
#[derive(Debug, Error)]
#[error("{0:#}")]
pub struct StoreError(#[from] anyhow::Error);

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persist a plan and return its id.
    async fn insert_plan(
        &self,
        goal: &str,
        tasks: &[String],
        feedback: &str,
    ) -> Result<i64, StoreError>;

    /// Up to `limit` active plans, newest first.
    async fn list_recent_plans(&self, limit: i64) -> Result<PlanListing, StoreError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn PlanStore) {}
};

/// [`PlanStore`] backed by the PostgreSQL `plans` table.
#[derive(Debug, Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn insert_plan(
        &self,
        goal: &str,
        tasks: &[String],
        feedback: &str,
    ) -> Result<i64, StoreError> {
        Ok(plan_queries::insert_plan(&self.pool, goal, tasks, feedback).await?)
    }

    async fn list_recent_plans(&self, limit: i64) -> Result<PlanListing, StoreError> {
        Ok(plan_queries::list_recent_plans(&self.pool, limit).await?)
    }
}
