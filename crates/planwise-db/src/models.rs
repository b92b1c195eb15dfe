use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::task_list;

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A persisted improvement request: the submitted goal, its steps, and the
/// feedback generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub goal: String,
    pub tasks: Vec<String>,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Plan {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let raw_tasks: String = row.try_get("tasks")?;
        Ok(Self {
            id: row.try_get("id")?,
            goal: row.try_get("goal")?,
            tasks: task_list::decode(&raw_tasks),
            feedback: row.try_get("feedback")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// A row that matched the listing query but could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Row id, when the id column itself was readable.
    pub id: Option<i64>,
    pub reason: String,
}

/// Result of listing plans: every decodable row, plus a record of the rows
/// that were left out.
#[derive(Debug, Clone, Default)]
pub struct PlanListing {
    pub plans: Vec<Plan>,
    pub skipped: Vec<SkippedRow>,
}

impl PlanListing {
    /// `true` when at least one matching row was left out.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}
