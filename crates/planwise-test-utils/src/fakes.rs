//! In-memory [`CompletionClient`] and [`PlanStore`] implementations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use planwise_core::{CompletionClient, CompletionError, PlanStore, StoreError};
use planwise_db::models::{Plan, PlanListing, SkippedRow};

/// One recorded call to [`FakeCompletions::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCall {
    pub system: String,
    pub user: String,
}

/// Completion client that answers every call the same way and records the
/// prompts it received.
pub struct FakeCompletions {
    reply: Result<String, (u16, String)>,
    calls: Mutex<Vec<CompletionCall>>,
}

impl FakeCompletions {
    /// Always succeed with `text`.
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Always fail as if the provider returned `status` with `body`.
    pub fn failing(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, body.to_string())),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletions {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(CompletionCall {
            system: system_instruction.to_string(),
            user: user_prompt.to_string(),
        });
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, body)) => Err(CompletionError::Status {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// Plan store kept in a `Vec`, with switches to simulate storage failures.
#[derive(Default)]
pub struct MemoryPlanStore {
    plans: Mutex<Vec<Plan>>,
    skipped: Mutex<Vec<SkippedRow>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryPlanStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent insert fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent listing fail.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Report `row` as undecodable in every listing.
    pub fn add_skipped(&self, row: SkippedRow) {
        self.skipped.lock().unwrap().push(row);
    }

    /// Everything inserted so far, oldest first.
    pub fn plans(&self) -> Vec<Plan> {
        self.plans.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn insert_plan(
        &self,
        goal: &str,
        tasks: &[String],
        feedback: &str,
    ) -> Result<i64, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("failed to insert plan: connection reset").into());
        }
        let mut plans = self.plans.lock().unwrap();
        let id = plans.len() as i64 + 1;
        plans.push(Plan {
            id,
            goal: goal.to_string(),
            tasks: tasks.to_vec(),
            feedback: feedback.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_recent_plans(&self, limit: i64) -> Result<PlanListing, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("failed to list plans: connection refused").into());
        }
        let plans = self.plans.lock().unwrap();
        Ok(PlanListing {
            plans: plans
                .iter()
                .rev()
                .take(usize::try_from(limit).unwrap_or(0))
                .cloned()
                .collect(),
            skipped: self.skipped.lock().unwrap().clone(),
        })
    }
}
