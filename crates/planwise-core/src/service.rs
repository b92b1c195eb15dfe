//! Request pipelines: prompt construction, the completion call, and the
//! storage side effects that follow it.
//!
//! Degraded outcomes are returned as values ([`Persistence::Failed`],
//! [`PlanListing::skipped`]) so callers decide how to report them.

use std::sync::Arc;

use tracing::{debug, error};

use planwise_db::models::PlanListing;
use planwise_db::queries::plans::DEFAULT_LIST_LIMIT;

use crate::completion::{CompletionClient, CompletionError};
use crate::prompt;
use crate::store::{PlanStore, StoreError};

/// What happened to the best-effort write that follows a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Saved(i64),
    Failed(String),
}

/// Result of analysing a plan.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub suggestions: String,
    pub persistence: Persistence,
}

/// Shared, stateless entry point for the three request pipelines.
#[derive(Clone)]
pub struct PlanService {
    completions: Arc<dyn CompletionClient>,
    store: Arc<dyn PlanStore>,
    list_limit: i64,
}

impl PlanService {
    pub fn new(completions: Arc<dyn CompletionClient>, store: Arc<dyn PlanStore>) -> Self {
        Self {
            completions,
            store,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Override how many plans [`Self::recent_plans`] returns.
    pub fn with_list_limit(mut self, limit: i64) -> Self {
        self.list_limit = limit;
        self
    }

    /// Ask for suggestions on a plan, then try to persist it.
    ///
    /// Only the completion call can fail the operation. A storage failure is
    /// reported through [`AnalyzeOutcome::persistence`].
    pub async fn analyze(
        &self,
        title: &str,
        steps: &[String],
    ) -> Result<AnalyzeOutcome, CompletionError> {
        let user_prompt = prompt::build_analyze_prompt(title, steps);
        let suggestions = self
            .completions
            .complete(prompt::ANALYZE_SYSTEM_PROMPT, &user_prompt)
            .await
            .inspect_err(|e| error!(error = %e, "plan analysis failed"))?;

        let persistence = match self.store.insert_plan(title, steps, &suggestions).await {
            Ok(id) => {
                debug!(id, "plan saved");
                Persistence::Saved(id)
            }
            Err(e) => Persistence::Failed(e.to_string()),
        };

        Ok(AnalyzeOutcome {
            suggestions,
            persistence,
        })
    }

    /// Ask for a bullet-point summary of an uploaded document. Nothing is
    /// persisted.
    pub async fn summarize(&self, document_text: &str) -> Result<String, CompletionError> {
        let user_prompt = prompt::build_upload_prompt(document_text);
        self.completions
            .complete(prompt::UPLOAD_SYSTEM_PROMPT, &user_prompt)
            .await
            .inspect_err(|e| error!(error = %e, "document summary failed"))
    }

    /// The most recent active plans.
    pub async fn recent_plans(&self) -> Result<PlanListing, StoreError> {
        self.store
            .list_recent_plans(self.list_limit)
            .await
            .inspect_err(|e| error!(error = %e, "listing plans failed"))
    }
}
