//! Request pipelines behind the planwise HTTP API.
//!
//! ```text
//! handler --> PlanService --> prompt --> CompletionClient
//!                  |
//!                  +--> PlanStore (best-effort insert, recent listing)
//! ```

pub mod completion;
pub mod prompt;
pub mod service;
pub mod store;

pub use completion::{CompletionClient, CompletionError, OpenAiClient, OpenAiConfig};
pub use service::{AnalyzeOutcome, Persistence, PlanService};
pub use store::{PgPlanStore, PlanStore, StoreError};
