mod config;
mod error;
mod serve;
mod upload;

#[cfg(test)]
mod test_util;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use planwise_core::{OpenAiClient, PgPlanStore, PlanService};
use planwise_db::pool;

use config::{Cli, ServerConfig};
use serve::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::resolve(Cli::parse())?;

    tracing::info!(
        database = config.db_config.database_name().unwrap_or("<unknown>"),
        url = %config.db_config.redacted_url(),
        "connecting to database"
    );
    let db_pool = pool::create_pool(&config.db_config).await?;
    pool::ping(&db_pool).await?;
    pool::run_migrations(&db_pool).await?;

    tracing::info!(model = %config.openai.model, "using chat completion provider");
    let client =
        OpenAiClient::new(config.openai).context("failed to build completion client")?;
    let service = PlanService::new(
        Arc::new(client),
        Arc::new(PgPlanStore::new(db_pool.clone())),
    );

    let result = serve::run_serve(
        AppState::new(service, config.max_upload_bytes),
        &config.bind,
        config.port,
    )
    .await;

    db_pool.close().await;
    result
}
