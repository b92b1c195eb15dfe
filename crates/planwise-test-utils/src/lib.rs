//! Shared test utilities for planwise integration tests.
//!
//! Every test gets a private, freshly migrated database inside one shared
//! PostgreSQL server:
//! - **`PLANWISE_TEST_PG_URL`** set (CI service container or a local
//!   server): used as-is. The URL must point at the server root, without a
//!   database name.
//! - **No env var**: a container is started through testcontainers, once per
//!   test binary.
//!
//! [`fakes`] holds in-memory stand-ins for the completion provider and the
//! plan store, for tests that do not need a database.

pub mod fakes;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use planwise_db::pool;

struct SharedServer {
    base_url: String,
    /// Keeps the container alive; `None` for an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_SERVER: OnceCell<SharedServer> = OnceCell::const_new();

async fn start_shared_server() -> SharedServer {
    if let Ok(url) = std::env::var("PLANWISE_TEST_PG_URL") {
        return SharedServer {
            base_url: url.trim_end_matches('/').to_string(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");
    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedServer {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server root URL of the shared PostgreSQL (no database name appended).
pub async fn pg_url() -> &'static str {
    &SHARED_SERVER.get_or_init(start_shared_server).await.base_url
}

async fn maintenance_pool() -> PgPool {
    let url = format!("{}/postgres", pg_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .expect("failed to connect to maintenance database")
}

/// A uniquely named database that lives for the duration of one test.
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl TestDb {
    /// Create an empty database without applying migrations.
    pub async fn create_unmigrated() -> Self {
        let name = format!("planwise_test_{}", Uuid::new_v4().simple());
        let maint = maintenance_pool().await;
        maint
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create temp database {name}: {e}"));
        maint.close().await;

        let url = format!("{}/{name}", pg_url().await);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await
            .unwrap_or_else(|e| panic!("failed to connect to temp database {name}: {e}"));

        Self { pool, name }
    }

    /// Create a database with the embedded migrations applied.
    pub async fn create() -> Self {
        let db = Self::create_unmigrated().await;
        pool::run_migrations(&db.pool)
            .await
            .expect("migrations should succeed");
        db
    }

    /// Connection URL of this database.
    pub async fn url(&self) -> String {
        format!("{}/{}", pg_url().await, self.name)
    }

    /// Close the pool and drop the database, terminating stray connections.
    pub async fn cleanup(self) {
        self.pool.close().await;

        let maint = maintenance_pool().await;
        let terminate = format!(
            "SELECT pg_terminate_backend(pid) \
             FROM pg_stat_activity \
             WHERE datname = '{}' AND pid <> pg_backend_pid()",
            self.name
        );
        let _ = maint.execute(terminate.as_str()).await;
        let _ = maint
            .execute(format!("DROP DATABASE IF EXISTS {}", self.name).as_str())
            .await;
        maint.close().await;
    }
}
