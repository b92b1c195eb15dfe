//! PostgreSQL storage for persisted plans.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
pub mod task_list;
