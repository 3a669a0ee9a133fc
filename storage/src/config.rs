use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::StorageError;
use crate::retry::retry_with_backoff;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub url: String,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn from_cli_or_env(cli_arg: Option<String>) -> Self {
        let url = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("DATABASE_URL") {
            env
        } else {
            ":memory:".to_string()
        };

        // every pooled connection to :memory: would get its own database
        let max_connections = if url == ":memory:" { 1 } else { 5 };
        Self {
            url,
            max_connections,
        }
    }

    /// A private in-memory database. Capped to a single connection so every
    /// query sees the same memory-backed file.
    pub fn in_memory() -> Self {
        Self {
            url: ":memory:".to_string(),
            max_connections: 1,
        }
    }

    pub async fn create_pool(&self) -> Result<SqlitePool, StorageError> {
        let url = self.url.clone();
        let max_connections = self.max_connections;

        retry_with_backoff(
            move || {
                let url = url.clone();
                Box::pin(async move {
                    let options = SqliteConnectOptions::new()
                        .filename(&url)
                        .create_if_missing(true)
                        .foreign_keys(true);
                    SqlitePoolOptions::new()
                        .max_connections(max_connections)
                        .connect_with(options)
                        .await
                })
            },
            2,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))
    }
}
