//! Statement execution against the metadata database.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use common::config::{ConnectionTarget, DatabaseConfig};
use common::errors::{AppError, AppResult};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::rows::row_to_json;

/// Runs statements and returns their rows as JSON objects.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes one statement and collects every row it returns.
    async fn fetch_rows(&self, sql: &str) -> AppResult<Vec<Value>>;

    /// Releases the underlying connections.
    async fn close(&self);
}

/// Pool sizing knobs.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 1,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Builds connect options from the resolved configuration.
///
/// TLS is always requested but the server certificate is not verified.
pub fn connect_options(config: &DatabaseConfig) -> AppResult<PgConnectOptions> {
    let options = match &config.target {
        ConnectionTarget::Url(url) => {
            PgConnectOptions::from_str(url).map_err(|e| AppError::InvalidConfig {
                key: common::config::DATABASE_URL_VAR.to_string(),
                message: e.to_string(),
            })?
        }
        ConnectionTarget::Discrete {
            host,
            port,
            database,
            user,
            password,
        } => PgConnectOptions::new()
            .host(host)
            .port(*port)
            .database(database)
            .username(user)
            .password(password),
    };
    Ok(options.ssl_mode(PgSslMode::Require))
}

/// Postgres-backed executor.
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Establishes the pool. Failing to connect is fatal for the run.
    pub async fn connect(config: &DatabaseConfig, settings: PoolSettings) -> AppResult<Self> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        tracing::info!(target_db = %config.describe(), "Connection pool established");
        Ok(Self { pool })
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn fetch_rows(&self, sql: &str) -> AppResult<Vec<Value>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Connection pool closed");
    }
}
