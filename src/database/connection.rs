use crate::config::TestDatabaseConfig;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    pub async fn connect(config: &TestDatabaseConfig) -> Result<Self> {
        config.validate()?;

        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(config.foreign_keys);

        let pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout());

        // A private in-memory database lives and dies with its connection, so
        // the pool keeps exactly one and never recycles it.
        let pool_options = if config.is_in_memory() {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        tracing::debug!(
            database_url = %config.database_url,
            in_memory = config.is_in_memory(),
            "Test database pool connected"
        );

        Ok(Self { pool })
    }

    /// Private in-memory database
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&TestDatabaseConfig::in_memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn into_pool(self) -> SqlitePool {
        self.pool
    }

    /// Run one or more `;`-separated DDL statements
    pub async fn apply_schema(&self, ddl: &str) -> Result<()> {
        sqlx::raw_sql(ddl).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.try_get("health")?;
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
