//! # Test Database Configuration
//!
//! Settings for the SQLite pool a [`TestEntityManager`](crate::TestEntityManager)
//! draws its sessions from. Values come from an optional configuration file and
//! `TEM_`-prefixed environment variables, layered over the defaults below.
//!
//! ```rust,no_run
//! use test_entity_manager::config::TestDatabaseConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // TEM_DATABASE_URL=sqlite://target/fixtures.db TEM_MAX_CONNECTIONS=4
//! let config = TestDatabaseConfig::load()?;
//! println!("connecting to {}", config.database_url);
//! # Ok(())
//! # }
//! ```

use crate::error::{EntityManagerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `TEM_DATABASE_URL`.
pub const ENV_PREFIX: &str = "TEM";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TestDatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_ms: u64,
    pub create_if_missing: bool,
    pub foreign_keys: bool,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_ms: 5000,
            create_if_missing: true,
            foreign_keys: true,
        }
    }
}

impl TestDatabaseConfig {
    /// Load from `TEM_*` environment variables over the defaults
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from an optional file (format inferred from its extension), then
    /// `TEM_*` environment variables, over the defaults
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: TestDatabaseConfig = settings.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            database_url = %config.database_url,
            max_connections = config.max_connections,
            "Test database configuration loaded"
        );

        Ok(config)
    }

    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Configuration for the database at `url`, other settings defaulted
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            database_url: url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(EntityManagerError::Configuration(
                "database_url must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(EntityManagerError::Configuration(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(EntityManagerError::Configuration(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    /// Whether every connection would open its own private database.
    ///
    /// Named shared-cache databases (`mode=memory&cache=shared`) are visible to
    /// all connections of the process and do not count.
    pub fn is_in_memory(&self) -> bool {
        let url = self.database_url.as_str();
        let shared = url.contains("cache=shared");
        !shared && (url == "sqlite::memory:" || url.contains(":memory:") || url.contains("mode=memory"))
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}
