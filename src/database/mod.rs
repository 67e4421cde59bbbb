//! # Database Connection
//!
//! Builds the SQLite pool a [`TestEntityManager`](crate::TestEntityManager) draws
//! its sessions from.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use test_entity_manager::config::TestDatabaseConfig;
//! use test_entity_manager::database::DatabaseConnection;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::connect(&TestDatabaseConfig::in_memory()).await?;
//! db.apply_schema("CREATE TABLE book (id TEXT PRIMARY KEY, title TEXT)").await?;
//! assert!(db.health_check().await?);
//! # Ok(())
//! # }
//! ```

pub mod connection;

pub use connection::DatabaseConnection;
