#![allow(clippy::doc_markdown)] // Allow technical terms like SQLite, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Test Entity Manager
//!
//! Application-managed entity manager for SQLx-backed test fixtures.
//!
//! ## Overview
//!
//! Setting up and tearing down rows in a test usually means opening a
//! transaction, running a statement, committing and releasing the connection,
//! again and again. [`TestEntityManager`] folds that into one call per operation:
//! every method opens a [`Session`], begins a transaction, does its work, commits
//! and closes the session before it returns, on success and on failure alike.
//!
//! ## Key Features
//!
//! - **Entity Mapping**: rows decode through `sqlx::FromRow`, columns encode through `sqlx::Encode`
//! - **One Call, One Transaction**: persist, merge, remove, find, queries, bulk updates
//! - **Named Parameters**: `:name` placeholders, list values expand for `IN`
//! - **Errors Untouched**: engine failures surface as the untouched `sqlx::Error`
//! - **Embedded Database**: private in-memory SQLite per test
//!
//! ## Module Organization
//!
//! - [`manager`] - The transaction-per-call entity manager
//! - [`session`] - One transaction and the operations that run in it
//! - [`entity`] - Entity mapping trait
//! - [`query`] - Object queries, native queries and update statements
//! - [`database`] - Pool construction from configuration
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging
//! - [`test_helpers`] - Fixture database setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlx::FromRow;
//! use test_entity_manager::entity::{Columns, Entity};
//! use test_entity_manager::test_helpers::{random_id, setup_test_entity_manager};
//!
//! #[derive(Debug, Clone, PartialEq, FromRow)]
//! struct Book {
//!     id: String,
//!     title: String,
//! }
//!
//! impl Entity for Book {
//!     type Id = String;
//!     const TABLE: &'static str = "book";
//!
//!     fn id(&self) -> Option<String> {
//!         Some(self.id.clone())
//!     }
//!
//!     fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
//!         columns.bind("id", &self.id).bind("title", &self.title);
//!     }
//! }
//!
//! # async fn example() -> test_entity_manager::Result<()> {
//! let tem = setup_test_entity_manager("CREATE TABLE book (id TEXT PRIMARY KEY, title TEXT)").await;
//!
//! let book = Book { id: random_id(), title: "test".to_string() };
//! let id = tem.persist_and_get_id(&book).await?;
//!
//! let found = tem.find::<Book>(&id).await?;
//! assert_eq!(found, Some(book));
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod logging;
pub mod manager;
pub mod query;
pub mod session;
pub mod test_helpers;

pub use config::TestDatabaseConfig;
pub use database::DatabaseConnection;
pub use entity::{Columns, Entity};
pub use error::{EntityManagerError, Result};
pub use manager::TestEntityManager;
pub use query::{
    NamedParameters, NativeQuery, Pagination, ParameterValue, TypedQuery, UpdateStatement,
};
pub use session::Session;
