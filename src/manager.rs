//! # Test Entity Manager
//!
//! Application-managed entity manager for use in tests.
//!
//! Every method runs in a transaction of its own: open a session, begin, do the
//! work, commit, close. Nothing is rolled back after the test, so fixtures are
//! expected to clean up after themselves or to run against a per-test database
//! such as the in-memory pools from [`test_helpers`](crate::test_helpers).
//!
//! ```rust,no_run
//! # use test_entity_manager::entity::Columns;
//! # use test_entity_manager::{Entity, TestEntityManager};
//! # #[derive(Debug, sqlx::FromRow)]
//! # struct Book { id: String, title: String }
//! # impl Entity for Book {
//! #     type Id = String;
//! #     const TABLE: &'static str = "book";
//! #     fn id(&self) -> Option<String> { Some(self.id.clone()) }
//! #     fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
//! #         columns.bind("id", &self.id).bind("title", &self.title);
//! #     }
//! # }
//! # async fn example(tem: &TestEntityManager) -> test_entity_manager::Result<()> {
//! let book = Book { id: "b-1".to_string(), title: "test".to_string() };
//! tem.persist(&[book]).await?;
//!
//! let found = tem.find::<Book>(&"b-1".to_string()).await?;
//! assert!(found.is_some());
//!
//! let deleted = tem
//!     .execute_update(|session| {
//!         session
//!             .create_delete::<Book>("id IN :ids")
//!             .set_parameter("ids", vec!["b-1"])
//!     })
//!     .await?;
//! assert_eq!(deleted, 1);
//! # Ok(())
//! # }
//! ```

use crate::config::TestDatabaseConfig;
use crate::database::DatabaseConnection;
use crate::entity::Entity;
use crate::error::{EntityManagerError, Result};
use crate::logging::log_database_operation;
use crate::query::{NativeQuery, TypedQuery, UpdateStatement};
use crate::session::Session;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::FromRow;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TestEntityManager {
    pool: SqlitePool,
}

impl TestEntityManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Build the pool described by `config` and manage entities on it
    pub async fn connect(config: &TestDatabaseConfig) -> Result<Self> {
        let connection = DatabaseConnection::connect(config).await?;
        Ok(Self::new(connection.into_pool()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn open_session(&self) -> Result<Session> {
        Session::begin(&self.pool).await
    }

    /// Persist one entity and return its key after commit
    pub async fn persist_and_get_id<E: Entity>(&self, entity: &E) -> Result<E::Id> {
        let started = Instant::now();
        let result: Result<E::Id> = async {
            let mut session = self.open_session().await?;
            let id = session.persist(entity).await?;
            session.commit().await?;
            Ok(id)
        }
        .await;

        finish("persist_and_get_id", Some(E::TABLE), started, result)
    }

    /// Persist all `entities` in one transaction
    pub async fn persist<E: Entity>(&self, entities: &[E]) -> Result<()> {
        if entities.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let result: Result<()> = async {
            let mut session = self.open_session().await?;
            for entity in entities {
                session.persist(entity).await?;
            }
            session.commit().await
        }
        .await;

        finish("persist", Some(E::TABLE), started, result)
    }

    /// Insert or overwrite all `entities` in one transaction, returning the
    /// rows as stored
    pub async fn merge<E: Entity>(&self, entities: &[E]) -> Result<Vec<E>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let result: Result<Vec<E>> = async {
            let mut session = self.open_session().await?;
            let mut merged = Vec::with_capacity(entities.len());
            for entity in entities {
                merged.push(session.merge(entity).await?);
            }
            session.commit().await?;
            Ok(merged)
        }
        .await;

        finish("merge", Some(E::TABLE), started, result)
    }

    /// Remove all `entities` in one transaction. Fails if any of them is not
    /// stored.
    pub async fn remove<E: Entity>(&self, entities: &[E]) -> Result<()> {
        let started = Instant::now();
        let result: Result<()> = async {
            let mut session = self.open_session().await?;
            for entity in entities {
                session.remove(entity).await?;
            }
            session.commit().await
        }
        .await;

        finish("remove", Some(E::TABLE), started, result)
    }

    pub async fn find<E: Entity>(&self, id: &E::Id) -> Result<Option<E>> {
        let started = Instant::now();
        let result: Result<Option<E>> = async {
            let mut session = self.open_session().await?;
            let found = session.find::<E>(id).await?;
            session.commit().await?;
            Ok(found)
        }
        .await;

        finish("find", Some(E::TABLE), started, result)
    }

    /// Run the object query `build` configures and return every row
    pub async fn query_list<E, F>(&self, build: F) -> Result<Vec<E>>
    where
        E: Entity,
        F: FnOnce(&Session) -> TypedQuery<E>,
    {
        let started = Instant::now();
        let result: Result<Vec<E>> = async {
            let mut session = self.open_session().await?;
            let query = build(&session);
            let rows = session.get_result_list(&query).await?;
            session.commit().await?;
            Ok(rows)
        }
        .await;

        finish("query_list", Some(E::TABLE), started, result)
    }

    /// Run the native query `build` configures and return every row
    pub async fn native_query_list<T, F>(&self, build: F) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        F: FnOnce(&Session) -> NativeQuery<T>,
    {
        let started = Instant::now();
        let result: Result<Vec<T>> = async {
            let mut session = self.open_session().await?;
            let query = build(&session);
            let rows = session.get_result_list(&query).await?;
            session.commit().await?;
            Ok(rows)
        }
        .await;

        finish("native_query_list", None, started, result)
    }

    /// Run the object query `build` configures; `None` when nothing matches
    pub async fn query_single<E, F>(&self, build: F) -> Result<Option<E>>
    where
        E: Entity,
        F: FnOnce(&Session) -> TypedQuery<E>,
    {
        let started = Instant::now();
        let result: Result<Option<E>> = async {
            let mut session = self.open_session().await?;
            let query = build(&session);
            let found = optional(session.get_single_result(&query).await)?;
            session.commit().await?;
            Ok(found)
        }
        .await;

        finish("query_single", Some(E::TABLE), started, result)
    }

    /// Run the native query `build` configures; `None` when nothing matches
    pub async fn native_query_single<T, F>(&self, build: F) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        F: FnOnce(&Session) -> NativeQuery<T>,
    {
        let started = Instant::now();
        let result: Result<Option<T>> = async {
            let mut session = self.open_session().await?;
            let query = build(&session);
            let found = optional(session.get_single_result(&query).await)?;
            session.commit().await?;
            Ok(found)
        }
        .await;

        finish("native_query_single", None, started, result)
    }

    /// Execute the bulk update/delete `build` configures and return the number
    /// of affected rows
    pub async fn execute_update<F>(&self, build: F) -> Result<u64>
    where
        F: FnOnce(&Session) -> UpdateStatement,
    {
        let started = Instant::now();
        let result: Result<u64> = async {
            let mut session = self.open_session().await?;
            let statement = build(&session);
            let affected = session.execute_update(&statement).await?;
            session.commit().await?;
            Ok(affected)
        }
        .await;

        finish("execute_update", None, started, result)
    }

    /// Run `work` inside one transaction, committing when it succeeds.
    ///
    /// ```rust,ignore
    /// let count = tem
    ///     .in_transaction(|session| {
    ///         Box::pin(async move {
    ///             session.persist(&book).await?;
    ///             session.execute_update(&UpdateStatement::native("DELETE FROM audit")).await
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn in_transaction<R, F>(&self, work: F) -> Result<R>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<R>>,
    {
        let started = Instant::now();
        let result: Result<R> = async {
            let mut session = self.open_session().await?;
            let value = work(&mut session).await?;
            session.commit().await?;
            Ok(value)
        }
        .await;

        finish("in_transaction", None, started, result)
    }
}

/// No result is an answer, not a failure
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(EntityManagerError::NoResult) => Ok(None),
        Err(error) => Err(error),
    }
}

fn finish<R>(operation: &str, table: Option<&str>, started: Instant, result: Result<R>) -> Result<R> {
    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => log_database_operation(operation, table, "committed", duration_ms, None),
        Err(error) => log_database_operation(
            operation,
            table,
            "failed",
            duration_ms,
            Some(&error.to_string()),
        ),
    }
    result
}
