//! # Session
//!
//! A session is one pooled connection holding one open transaction. It is the
//! unit every [`TestEntityManager`](crate::TestEntityManager) operation works
//! against: opened at the start of the call, committed and closed at its end.
//!
//! Dropping a session without [`Session::commit`] rolls the transaction back and
//! hands the connection back to the pool.

use crate::entity::{self, BoundSql, Entity};
use crate::error::{EntityManagerError, Result};
use crate::query::{NativeQuery, SelectQuery, TypedQuery, UpdateStatement};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{FromRow, Row, Transaction};
use std::time::Instant;

pub struct Session {
    transaction: Transaction<'static, Sqlite>,
    opened_at: Instant,
}

impl Session {
    /// Check a connection out of `pool` and begin a transaction on it
    pub(crate) async fn begin(pool: &SqlitePool) -> Result<Self> {
        let transaction = pool.begin().await?;
        tracing::trace!("Session opened");

        Ok(Self {
            transaction,
            opened_at: Instant::now(),
        })
    }

    /// Commit the transaction and release the connection
    pub async fn commit(self) -> Result<()> {
        let opened_at = self.opened_at;
        self.transaction.commit().await?;

        tracing::trace!(
            elapsed_ms = opened_at.elapsed().as_millis() as u64,
            "Session committed and closed"
        );
        Ok(())
    }

    /// The underlying connection, for sqlx calls the session has no helper for
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.transaction
    }

    /// Insert `entity` and return its key, as assigned by the database when
    /// the entity carried none
    pub async fn persist<E: Entity>(&mut self, entity: &E) -> Result<E::Id> {
        let BoundSql { sql, arguments } = entity::insert_sql(entity)?;
        tracing::trace!(sql = %sql, "persist");

        let row = sqlx::query_with::<Sqlite, _>(&sql, arguments)
            .fetch_one(&mut *self.transaction)
            .await?;

        Ok(row.try_get(0)?)
    }

    /// Insert `entity`, or overwrite the row with the same key
    pub async fn merge<E: Entity>(&mut self, entity: &E) -> Result<E> {
        let BoundSql { sql, arguments } = entity::merge_sql(entity)?;
        tracing::trace!(sql = %sql, "merge");

        let merged = sqlx::query_as_with::<Sqlite, E, _>(&sql, arguments)
            .fetch_one(&mut *self.transaction)
            .await?;

        Ok(merged)
    }

    /// Delete the row of `entity`; a missing row is an error
    pub async fn remove<E: Entity>(&mut self, entity: &E) -> Result<()> {
        let id = entity
            .id()
            .ok_or(EntityManagerError::MissingIdentifier { table: E::TABLE })?;
        let BoundSql { sql, arguments } = entity::delete_sql::<E>(&id)?;
        tracing::trace!(sql = %sql, "remove");

        let result = sqlx::query_with::<Sqlite, _>(&sql, arguments)
            .execute(&mut *self.transaction)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EntityManagerError::EntityNotFound {
                table: E::TABLE,
                id: format!("{id:?}"),
            });
        }
        Ok(())
    }

    pub async fn find<E: Entity>(&mut self, id: &E::Id) -> Result<Option<E>> {
        let BoundSql { sql, arguments } = entity::find_sql::<E>(id)?;
        tracing::trace!(sql = %sql, "find");

        let found = sqlx::query_as_with::<Sqlite, E, _>(&sql, arguments)
            .fetch_optional(&mut *self.transaction)
            .await?;

        Ok(found)
    }

    pub fn create_query<E: Entity>(&self, predicate: &str) -> TypedQuery<E> {
        TypedQuery::new(predicate)
    }

    pub fn create_native_query<T>(&self, sql: &str) -> NativeQuery<T>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        NativeQuery::new(sql)
    }

    pub fn create_statement(&self, sql: &str) -> UpdateStatement {
        UpdateStatement::native(sql)
    }

    pub fn create_delete<E: Entity>(&self, predicate: &str) -> UpdateStatement {
        UpdateStatement::delete::<E>(predicate)
    }

    pub fn create_update<E: Entity>(&self, assignments: &str, predicate: &str) -> UpdateStatement {
        UpdateStatement::update::<E>(assignments, predicate)
    }

    pub async fn get_result_list<Q: SelectQuery>(&mut self, query: &Q) -> Result<Vec<Q::Row>> {
        let rendered = query.render()?;
        tracing::trace!(sql = %rendered.sql, "query");

        let rows = sqlx::query_as_with::<Sqlite, Q::Row, _>(&rendered.sql, rendered.arguments()?)
            .fetch_all(&mut *self.transaction)
            .await?;

        Ok(rows)
    }

    /// Exactly one row, or [`EntityManagerError::NoResult`] /
    /// [`EntityManagerError::NonUniqueResult`]
    pub async fn get_single_result<Q: SelectQuery>(&mut self, query: &Q) -> Result<Q::Row> {
        let mut rows = self.get_result_list(query).await?;

        match rows.len() {
            0 => Err(EntityManagerError::NoResult),
            1 => Ok(rows.remove(0)),
            count => Err(EntityManagerError::NonUniqueResult { count }),
        }
    }

    pub async fn execute_update(&mut self, statement: &UpdateStatement) -> Result<u64> {
        let rendered = statement.render()?;
        tracing::trace!(sql = %rendered.sql, "execute_update");

        let result = sqlx::query_with::<Sqlite, _>(&rendered.sql, rendered.arguments()?)
            .execute(&mut *self.transaction)
            .await?;

        Ok(result.rows_affected())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("transaction", &"Transaction<Sqlite>")
            .field("opened_at", &self.opened_at)
            .finish()
    }
}
