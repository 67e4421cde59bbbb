//! # Entity Mapping
//!
//! An [`Entity`] is a record type stored one-per-row in a single table. Reading
//! goes through `sqlx::FromRow`. Writing goes through [`Entity::bind_columns`],
//! which hands each field to sqlx's own encoder, so whatever a row decodes from is
//! exactly what was written: a `Uuid` key is the same 16-byte blob both ways, a
//! `Vec<u8>` the same bytes.
//!
//! ```rust
//! use sqlx::FromRow;
//! use test_entity_manager::entity::{Columns, Entity};
//! use uuid::Uuid;
//!
//! #[derive(Debug, Clone, PartialEq, FromRow)]
//! pub struct Task {
//!     pub task_uuid: Uuid,
//!     pub name: String,
//!     pub context: Option<String>,
//! }
//!
//! impl Entity for Task {
//!     type Id = Uuid;
//!     const TABLE: &'static str = "task";
//!     const ID_COLUMN: &'static str = "task_uuid";
//!
//!     fn id(&self) -> Option<Uuid> {
//!         Some(self.task_uuid)
//!     }
//!
//!     fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
//!         columns
//!             .bind("task_uuid", &self.task_uuid)
//!             .bind("name", &self.name)
//!             .bind("context", &self.context);
//!     }
//! }
//! ```

use crate::error::{EntityManagerError, Result};
use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Arguments, Decode, Encode, FromRow, Type};
use std::fmt::Debug;

pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin {
    /// Identifying key, as stored in [`Entity::ID_COLUMN`]
    type Id: for<'q> Encode<'q, Sqlite>
        + for<'r> Decode<'r, Sqlite>
        + Type<Sqlite>
        + Clone
        + Debug
        + Send
        + Sync
        + Unpin;

    const TABLE: &'static str;

    const ID_COLUMN: &'static str = "id";

    /// The key, or `None` while the database has yet to assign one
    fn id(&self) -> Option<Self::Id>;

    /// Bind every stored column, the key column included
    fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>);
}

/// Column names and their encoded values, in binding order
pub struct Columns<'q> {
    skip: Option<&'static str>,
    names: Vec<&'static str>,
    arguments: SqliteArguments<'q>,
    error: Option<BoxDynError>,
}

impl<'q> Columns<'q> {
    fn new(skip: Option<&'static str>) -> Self {
        Self {
            skip,
            names: Vec::new(),
            arguments: SqliteArguments::default(),
            error: None,
        }
    }

    /// Bind `value` to column `name`
    pub fn bind<T>(&mut self, name: &'static str, value: T) -> &mut Self
    where
        T: 'q + Encode<'q, Sqlite> + Type<Sqlite>,
    {
        if self.error.is_some() || self.skip == Some(name) {
            return self;
        }

        match self.arguments.add(value) {
            Ok(()) => self.names.push(name),
            Err(error) => self.error = Some(error),
        }
        self
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

/// SQL with positional markers and its encoded arguments
pub(crate) struct BoundSql<'q> {
    pub sql: String,
    pub arguments: SqliteArguments<'q>,
}

/// `INSERT ... RETURNING <id>`; the key column is left to the database when
/// the entity has no key yet
pub(crate) fn insert_sql<'q, E: Entity>(entity: &'q E) -> Result<BoundSql<'q>> {
    let (names, arguments) = collect_columns(entity)?;

    let sql = if names.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            E::TABLE,
            E::ID_COLUMN
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            E::TABLE,
            names.join(", "),
            vec!["?"; names.len()].join(", "),
            E::ID_COLUMN
        )
    };

    Ok(BoundSql { sql, arguments })
}

/// Upsert keyed on the id column, returning the stored row
pub(crate) fn merge_sql<'q, E: Entity>(entity: &'q E) -> Result<BoundSql<'q>> {
    let (names, arguments) = collect_columns(entity)?;

    if names.is_empty() {
        return Ok(BoundSql {
            sql: format!("INSERT INTO {} DEFAULT VALUES RETURNING *", E::TABLE),
            arguments,
        });
    }

    let mut assignments: Vec<String> = names
        .iter()
        .filter(|name| **name != E::ID_COLUMN)
        .map(|name| format!("{name} = excluded.{name}"))
        .collect();
    if assignments.is_empty() {
        assignments.push(format!("{0} = excluded.{0}", E::ID_COLUMN));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {} RETURNING *",
        E::TABLE,
        names.join(", "),
        vec!["?"; names.len()].join(", "),
        E::ID_COLUMN,
        assignments.join(", ")
    );

    Ok(BoundSql { sql, arguments })
}

pub(crate) fn find_sql<'q, E: Entity>(id: &'q E::Id) -> Result<BoundSql<'q>> {
    Ok(BoundSql {
        sql: format!("SELECT * FROM {} WHERE {} = ?", E::TABLE, E::ID_COLUMN),
        arguments: key_arguments::<E>(id)?,
    })
}

pub(crate) fn delete_sql<'q, E: Entity>(id: &'q E::Id) -> Result<BoundSql<'q>> {
    Ok(BoundSql {
        sql: format!("DELETE FROM {} WHERE {} = ?", E::TABLE, E::ID_COLUMN),
        arguments: key_arguments::<E>(id)?,
    })
}

fn key_arguments<'q, E: Entity>(id: &'q E::Id) -> Result<SqliteArguments<'q>> {
    let mut arguments = SqliteArguments::default();
    arguments.add(id).map_err(sqlx::Error::Encode)?;
    Ok(arguments)
}

/// Bound columns of `entity`, without the key column while it has no key
fn collect_columns<'q, E: Entity>(
    entity: &'q E,
) -> Result<(Vec<&'static str>, SqliteArguments<'q>)> {
    let has_key = entity.id().is_some();
    let mut columns = Columns::new(if has_key { None } else { Some(E::ID_COLUMN) });
    entity.bind_columns(&mut columns);

    if let Some(error) = columns.error {
        return Err(sqlx::Error::Encode(error).into());
    }
    if has_key && !columns.names.contains(&E::ID_COLUMN) {
        return Err(EntityManagerError::InvalidEntity {
            table: E::TABLE,
            reason: format!("key column {} is not bound", E::ID_COLUMN),
        });
    }
    for (index, name) in columns.names.iter().enumerate() {
        if columns.names[..index].contains(name) {
            return Err(EntityManagerError::InvalidEntity {
                table: E::TABLE,
                reason: format!("column {name} is bound twice"),
            });
        }
    }

    Ok((columns.names, columns.arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Clone, FromRow)]
    struct Book {
        id: String,
        title: Option<String>,
    }

    impl Entity for Book {
        type Id = String;
        const TABLE: &'static str = "book";

        fn id(&self) -> Option<String> {
            Some(self.id.clone())
        }

        fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
            columns.bind("id", &self.id).bind("title", &self.title);
        }
    }

    #[derive(Debug, Clone, FromRow)]
    struct Author {
        author_id: Option<i64>,
        name: String,
    }

    impl Entity for Author {
        type Id = i64;
        const TABLE: &'static str = "author";
        const ID_COLUMN: &'static str = "author_id";

        fn id(&self) -> Option<i64> {
            self.author_id
        }

        fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
            columns.bind("author_id", &self.author_id).bind("name", &self.name);
        }
    }

    #[derive(Debug, Clone, FromRow)]
    struct Step {
        step_uuid: Uuid,
        name: String,
    }

    impl Entity for Step {
        type Id = Uuid;
        const TABLE: &'static str = "step";
        const ID_COLUMN: &'static str = "step_uuid";

        fn id(&self) -> Option<Uuid> {
            Some(self.step_uuid)
        }

        // forgets its key column
        fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
            columns.bind("name", &self.name);
        }
    }

    fn book() -> Book {
        Book {
            id: "b-1".to_string(),
            title: Some("Rust".to_string()),
        }
    }

    #[test]
    fn test_insert_with_assigned_key() {
        let book = book();
        let bound = insert_sql(&book).unwrap();
        assert_eq!(
            bound.sql,
            "INSERT INTO book (id, title) VALUES (?, ?) RETURNING id"
        );
    }

    #[test]
    fn test_insert_leaves_generated_key_to_database() {
        let author = Author {
            author_id: None,
            name: "Ferris".to_string(),
        };
        let bound = insert_sql(&author).unwrap();
        assert_eq!(
            bound.sql,
            "INSERT INTO author (name) VALUES (?) RETURNING author_id"
        );
    }

    #[test]
    fn test_merge_updates_non_key_columns() {
        let book = book();
        let bound = merge_sql(&book).unwrap();
        assert_eq!(
            bound.sql,
            "INSERT INTO book (id, title) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET title = excluded.title RETURNING *"
        );
    }

    #[test]
    fn test_find_and_delete_by_key() {
        let id = "b-1".to_string();
        assert_eq!(
            find_sql::<Book>(&id).unwrap().sql,
            "SELECT * FROM book WHERE id = ?"
        );
        let bound = delete_sql::<Author>(&7).unwrap();
        assert_eq!(bound.sql, "DELETE FROM author WHERE author_id = ?");
    }

    #[test]
    fn test_unbound_key_column_is_rejected() {
        let step = Step {
            step_uuid: Uuid::new_v4(),
            name: "fetch".to_string(),
        };
        let result = insert_sql(&step);
        assert!(matches!(
            result,
            Err(EntityManagerError::InvalidEntity { table: "step", .. })
        ));
    }

    #[test]
    fn test_columns_skip_unassigned_key() {
        let mut columns = Columns::new(Some("author_id"));
        columns.bind("author_id", None::<i64>).bind("name", "Ferris");
        assert_eq!(columns.names(), &["name"]);
    }
}
