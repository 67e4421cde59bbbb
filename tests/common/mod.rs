#![allow(dead_code)]

//! Fixture entities and independent verification helpers.
//!
//! The `find_*` / `create_*` helpers go straight to the pool with plain sqlx so
//! that assertions never depend on the entity manager under test.

use sqlx::{FromRow, SqlitePool};
use test_entity_manager::test_helpers::setup_test_entity_manager;
use test_entity_manager::{Columns, Entity, TestEntityManager};
use uuid::Uuid;

pub const SCHEMA: &str = "
    CREATE TABLE book (
        id TEXT PRIMARY KEY,
        title TEXT
    );
    CREATE TABLE author (
        author_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        born INTEGER
    );
    CREATE TABLE task (
        task_uuid BLOB PRIMARY KEY,
        name TEXT NOT NULL,
        priority INTEGER NOT NULL
    );
    CREATE TABLE attachment (
        id INTEGER PRIMARY KEY,
        data BLOB NOT NULL
    );
";

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Book {
    pub id: String,
    pub title: Option<String>,
}

impl Book {
    pub fn new(id: impl Into<String>, title: &str) -> Self {
        Self {
            id: id.into(),
            title: Some(title.to_string()),
        }
    }
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

/// Entity whose key is generated by the database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Author {
    pub author_id: Option<i64>,
    pub name: String,
    pub born: Option<i64>,
}

impl Author {
    pub fn new(name: &str) -> Self {
        Self {
            author_id: None,
            name: name.to_string(),
            born: None,
        }
    }
}

impl Entity for Author {
    type Id = i64;
    const TABLE: &'static str = "author";
    const ID_COLUMN: &'static str = "author_id";

    fn id(&self) -> Option<i64> {
        self.author_id
    }

    fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
        columns
            .bind("author_id", &self.author_id)
            .bind("name", &self.name)
            .bind("born", &self.born);
    }
}

/// Entity keyed by a `Uuid`, stored as a 16-byte blob
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Task {
    pub task_uuid: Uuid,
    pub name: String,
    pub priority: i32,
}

impl Task {
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            task_uuid: Uuid::new_v4(),
            name: name.to_string(),
            priority,
        }
    }
}

impl Entity for Task {
    type Id = Uuid;
    const TABLE: &'static str = "task";
    const ID_COLUMN: &'static str = "task_uuid";

    fn id(&self) -> Option<Uuid> {
        Some(self.task_uuid)
    }

    fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
        columns
            .bind("task_uuid", &self.task_uuid)
            .bind("name", &self.name)
            .bind("priority", &self.priority);
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Attachment {
    pub id: i64,
    pub data: Vec<u8>,
}

impl Entity for Attachment {
    type Id = i64;
    const TABLE: &'static str = "attachment";

    fn id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn bind_columns<'q>(&'q self, columns: &mut Columns<'q>) {
        columns.bind("id", &self.id).bind("data", &self.data);
    }
}

pub async fn setup() -> TestEntityManager {
    setup_test_entity_manager(SCHEMA).await
}

pub fn random_books(count: usize, title: &str) -> Vec<Book> {
    (0..count)
        .map(|_| Book::new(test_entity_manager::test_helpers::random_id(), title))
        .collect()
}

pub async fn create_books(pool: &SqlitePool, books: &[Book]) {
    let mut tx = pool.begin().await.expect("Failed to begin");
    for book in books {
        sqlx::query("INSERT INTO book (id, title) VALUES (?, ?)")
            .bind(&book.id)
            .bind(&book.title)
            .execute(&mut *tx)
            .await
            .expect("Failed to insert book");
    }
    tx.commit().await.expect("Failed to commit");
}

pub async fn find_book_by_id(pool: &SqlitePool, id: &str) -> Option<Book> {
    sqlx::query_as::<_, Book>("SELECT id, title FROM book WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .expect("Failed to query book")
}

pub async fn find_books(pool: &SqlitePool, ids: &[String]) -> Vec<Book> {
    let mut books = Vec::new();
    for id in ids {
        if let Some(book) = find_book_by_id(pool, id).await {
            books.push(book);
        }
    }
    books
}

pub fn ids_of(books: &[Book]) -> Vec<String> {
    books.iter().map(|book| book.id.clone()).collect()
}
