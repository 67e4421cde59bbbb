use super::params::{expand, NamedParameters, ParameterValue, RenderedSql};
use super::pagination::Pagination;
use super::SelectQuery;
use crate::error::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use std::marker::PhantomData;

/// Native SQLite statement whose rows map onto `T`
#[derive(Debug, Clone)]
pub struct NativeQuery<T> {
    sql: String,
    pagination: Pagination,
    parameters: NamedParameters,
    _row: PhantomData<fn() -> T>,
}

impl<T> NativeQuery<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.trim().trim_end_matches(';').trim_end().to_string(),
            pagination: Pagination::default(),
            parameters: NamedParameters::new(),
            _row: PhantomData,
        }
    }

    pub fn set_parameter(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.parameters.set(name, value);
        self
    }

    pub fn set_first_result(mut self, first_result: u32) -> Self {
        self.pagination.first_result = Some(first_result);
        self
    }

    pub fn set_max_results(mut self, max_results: u32) -> Self {
        self.pagination.max_results = Some(max_results);
        self
    }

    pub fn parameters(&self) -> &NamedParameters {
        &self.parameters
    }

    /// The statement is wrapped in a sub-select when a result window is set, so
    /// its own LIMIT clauses stay intact.
    pub fn to_sql(&self) -> String {
        if self.pagination.is_unbounded() {
            self.sql.clone()
        } else {
            format!("SELECT * FROM ({}){}", self.sql, self.pagination.to_sql())
        }
    }
}

impl<T> SelectQuery for NativeQuery<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    type Row = T;

    fn render(&self) -> Result<RenderedSql> {
        expand(&self.to_sql(), &self.parameters)
    }
}
