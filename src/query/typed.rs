use super::params::{expand, NamedParameters, ParameterValue, RenderedSql};
use super::pagination::Pagination;
use super::SelectQuery;
use crate::entity::Entity;
use crate::error::Result;
use std::marker::PhantomData;

/// Object query over one entity type.
///
/// The query text is a predicate over the entity's columns; the table and
/// projection come from the [`Entity`] mapping, so
/// `TypedQuery::<Book>::new("id IN :ids")` reads
/// `SELECT * FROM book WHERE id IN (?, ?)`.
#[derive(Debug, Clone)]
pub struct TypedQuery<E> {
    predicate: String,
    order_by: Vec<String>,
    pagination: Pagination,
    parameters: NamedParameters,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> TypedQuery<E> {
    /// Query the rows matching `predicate`; a blank predicate matches every row
    pub fn new(predicate: &str) -> Self {
        Self {
            predicate: predicate.trim().to_string(),
            order_by: Vec::new(),
            pagination: Pagination::default(),
            parameters: NamedParameters::new(),
            _entity: PhantomData,
        }
    }

    pub fn set_parameter(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.parameters.set(name, value);
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order_by.push(format!("{column} ASC"));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order_by.push(format!("{column} DESC"));
        self
    }

    /// Skip the first `first_result` rows
    pub fn set_first_result(mut self, first_result: u32) -> Self {
        self.pagination.first_result = Some(first_result);
        self
    }

    /// Return at most `max_results` rows
    pub fn set_max_results(mut self, max_results: u32) -> Self {
        self.pagination.max_results = Some(max_results);
        self
    }

    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.pagination = Pagination::page(page, per_page);
        self
    }

    pub fn parameters(&self) -> &NamedParameters {
        &self.parameters
    }

    /// SQL with the named placeholders still in place
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", E::TABLE);

        if !self.predicate.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicate);
        }

        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        sql.push_str(&self.pagination.to_sql());
        sql
    }
}

impl<E: Entity> SelectQuery for TypedQuery<E> {
    type Row = E;

    fn render(&self) -> Result<RenderedSql> {
        expand(&self.to_sql(), &self.parameters)
    }
}
