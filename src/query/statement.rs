use super::params::{expand, NamedParameters, ParameterValue, RenderedSql};
use crate::entity::Entity;
use crate::error::Result;

/// Bulk update or delete, executed for its affected row count
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    sql: String,
    parameters: NamedParameters,
}

impl UpdateStatement {
    /// Native UPDATE/DELETE/INSERT statement
    pub fn native(sql: &str) -> Self {
        Self {
            sql: sql.trim().to_string(),
            parameters: NamedParameters::new(),
        }
    }

    /// `DELETE FROM <entity table> [WHERE predicate]`
    pub fn delete<E: Entity>(predicate: &str) -> Self {
        Self::native(&with_predicate(format!("DELETE FROM {}", E::TABLE), predicate))
    }

    /// `UPDATE <entity table> SET assignments [WHERE predicate]`
    pub fn update<E: Entity>(assignments: &str, predicate: &str) -> Self {
        Self::native(&with_predicate(
            format!("UPDATE {} SET {}", E::TABLE, assignments.trim()),
            predicate,
        ))
    }

    pub fn set_parameter(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.parameters.set(name, value);
        self
    }

    pub fn parameters(&self) -> &NamedParameters {
        &self.parameters
    }

    pub fn to_sql(&self) -> &str {
        &self.sql
    }

    pub fn render(&self) -> Result<RenderedSql> {
        expand(&self.sql, &self.parameters)
    }
}

fn with_predicate(mut sql: String, predicate: &str) -> String {
    let predicate = predicate.trim();
    if !predicate.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(predicate);
    }
    sql
}
