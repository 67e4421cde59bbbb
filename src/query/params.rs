//! Named query parameters.
//!
//! Queries are written with `:name` placeholders and bound by name. Before a
//! statement reaches SQLite the placeholders are rewritten to positional `?`
//! markers and the bound values are laid out in the same order. List values
//! expand to one marker per element so `id IN :ids` works the way it reads.
//!
//! Values are bound through sqlx's own encoders, so a parameter compares equal
//! to the column an entity wrote: a `Uuid` binds as the same 16-byte blob,
//! a timestamp as the same text.

use crate::error::{EntityManagerError, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteArguments;
use sqlx::types::Json;
use sqlx::Arguments;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A value bound to a named placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    /// Bound as JSON text
    Json(serde_json::Value),
    /// Expands to one marker per element
    List(Vec<ParameterValue>),
}

impl ParameterValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOLEAN",
            Self::Integer(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
            Self::Uuid(_) => "UUID",
            Self::Timestamp(_) => "TIMESTAMP",
            Self::Json(_) => "JSON",
            Self::List(_) => "LIST",
        }
    }

    /// Append this scalar to `arguments` using the sqlx encoding of its type
    fn add_to<'q>(&'q self, arguments: &mut SqliteArguments<'q>) -> Result<()> {
        let added = match self {
            Self::Null => arguments.add(None::<String>),
            Self::Bool(value) => arguments.add(*value),
            Self::Integer(value) => arguments.add(*value),
            Self::Real(value) => arguments.add(*value),
            Self::Text(value) => arguments.add(value.as_str()),
            Self::Blob(value) => arguments.add(value.as_slice()),
            Self::Uuid(value) => arguments.add(*value),
            Self::Timestamp(value) => arguments.add(*value),
            Self::Json(value) => arguments.add(Json(value)),
            Self::List(_) => {
                return Err(EntityManagerError::InvalidParameter(
                    "a list cannot be bound as a single value".to_string(),
                ))
            }
        };
        added.map_err(sqlx::Error::Encode)?;
        Ok(())
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i16> for ParameterValue {
    fn from(value: i16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u16> for ParameterValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// SQLite integers are signed 64-bit; larger values are refused rather than
/// rounded
impl TryFrom<u64> for ParameterValue {
    type Error = EntityManagerError;

    fn try_from(value: u64) -> Result<Self> {
        i64::try_from(value).map(Self::Integer).map_err(|_| {
            EntityManagerError::InvalidParameter(format!(
                "{value} does not fit in a signed 64-bit integer"
            ))
        })
    }
}

impl From<f32> for ParameterValue {
    fn from(value: f32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParameterValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<&[u8]> for ParameterValue {
    fn from(value: &[u8]) -> Self {
        Self::Blob(value.to_vec())
    }
}

impl From<Uuid> for ParameterValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<DateTime<Utc>> for ParameterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<serde_json::Value> for ParameterValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Values bound to the `:name` placeholders of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParameters {
    values: BTreeMap<String, ParameterValue>,
}

impl NamedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `:name`, replacing any earlier binding
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// SQL with positional markers plus the values to bind, in order
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub values: Vec<ParameterValue>,
}

impl RenderedSql {
    /// The values encoded for SQLite, ready for `sqlx::query_with`
    pub fn arguments(&self) -> Result<SqliteArguments<'_>> {
        let mut arguments = SqliteArguments::default();
        for value in &self.values {
            value.add_to(&mut arguments)?;
        }
        Ok(arguments)
    }
}

/// Rewrite the `:name` placeholders of `sql` into positional markers.
///
/// Quoted strings, quoted identifiers, comments and `::` are copied verbatim.
pub fn expand(sql: &str, parameters: &NamedParameters) -> Result<RenderedSql> {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            '\'' | '"' | '`' => {
                let end = find_char(&chars, i + 1, c);
                out.extend(&chars[i..end]);
                i = end;
            }
            '[' => {
                let end = find_char(&chars, i + 1, ']');
                out.extend(&chars[i..end]);
                i = end;
            }
            '-' if next == Some('-') => {
                let end = find_char(&chars, i + 2, '\n');
                out.extend(&chars[i..end]);
                i = end;
            }
            '/' if next == Some('*') => {
                let end = find_block_comment_end(&chars, i + 2);
                out.extend(&chars[i..end]);
                i = end;
            }
            ':' if next == Some(':') => {
                out.push_str("::");
                i += 2;
            }
            ':' if next.is_some_and(is_name_start) => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_name_part(chars[end]) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                let value = parameters
                    .get(&name)
                    .ok_or_else(|| EntityManagerError::MissingParameter(name.clone()))?;
                push_placeholder(&mut out, &mut values, &name, value)?;
                i = end;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(RenderedSql { sql: out, values })
}

fn push_placeholder(
    out: &mut String,
    values: &mut Vec<ParameterValue>,
    name: &str,
    value: &ParameterValue,
) -> Result<()> {
    let ParameterValue::List(items) = value else {
        out.push('?');
        values.push(value.clone());
        return Ok(());
    };

    if let Some(nested) = items.iter().find(|item| matches!(item, ParameterValue::List(_))) {
        return Err(EntityManagerError::InvalidParameter(format!(
            ":{name} holds a nested {}",
            nested.type_name()
        )));
    }

    let list = if items.is_empty() {
        // IN (NULL) matches nothing
        "NULL".to_string()
    } else {
        vec!["?"; items.len()].join(", ")
    };
    values.extend(items.iter().cloned());

    if out.trim_end().ends_with('(') {
        out.push_str(&list);
    } else {
        out.push('(');
        out.push_str(&list);
        out.push(')');
    }
    Ok(())
}

/// Index just past the next `target` at or after `from`, or the end of input
fn find_char(chars: &[char], from: usize, target: char) -> usize {
    chars[from.min(chars.len())..]
        .iter()
        .position(|&c| c == target)
        .map_or(chars.len(), |offset| from + offset + 1)
}

fn find_block_comment_end(chars: &[char], from: usize) -> usize {
    let mut i = from;
    while i + 1 < chars.len() {
        if chars[i] == '*' && chars[i + 1] == '/' {
            return i + 2;
        }
        i += 1;
    }
    chars.len()
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
