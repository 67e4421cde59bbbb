//! # Query Objects
//!
//! The query objects a [`Session`](crate::session::Session) creates and executes.
//!
//! ## Key Components
//!
//! - [`TypedQuery`] - object query: a predicate over one entity's columns
//! - [`NativeQuery`] - a full SQLite statement mapped onto any `FromRow` type
//! - [`UpdateStatement`] - bulk update/delete returning the affected row count
//! - [`params`] - `:name` placeholder expansion shared by all three
//! - [`Pagination`] - first-result / max-results windows
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let books = tem
//!     .query_list(|session| {
//!         session
//!             .create_query::<Book>("id IN :ids")
//!             .set_parameter("ids", ids.clone())
//!             .order_asc("title")
//!     })
//!     .await?;
//! ```

pub mod native;
pub mod pagination;
pub mod params;
pub mod statement;
pub mod typed;

pub use native::NativeQuery;
pub use pagination::Pagination;
pub use params::{NamedParameters, ParameterValue, RenderedSql};
pub use statement::UpdateStatement;
pub use typed::TypedQuery;

use crate::error::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

/// A query that produces rows
pub trait SelectQuery {
    type Row: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;

    /// Final SQL with positional markers, plus the values to bind
    fn render(&self) -> Result<RenderedSql>;
}
