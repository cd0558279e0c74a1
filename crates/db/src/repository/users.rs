//! `users` reads.

use crate::{
    Backend, DbError,
    models::{Row, Table, TableQuery},
};

/// Every user, unfiltered.
pub async fn list(backend: &dyn Backend) -> Result<Vec<Row>, DbError> {
    backend.select(&TableQuery::from(Table::Users)).await
}
