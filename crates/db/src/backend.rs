//! The `Backend` trait — the contract every store client must fulfil.

use async_trait::async_trait;

use crate::{
    DbError,
    models::{Row, Table, TableQuery},
};

/// A stateless client for the relational store.
///
/// Implementations must be safe for concurrent independent use: the gateway
/// shares one instance behind an `Arc` and issues several calls at once.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a read and return the matching rows in the order the store
    /// produced them.
    async fn select(&self, query: &TableQuery) -> Result<Vec<Row>, DbError>;

    /// Insert a single row and return it as stored, including generated
    /// columns.
    async fn insert(&self, table: Table, row: Row) -> Result<Row, DbError>;
}

/// Reject any column that is not on the table's whitelist.
pub(crate) fn check_columns<'a>(
    table: Table,
    columns: impl IntoIterator<Item = &'a str>,
) -> Result<(), DbError> {
    for column in columns {
        if !table.has_column(column) {
            return Err(DbError::UnknownColumn {
                table: table.name(),
                column: column.to_owned(),
            });
        }
    }
    Ok(())
}
