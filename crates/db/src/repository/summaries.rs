//! Dated summary tables. All three are read oldest first.

use crate::{
    Backend, DbError,
    models::{Row, Table, TableQuery},
};

async fn by_date(backend: &dyn Backend, table: Table) -> Result<Vec<Row>, DbError> {
    backend
        .select(&TableQuery::from(table).order_by("date", false))
        .await
}

pub async fn sales(backend: &dyn Backend) -> Result<Vec<Row>, DbError> {
    by_date(backend, Table::SalesSummary).await
}

pub async fn purchases(backend: &dyn Backend) -> Result<Vec<Row>, DbError> {
    by_date(backend, Table::PurchaseSummary).await
}

pub async fn expenses(backend: &dyn Backend) -> Result<Vec<Row>, DbError> {
    by_date(backend, Table::ExpenseSummary).await
}
