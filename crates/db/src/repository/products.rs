//! `products` reads and inserts.

use crate::{
    Backend, DbError,
    models::{Row, Table, TableQuery},
};

/// All products, optionally narrowed to names containing `search`
/// (case-insensitive). An empty search string means no filter.
pub async fn list(backend: &dyn Backend, search: Option<&str>) -> Result<Vec<Row>, DbError> {
    let mut query = TableQuery::from(Table::Products);
    if let Some(needle) = search.filter(|s| !s.is_empty()) {
        query = query.contains_ignore_case("name", needle);
    }
    backend.select(&query).await
}

/// The `n` products with the most stock on hand, highest first.
pub async fn top_by_stock(backend: &dyn Backend, n: usize) -> Result<Vec<Row>, DbError> {
    let query = TableQuery::from(Table::Products)
        .order_by("stock_quantity", true)
        .limit(n);
    backend.select(&query).await
}

/// Insert one product row and return it as stored.
pub async fn insert(backend: &dyn Backend, row: Row) -> Result<Row, DbError> {
    backend.insert(Table::Products, row).await
}
