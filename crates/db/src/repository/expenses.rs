//! `expense_by_category` reads.

use crate::{
    Backend, DbError,
    models::{Row, Table, TableQuery},
};

/// Category breakdown, largest amount first.
pub async fn by_category(backend: &dyn Backend) -> Result<Vec<Row>, DbError> {
    backend
        .select(&TableQuery::from(Table::ExpenseByCategory).order_by("amount", true))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;

    #[tokio::test]
    async fn seeded_categories_come_back_largest_first() {
        let backend = MemoryBackend::seeded();
        let rows = by_category(&backend).await.unwrap();

        let amounts: Vec<f64> = rows.iter().filter_map(|r| r["amount"].as_f64()).collect();
        assert_eq!(amounts, vec![32000.0, 8200.5, 4500.75, 2299.0, 2100.0]);
    }
}
