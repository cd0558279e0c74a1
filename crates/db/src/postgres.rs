//! Postgres implementation of [`Backend`].
//!
//! Every statement returns whole rows through `row_to_json`, so callers see
//! the same loose `Row` shape regardless of column types. Columns listed in
//! [`Table::text_columns`] are overlaid with their `::text` rendering so
//! their decimal digits survive unchanged. Table and column
//! identifiers only ever come from the [`Table`] whitelist; user text is
//! always bound as a parameter.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use tracing::debug;

use crate::{
    DbError, DbPool,
    backend::{check_columns, Backend},
    models::{Filter, Row, Table, TableQuery},
};

/// Store client backed by a shared `PgPool`.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: DbPool,
}

impl PgBackend {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn select(&self, query: &TableQuery) -> Result<Vec<Row>, DbError> {
        check_columns(query.table, query.referenced_columns())?;
        let sql = render_select(query);
        debug!(table = %query.table, %sql, "select");

        let mut stmt = sqlx::query_scalar::<_, Json<Row>>(&sql);
        if let Some(Filter::ContainsIgnoreCase { needle, .. }) = &query.filter {
            stmt = stmt.bind(like_pattern(needle));
        }

        let rows = stmt
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, DbError> {
        if !table.accepts_inserts() {
            return Err(DbError::PermissionDenied(table.name()));
        }
        check_columns(table, row.keys().map(String::as_str))?;

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let sql = render_insert(table, &columns);
        debug!(%table, %sql, "insert");

        let Json(created) = sqlx::query_scalar::<_, Json<Row>>(&sql)
            .bind(Json(Value::Object(row)))
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        Ok(created)
    }
}

/// The JSON expression for one row of `table` aliased as `t`.
fn row_json(table: Table) -> String {
    let text_columns = table.text_columns();
    if text_columns.is_empty() {
        return "row_to_json(t)".to_owned();
    }
    let overlay = text_columns
        .iter()
        .map(|col| format!("'{col}', t.{col}::text"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("(to_jsonb(t) || jsonb_build_object({overlay}))")
}

fn render_select(query: &TableQuery) -> String {
    let mut sql = format!(
        "SELECT {} FROM {} AS t",
        row_json(query.table),
        query.table.name()
    );

    if let Some(Filter::ContainsIgnoreCase { column, .. }) = &query.filter {
        sql.push_str(&format!(" WHERE t.{column} ILIKE $1 ESCAPE '\\'"));
    }
    if let Some(order) = &query.order {
        let direction = if order.descending { "DESC" } else { "ASC" };
        sql.push_str(&format!(" ORDER BY t.{} {direction}", order.column));
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

fn render_insert(table: Table, columns: &[&str]) -> String {
    let list = columns.join(", ");
    format!(
        "INSERT INTO {name} AS t ({list}) \
         SELECT {list} FROM jsonb_populate_record(NULL::{name}, $1) \
         RETURNING row_to_json(t)",
        name = table.name(),
    )
}

/// Escape LIKE metacharacters so the needle matches literally, then wrap it
/// for a substring match.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_select() {
        let sql = render_select(&TableQuery::from(Table::Users));
        assert_eq!(sql, "SELECT row_to_json(t) FROM users AS t");
    }

    #[test]
    fn renders_filter_order_and_limit() {
        let q = TableQuery::from(Table::Products)
            .contains_ignore_case("name", "pen")
            .order_by("stock_quantity", true)
            .limit(5);
        assert_eq!(
            render_select(&q),
            "SELECT row_to_json(t) FROM products AS t \
             WHERE t.name ILIKE $1 ESCAPE '\\' \
             ORDER BY t.stock_quantity DESC LIMIT 5"
        );
    }

    #[test]
    fn numeric_amount_is_selected_as_text() {
        let q = TableQuery::from(Table::ExpenseByCategory).order_by("amount", true);
        assert_eq!(
            render_select(&q),
            "SELECT (to_jsonb(t) || jsonb_build_object('amount', t.amount::text)) \
             FROM expense_by_category AS t ORDER BY t.amount DESC"
        );
    }

    #[test]
    fn renders_insert_through_populate_record() {
        let sql = render_insert(Table::Products, &["name", "price"]);
        assert!(sql.starts_with("INSERT INTO products AS t (name, price) SELECT name, price"));
        assert!(sql.contains("jsonb_populate_record(NULL::products, $1)"));
        assert!(sql.ends_with("RETURNING row_to_json(t)"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pen"), "%pen%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn seeded_products_are_readable() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::pool::create_pool(&url, 2).await.expect("pool creation failed");
        crate::pool::run_migrations(&pool).await.expect("migrations failed");
        let backend = PgBackend::new(pool);

        let rows = backend
            .select(&TableQuery::from(Table::Products).order_by("stock_quantity", true).limit(5))
            .await
            .expect("select failed");

        assert!(rows.len() <= 5);
        assert!(rows.iter().all(|r| r.contains_key("stock_quantity")));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn amounts_keep_their_stored_digits() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::pool::create_pool(&url, 2).await.expect("pool creation failed");
        crate::pool::run_migrations(&pool).await.expect("migrations failed");
        let backend = PgBackend::new(pool);

        let rows = backend
            .select(&TableQuery::from(Table::ExpenseByCategory).order_by("amount", true))
            .await
            .expect("select failed");

        assert!(rows.iter().all(|r| r["amount"].is_string()));
        assert_eq!(rows[0]["amount"], "32000");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn negative_price_is_a_constraint_violation() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::pool::create_pool(&url, 2).await.expect("pool creation failed");
        crate::pool::run_migrations(&pool).await.expect("migrations failed");
        let backend = PgBackend::new(pool);

        let mut row = Row::new();
        row.insert("name".into(), "Bad".into());
        row.insert("price".into(), (-1.0).into());
        row.insert("stock_quantity".into(), 0.into());

        let err = backend.insert(Table::Products, row).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
    }
}
