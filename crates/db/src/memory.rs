//! `MemoryBackend` — an in-process stand-in for the relational store.
//!
//! Useful in tests and for running the gateway without Postgres. It applies
//! the same filter/order/limit semantics as [`PgBackend`](crate::PgBackend)
//! and enforces the schema's storage constraints, reporting violations with
//! the same wording Postgres uses.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{
    DbError,
    backend::{check_columns, Backend},
    models::{Filter, Row, Table, TableQuery},
};

/// In-memory tables keyed by [`Table`]. Rows keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl MemoryBackend {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the demo dataset from [`crate::seed`].
    pub fn seeded() -> Self {
        let mut tables: HashMap<Table, Vec<Row>> = HashMap::new();
        for (table, row) in crate::seed::rows() {
            tables.entry(table).or_default().push(with_generated_columns(row));
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Load rows directly, bypassing the insert policy. Generated columns
    /// are filled in when absent; constraints are not checked.
    pub async fn load(&self, table: Table, rows: impl IntoIterator<Item = Row>) {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();
        stored.extend(rows.into_iter().map(with_generated_columns));
    }

    /// Number of rows currently stored in `table`.
    pub async fn count(&self, table: Table) -> usize {
        self.tables.read().await.get(&table).map_or(0, Vec::len)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &TableQuery) -> Result<Vec<Row>, DbError> {
        check_columns(query.table, query.referenced_columns())?;
        debug!(table = %query.table, "select (memory)");

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| matches_filter(r, query.filter.as_ref())).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(order.column), b.get(order.column));
                if order.descending { ord.reverse() } else { ord }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, DbError> {
        if !table.accepts_inserts() {
            return Err(DbError::PermissionDenied(table.name()));
        }
        check_columns(table, row.keys().map(String::as_str))?;
        debug!(%table, "insert (memory)");

        let row = coerce_columns(table, row)?;
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();
        check_constraints(table, &row, stored)?;

        let row = with_generated_columns(row);
        stored.push(row.clone());
        Ok(row)
    }
}

fn with_generated_columns(mut row: Row) -> Row {
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    row
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

fn check_constraints(table: Table, row: &Row, existing: &[Row]) -> Result<(), DbError> {
    let name = table.name();

    for column in table.required_columns() {
        if row.get(*column).map_or(true, Value::is_null) {
            return Err(DbError::ConstraintViolation(format!(
                "null value in column \"{column}\" of relation \"{name}\" violates not-null constraint"
            )));
        }
    }

    let check = |column: &str, ok: fn(f64) -> bool| -> Result<(), DbError> {
        match row.get(column) {
            None | Some(Value::Null) => Ok(()),
            Some(value) => match numeric(value) {
                Some(n) if ok(n) => Ok(()),
                Some(_) => Err(DbError::ConstraintViolation(format!(
                    "new row for relation \"{name}\" violates check constraint \"{name}_{column}_check\""
                ))),
                None => Err(DbError::ConstraintViolation(format!(
                    "invalid input syntax for type numeric: \"{value}\""
                ))),
            },
        }
    };

    match table {
        Table::Products => {
            check("price", |n| n >= 0.0)?;
            check("rating", |n| (0.0..=5.0).contains(&n))?;
            check("stock_quantity", |n| n >= 0.0)?;
        }
        Table::Users => {
            let email = row.get("email");
            if existing.iter().any(|r| r.get("email") == email) {
                return Err(DbError::ConstraintViolation(
                    "duplicate key value violates unique constraint \"users_email_key\"".into(),
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Column types of `products`: NUMERIC(12, 2) price, NUMERIC(3, 2) rating,
/// INTEGER stock_quantity.
const PRODUCT_NUMERICS: [(&str, i32, usize); 2] = [("price", 12, 2), ("rating", 3, 2)];

/// Convert incoming values to their column types the way Postgres does
/// before any constraint runs: round numerics to their scale, reject
/// values too wide for their precision or outside the integer range.
fn coerce_columns(table: Table, mut row: Row) -> Result<Row, DbError> {
    if table != Table::Products {
        return Ok(row);
    }

    for (column, precision, scale) in PRODUCT_NUMERICS {
        let Some(value) = row.get(column).filter(|v| !v.is_null()) else {
            continue;
        };
        let n = numeric(value).ok_or_else(|| {
            DbError::ConstraintViolation(format!(
                "invalid input syntax for type numeric: \"{value}\""
            ))
        })?;
        let rounded = round_to_scale(n, scale);
        if rounded.abs() >= 10f64.powi(precision - scale as i32) {
            return Err(DbError::ConstraintViolation("numeric field overflow".into()));
        }
        row.insert(column.to_owned(), Value::from(rounded));
    }

    let stock = row.get("stock_quantity").filter(|v| !v.is_null()).cloned();
    if let Some(stock) = stock {
        match numeric(&stock) {
            Some(n) if n.fract() != 0.0 => {
                return Err(DbError::ConstraintViolation(format!(
                    "invalid input syntax for type integer: \"{stock}\""
                )));
            }
            Some(n) if n < f64::from(i32::MIN) || n > f64::from(i32::MAX) => {
                return Err(DbError::ConstraintViolation(format!(
                    "value \"{stock}\" is out of range for type integer"
                )));
            }
            Some(n) => {
                row.insert("stock_quantity".into(), Value::from(n as i32));
            }
            None => {
                return Err(DbError::ConstraintViolation(format!(
                    "invalid input syntax for type integer: \"{stock}\""
                )));
            }
        }
    }

    Ok(row)
}

/// Round half away from zero to `scale` fractional digits, working on the
/// shortest decimal form of `n` so `1.005` rounds up as written.
fn round_to_scale(n: f64, scale: usize) -> f64 {
    let text = n.abs().to_string();
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if frac.len() <= scale {
        return n;
    }

    let Ok(mut units) = format!("{int}{}", &frac[..scale]).parse::<u128>() else {
        return n;
    };
    if frac.as_bytes()[scale] >= b'5' {
        units += 1;
    }
    let magnitude = units as f64 / 10f64.powi(scale as i32);
    if n.is_sign_negative() && magnitude != 0.0 { -magnitude } else { magnitude }
}

// ---------------------------------------------------------------------------
// Filtering and ordering
// ---------------------------------------------------------------------------

fn matches_filter(row: &Row, filter: Option<&Filter>) -> bool {
    match filter {
        None => true,
        Some(Filter::ContainsIgnoreCase { column, needle }) => row
            .get(*column)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
    }
}

/// A number, or a string holding one.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Postgres ordering: NULL sorts after every value in ascending order.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::String(x)), Some(Value::String(y))) => {
            if let (Ok(dx), Ok(dy)) = (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                return dx.cmp(&dy);
            }
            if let (Ok(nx), Ok(ny)) = (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
                return nx.partial_cmp(&ny).unwrap_or(Ordering::Equal);
            }
            x.cmp(y)
        }
        (Some(x), Some(y)) => match (numeric(x), numeric(y)) {
            (Some(nx), Some(ny)) => nx.partial_cmp(&ny).unwrap_or(Ordering::Equal),
            _ => x.to_string().cmp(&y.to_string()),
        },
    }
}
