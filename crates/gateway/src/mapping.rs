//! Row mapping — one explicit function per table, from a loose snake_case
//! [`Row`] to its typed view model.
//!
//! A required field that is missing, null or of the wrong type is an error;
//! the loose row never travels past this module.

use chrono::{DateTime, Utc};
use db::{Row, Table};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ExpenseByCategorySummary, ExpenseSummary, NewProduct, Product, PurchaseSummary,
    SalesSummary, User,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{table} row is missing required field '{field}'")]
    MissingField { table: Table, field: &'static str },

    #[error("{table}.{field} has an unexpected value: {reason}")]
    InvalidField {
        table: Table,
        field: &'static str,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// Typed accessors over one row, remembering which table it came from so
/// errors can say where the bad value was.
struct Fields<'a> {
    table: Table,
    row: &'a Row,
}

impl<'a> Fields<'a> {
    fn new(table: Table, row: &'a Row) -> Self {
        Self { table, row }
    }

    fn present(&self, field: &'static str) -> Option<&'a Value> {
        self.row.get(field).filter(|v| !v.is_null())
    }

    fn required(&self, field: &'static str) -> Result<&'a Value, MappingError> {
        self.present(field).ok_or(MappingError::MissingField {
            table: self.table,
            field,
        })
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> MappingError {
        MappingError::InvalidField {
            table: self.table,
            field,
            reason: reason.into(),
        }
    }

    fn string(&self, field: &'static str) -> Result<String, MappingError> {
        self.required(field)?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid(field, "expected a string"))
    }

    fn uuid(&self, field: &'static str) -> Result<Uuid, MappingError> {
        let raw = self.string(field)?;
        Uuid::parse_str(&raw).map_err(|e| self.invalid(field, e.to_string()))
    }

    fn number_from(&self, field: &'static str, value: &Value) -> Result<f64, MappingError> {
        // NUMERIC columns may arrive as JSON numbers or as strings.
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(field, format!("expected a number, got {value}")))
    }

    fn number(&self, field: &'static str) -> Result<f64, MappingError> {
        self.number_from(field, self.required(field)?)
    }

    fn optional_number(&self, field: &'static str) -> Result<Option<f64>, MappingError> {
        self.present(field)
            .map(|v| self.number_from(field, v))
            .transpose()
    }

    fn integer(&self, field: &'static str) -> Result<i64, MappingError> {
        let value = self.required(field)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(field, format!("expected an integer, got {value}")))
    }

    /// Numeric or string value rendered as text, exactly as the store
    /// printed it.
    fn text(&self, field: &'static str) -> Result<String, MappingError> {
        match self.required(field)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.invalid(field, format!("expected text or a number, got {other}"))),
        }
    }

    fn timestamp(&self, field: &'static str) -> Result<DateTime<Utc>, MappingError> {
        let raw = self.string(field)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| self.invalid(field, e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Per-table mapping
// ---------------------------------------------------------------------------

impl Product {
    pub fn from_row(row: &Row) -> Result<Self, MappingError> {
        let f = Fields::new(Table::Products, row);
        Ok(Self {
            id: f.uuid("id")?,
            name: f.string("name")?,
            price: f.number("price")?,
            rating: f.optional_number("rating")?,
            stock_quantity: f.integer("stock_quantity")?,
        })
    }
}

impl NewProduct {
    /// The snake_case row to insert. `id` and `created_at` are left to the
    /// store.
    pub fn into_row(self) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), json!(self.name));
        row.insert("price".into(), json!(self.price));
        row.insert("rating".into(), json!(self.rating));
        row.insert("stock_quantity".into(), json!(self.stock_quantity));
        row
    }
}

impl User {
    pub fn from_row(row: &Row) -> Result<Self, MappingError> {
        let f = Fields::new(Table::Users, row);
        Ok(Self {
            id: f.uuid("id")?,
            name: f.string("name")?,
            email: f.string("email")?,
        })
    }
}

impl SalesSummary {
    pub fn from_row(row: &Row) -> Result<Self, MappingError> {
        let f = Fields::new(Table::SalesSummary, row);
        Ok(Self {
            id: f.uuid("id")?,
            total_value: f.number("total_value")?,
            change_percentage: f.optional_number("change_percentage")?,
            date: f.timestamp("date")?,
        })
    }
}

impl PurchaseSummary {
    pub fn from_row(row: &Row) -> Result<Self, MappingError> {
        let f = Fields::new(Table::PurchaseSummary, row);
        Ok(Self {
            id: f.uuid("id")?,
            total_purchased: f.number("total_purchased")?,
            change_percentage: f.optional_number("change_percentage")?,
            date: f.timestamp("date")?,
        })
    }
}

impl ExpenseSummary {
    pub fn from_row(row: &Row) -> Result<Self, MappingError> {
        let f = Fields::new(Table::ExpenseSummary, row);
        Ok(Self {
            id: f.uuid("id")?,
            total_expenses: f.number("total_expenses")?,
            date: f.timestamp("date")?,
        })
    }
}

impl ExpenseByCategorySummary {
    pub fn from_row(row: &Row) -> Result<Self, MappingError> {
        let f = Fields::new(Table::ExpenseByCategory, row);
        Ok(Self {
            id: f.uuid("id")?,
            category: f.string("category")?,
            amount: f.text("amount")?,
            date: f.timestamp("date")?,
        })
    }
}

/// Map a whole row set, failing on the first bad row.
pub fn map_rows<T>(
    rows: &[Row],
    map: impl Fn(&Row) -> Result<T, MappingError>,
) -> Result<Vec<T>, MappingError> {
    rows.iter().map(map).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    const ID: &str = "e5c42436-0674-49e5-8ef5-347656d973ae";

    #[test]
    fn product_fields_are_renamed() {
        let p = Product::from_row(&row(json!({
            "id": ID, "name": "Wireless Mouse", "price": 24.99, "rating": 4.5,
            "stock_quantity": 500, "created_at": "2024-01-01T00:00:00+00:00"
        })))
        .unwrap();

        assert_eq!(p.stock_quantity, 500);
        assert_eq!(p.rating, Some(4.5));

        let wire = serde_json::to_value(&p).unwrap();
        assert_eq!(wire["stockQuantity"], 500);
        assert!(wire.get("stock_quantity").is_none());
        assert!(wire.get("createdAt").is_none());
    }

    #[test]
    fn null_rating_maps_to_none() {
        let p = Product::from_row(&row(json!({
            "id": ID, "name": "Desk Lamp", "price": "32.00", "rating": null, "stock_quantity": 75
        })))
        .unwrap();
        assert_eq!(p.rating, None);
        assert_eq!(p.price, 32.0);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = Product::from_row(&row(json!({ "id": ID, "price": 1, "stock_quantity": 1 })))
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingField { table: Table::Products, field: "name" }
        );
    }

    #[test]
    fn wrong_type_is_an_error() {
        let err = User::from_row(&row(json!({ "id": ID, "name": 7, "email": "a@b.c" })))
            .unwrap_err();
        assert!(matches!(err, MappingError::InvalidField { field: "name", .. }));
    }

    #[test]
    fn amount_is_rendered_as_text() {
        let numeric = ExpenseByCategorySummary::from_row(&row(json!({
            "id": ID, "category": "Office", "amount": 4500.75, "date": "2024-04-01T00:00:00Z"
        })))
        .unwrap();
        let whole = ExpenseByCategorySummary::from_row(&row(json!({
            "id": ID, "category": "Salaries", "amount": 32000, "date": "2024-04-01T00:00:00Z"
        })))
        .unwrap();
        let textual = ExpenseByCategorySummary::from_row(&row(json!({
            "id": ID, "category": "Travel", "amount": "2299.00", "date": "2024-04-01T00:00:00Z"
        })))
        .unwrap();

        assert_eq!(numeric.amount, "4500.75");
        assert_eq!(whole.amount, "32000");
        assert_eq!(textual.amount, "2299.00");
    }

    #[test]
    fn postgres_timestamps_parse() {
        let s = SalesSummary::from_row(&row(json!({
            "id": ID, "total_value": 1, "change_percentage": null,
            "date": "2024-03-01T00:00:00.123+02:00"
        })))
        .unwrap();
        assert_eq!(s.date.to_rfc3339(), "2024-02-29T22:00:00.123+00:00");
    }

    #[test]
    fn new_product_row_uses_storage_names() {
        let r = NewProduct {
            name: "Pen".into(),
            price: 1.5,
            rating: None,
            stock_quantity: 10,
        }
        .into_row();

        assert_eq!(r["stock_quantity"], 10);
        assert_eq!(r["rating"], Value::Null);
        assert!(!r.contains_key("id"));
    }
}
