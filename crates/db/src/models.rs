//! Table descriptors and the loose row / query shapes exchanged with a
//! [`Backend`](crate::Backend).
//!
//! These are *persistence* shapes: rows are keyed by snake_case column name
//! and carry no domain behaviour. Typed view models live in the `gateway`
//! crate.

use serde::{Deserialize, Serialize};

/// A row as handed back by the store: column name → JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Every table the gateway reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    Users,
    SalesSummary,
    PurchaseSummary,
    ExpenseSummary,
    ExpenseByCategory,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Products,
        Table::Users,
        Table::SalesSummary,
        Table::PurchaseSummary,
        Table::ExpenseSummary,
        Table::ExpenseByCategory,
    ];

    /// SQL identifier of the table.
    pub fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Users => "users",
            Self::SalesSummary => "sales_summary",
            Self::PurchaseSummary => "purchase_summary",
            Self::ExpenseSummary => "expense_summary",
            Self::ExpenseByCategory => "expense_by_category",
        }
    }

    /// Column whitelist. Only these identifiers are ever interpolated into SQL.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Products => &["id", "name", "price", "rating", "stock_quantity", "created_at"],
            Self::Users => &["id", "name", "email", "created_at"],
            Self::SalesSummary => &["id", "total_value", "change_percentage", "date", "created_at"],
            Self::PurchaseSummary => {
                &["id", "total_purchased", "change_percentage", "date", "created_at"]
            }
            Self::ExpenseSummary => &["id", "total_expenses", "date", "created_at"],
            Self::ExpenseByCategory => &["id", "category", "amount", "date", "created_at"],
        }
    }

    /// Columns that must be present (and non-null) on insert. `id` and
    /// `created_at` are generated by the store.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Products => &["name", "price", "stock_quantity"],
            Self::Users => &["name", "email"],
            Self::SalesSummary => &["total_value", "date"],
            Self::PurchaseSummary => &["total_purchased", "date"],
            Self::ExpenseSummary => &["total_expenses", "date"],
            Self::ExpenseByCategory => &["category", "amount", "date"],
        }
    }

    /// NUMERIC columns read back as their exact decimal text rather than as
    /// a JSON number, which would go through a float.
    pub fn text_columns(self) -> &'static [&'static str] {
        match self {
            Self::ExpenseByCategory => &["amount"],
            _ => &[],
        }
    }

    /// Whether this client is allowed to insert rows.
    ///
    /// Mirrors the access policy in the schema migration: `products` and
    /// `users` accept inserts, the summary tables are read-only.
    pub fn accepts_inserts(self) -> bool {
        matches!(self, Self::Products | Self::Users)
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Row filter applied by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column` contains `needle`, ignoring case. The needle is matched
    /// literally: `%` and `_` carry no wildcard meaning.
    ContainsIgnoreCase {
        column: &'static str,
        needle: String,
    },
}

/// Sort order applied by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

/// A single read against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: Table,
    pub filter: Option<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl From<Table> for TableQuery {
    fn from(table: Table) -> Self {
        Self {
            table,
            filter: None,
            order: None,
            limit: None,
        }
    }
}

impl TableQuery {
    pub fn contains_ignore_case(mut self, column: &'static str, needle: impl Into<String>) -> Self {
        self.filter = Some(Filter::ContainsIgnoreCase {
            column,
            needle: needle.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &'static str, descending: bool) -> Self {
        self.order = Some(Order { column, descending });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Every column this query references, for whitelist checks.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        let filter = self.filter.iter().map(|f| match f {
            Filter::ContainsIgnoreCase { column, .. } => *column,
        });
        let order = self.order.iter().map(|o| o.column);
        filter.chain(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_filter_order_and_limit() {
        let q = TableQuery::from(Table::Products)
            .contains_ignore_case("name", "pen")
            .order_by("stock_quantity", true)
            .limit(5);

        assert_eq!(q.table, Table::Products);
        assert_eq!(q.limit, Some(5));
        assert_eq!(
            q.referenced_columns().collect::<Vec<_>>(),
            vec!["name", "stock_quantity"]
        );
    }

    #[test]
    fn only_products_and_users_accept_inserts() {
        let writable: Vec<_> = Table::ALL.into_iter().filter(|t| t.accepts_inserts()).collect();
        assert_eq!(writable, vec![Table::Products, Table::Users]);
    }

    #[test]
    fn required_columns_are_whitelisted() {
        for table in Table::ALL {
            for col in table.text_columns() {
                assert!(table.has_column(col), "{table}.{col} missing from whitelist");
            }
            for col in table.required_columns() {
                assert!(table.has_column(col), "{table}.{col} missing from whitelist");
            }
        }
    }
}
