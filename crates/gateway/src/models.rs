//! View models — the camelCase shapes handed to the dashboard.
//!
//! Storage uses snake_case columns; renaming them is the only reshaping the
//! gateway does. Audit timestamps (`created_at`) are never surfaced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Products and users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub rating: Option<f64>,
    pub stock_quantity: i64,
}

/// Input for [`Gateway::create_product`](crate::Gateway::create_product).
///
/// Nothing is validated here; the store's constraints decide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Dated summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub id: Uuid,
    pub total_value: f64,
    pub change_percentage: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub id: Uuid,
    pub total_purchased: f64,
    pub change_percentage: Option<f64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub id: Uuid,
    pub total_expenses: f64,
    pub date: DateTime<Utc>,
}

/// One category's spend. `amount` is numeric in storage but always text here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseByCategorySummary {
    pub id: Uuid,
    pub category: String,
    pub amount: String,
    pub date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Everything the dashboard's landing page shows, assembled from five reads.
/// Recomputed on every fetch, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Top products by stock on hand, at most five.
    pub popular_products: Vec<Product>,
    pub sales_summary: Vec<SalesSummary>,
    pub purchase_summary: Vec<PurchaseSummary>,
    pub expense_summary: Vec<ExpenseSummary>,
    pub expense_by_category_summary: Vec<ExpenseByCategorySummary>,
}
