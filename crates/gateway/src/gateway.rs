//! The data gateway.
//!
//! `Gateway` is the five request handlers over one shared [`Backend`]:
//! 1. Build the query (via the `db` repository functions).
//! 2. Await the round trip(s); the dashboard aggregate runs five at once.
//! 3. Map rows into view models.
//! 4. Wrap any failure into [`GatewayError::BackendOperationFailed`].
//!
//! No handler retries, paginates, or depends on another. The gateway holds
//! no state between calls.

use std::sync::Arc;

use tracing::{error, info, instrument};

use db::{Backend, Row};
use db::repository::{expenses, products, summaries, users};

use crate::{
    GatewayError,
    mapping::{map_rows, MappingError},
    models::{
        DashboardMetrics, ExpenseByCategorySummary, ExpenseSummary, NewProduct, Product,
        PurchaseSummary, SalesSummary, User,
    },
};

/// How many products the dashboard shows, by stock on hand.
pub const POPULAR_PRODUCTS_LIMIT: usize = 5;

/// Stateless handler set. Cheap to clone; clones share the backend client.
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn Backend>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Assemble the dashboard from five concurrent reads.
    ///
    /// All-or-nothing: the first failing read fails the whole call and the
    /// remaining in-flight reads are dropped. No partial result is returned.
    #[instrument(skip(self))]
    pub async fn fetch_dashboard_metrics(&self) -> Result<DashboardMetrics, GatewayError> {
        let backend = self.backend.as_ref();

        let (popular, sales, purchases, expense_totals, by_category) = tokio::try_join!(
            products::top_by_stock(backend, POPULAR_PRODUCTS_LIMIT),
            summaries::sales(backend),
            summaries::purchases(backend),
            summaries::expenses(backend),
            expenses::by_category(backend),
        )
        .map_err(|e| fail("fetch_dashboard_metrics", e))?;

        let metrics = assemble_metrics(popular, sales, purchases, expense_totals, by_category)
            .map_err(|e| fail("fetch_dashboard_metrics", e))?;

        Ok(metrics)
    }

    /// Every product, or those whose name contains `search` ignoring case.
    /// `None` and an empty string both mean "no filter".
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, search: Option<&str>) -> Result<Vec<Product>, GatewayError> {
        let rows = products::list(self.backend.as_ref(), search)
            .await
            .map_err(|e| fail("fetch_products", e))?;

        map_rows(&rows, Product::from_row).map_err(|e| fail("fetch_products", e))
    }

    /// Insert one product and return it as stored.
    ///
    /// Nothing is checked up front; a negative price or stock, or a rating
    /// outside 0–5, is rejected by the store and nothing is persisted.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, GatewayError> {
        let row = products::insert(self.backend.as_ref(), input.into_row())
            .await
            .map_err(|e| fail("create_product", e))?;

        let product = Product::from_row(&row).map_err(|e| fail("create_product", e))?;
        info!(id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn fetch_users(&self) -> Result<Vec<User>, GatewayError> {
        let rows = users::list(self.backend.as_ref())
            .await
            .map_err(|e| fail("fetch_users", e))?;

        map_rows(&rows, User::from_row).map_err(|e| fail("fetch_users", e))
    }

    /// Category breakdown, largest amount first.
    #[instrument(skip(self))]
    pub async fn fetch_expenses_by_category(
        &self,
    ) -> Result<Vec<ExpenseByCategorySummary>, GatewayError> {
        let rows = expenses::by_category(self.backend.as_ref())
            .await
            .map_err(|e| fail("fetch_expenses_by_category", e))?;

        map_rows(&rows, ExpenseByCategorySummary::from_row)
            .map_err(|e| fail("fetch_expenses_by_category", e))
    }
}

fn assemble_metrics(
    popular: Vec<Row>,
    sales: Vec<Row>,
    purchases: Vec<Row>,
    expense_totals: Vec<Row>,
    by_category: Vec<Row>,
) -> Result<DashboardMetrics, MappingError> {
    Ok(DashboardMetrics {
        popular_products: map_rows(&popular, Product::from_row)?,
        sales_summary: map_rows(&sales, SalesSummary::from_row)?,
        purchase_summary: map_rows(&purchases, PurchaseSummary::from_row)?,
        expense_summary: map_rows(&expense_totals, ExpenseSummary::from_row)?,
        expense_by_category_summary: map_rows(&by_category, ExpenseByCategorySummary::from_row)?,
    })
}

/// Log the underlying failure, then collapse it into the caller-facing
/// envelope.
fn fail<E>(operation: &'static str, err: E) -> GatewayError
where
    E: std::fmt::Display + Into<GatewayError>,
{
    error!(operation, "backend operation failed: {}", err);
    err.into()
}
