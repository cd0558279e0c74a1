//! `gateway` crate — the dashboard's data gateway.
//!
//! Five handlers over one [`db::Backend`]: fetch the dashboard aggregate,
//! list or create products, list users, and list expenses by category.
//! Rows come back snake_case and leave as camelCase view models; every
//! failure leaves as one [`GatewayError`] envelope.

pub mod models;
pub mod error;
pub mod mapping;
pub mod gateway;
pub mod cache;

pub use models::{
    DashboardMetrics, ExpenseByCategorySummary, ExpenseSummary, NewProduct, Product,
    PurchaseSummary, SalesSummary, User,
};
pub use error::GatewayError;
pub use gateway::Gateway;
pub use cache::{CacheConfig, CacheTag, CachedGateway, Endpoint, QueryCache};
