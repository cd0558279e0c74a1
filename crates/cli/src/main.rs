//! `dashboard-gateway` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`          — start the API server.
//! - `migrate`        — apply the schema and seed migrations.
//! - `dashboard`      — print the dashboard aggregate.
//! - `products`       — print products, optionally filtered by name.
//! - `users`          — print all users.
//! - `expenses`       — print expenses by category.
//! - `create-product` — insert one product and print it.
//!
//! Every command except `migrate` accepts `--memory` to run against the
//! seeded in-memory store instead of Postgres.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use db::{Backend, MemoryBackend, PgBackend};
use gateway::{CachedGateway, Gateway, NewProduct};

use config::Config;

#[derive(Parser)]
#[command(
    name = "dashboard-gateway",
    about = "Typed data gateway for the inventory dashboard",
    version
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Run pending database migrations (schema, policies, seed data).
    Migrate,
    #[command(flatten)]
    Query(Query),
}

/// One-shot gateway calls that print their result as JSON.
#[derive(Subcommand)]
enum Query {
    /// Print the dashboard aggregate.
    Dashboard,
    /// Print products, optionally filtered by a case-insensitive name match.
    Products {
        #[arg(long)]
        search: Option<String>,
    },
    /// Print all users.
    Users,
    /// Print expenses by category, largest first.
    Expenses,
    /// Insert a product and print the stored row.
    CreateProduct {
        #[arg(long)]
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        price: f64,
        #[arg(long)]
        rating: Option<f64>,
        #[arg(long = "stock", allow_negative_numbers = true)]
        stock_quantity: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Migrate => migrate(&cli.config).await,
        Command::Serve { bind } => serve(&bind, &cli.config).await,
        Command::Query(query) => {
            let gateway = Gateway::new(connect(&cli.config).await?);
            query.run(&gateway).await
        }
    }
}

async fn serve(bind: &str, config: &Config) -> Result<()> {
    let gateway = Gateway::new(connect(config).await?);
    info!("Starting API server on {bind}");
    let state = api::AppState::new(CachedGateway::with_config(gateway, config.cache()));
    api::serve(bind, state).await.context("API server failed")
}

impl Query {
    async fn run(self, gateway: &Gateway) -> Result<()> {
        match self {
            Self::Dashboard => print_json(&gateway.fetch_dashboard_metrics().await?),
            Self::Products { search } => {
                print_json(&gateway.fetch_products(search.as_deref()).await?)
            }
            Self::Users => print_json(&gateway.fetch_users().await?),
            Self::Expenses => print_json(&gateway.fetch_expenses_by_category().await?),
            Self::CreateProduct {
                name,
                price,
                rating,
                stock_quantity,
            } => {
                let input = NewProduct {
                    name,
                    price,
                    rating,
                    stock_quantity,
                };
                print_json(&gateway.create_product(input).await?)
            }
        }
    }
}

async fn migrate(config: &Config) -> Result<()> {
    let database_url = config.require_database_url()?;
    info!("Running migrations");
    let pool = db::pool::create_pool(database_url, 2)
        .await
        .context("failed to connect to database")?;
    db::pool::run_migrations(&pool)
        .await
        .context("migration failed")?;
    info!("Migrations applied successfully");
    Ok(())
}

/// Pick the store: the seeded in-memory one, or Postgres.
async fn connect(config: &Config) -> Result<Arc<dyn Backend>> {
    if config.memory {
        info!("Using seeded in-memory store");
        return Ok(Arc::new(MemoryBackend::seeded()));
    }

    let database_url = config.require_database_url()?;
    let pool = db::pool::create_pool(database_url, config.max_connections)
        .await
        .context("failed to connect to database")?;
    Ok(Arc::new(PgBackend::new(pool)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
