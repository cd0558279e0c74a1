//! `db` crate — pure persistence layer.
//!
//! Provides the [`Backend`] client trait with a Postgres and an in-memory
//! implementation, a connection pool, embedded migrations, the demo seed
//! dataset, and repository functions for every table in the dashboard
//! schema. No business logic and no view models live here.

pub mod error;
pub mod pool;
pub mod models;
pub mod backend;
pub mod postgres;
pub mod memory;
pub mod seed;
pub mod repository;

pub use pool::DbPool;
pub use error::DbError;
pub use backend::Backend;
pub use models::{Row, Table, TableQuery};
pub use postgres::PgBackend;
pub use memory::MemoryBackend;
