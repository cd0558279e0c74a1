//! Repository functions — one function per backend call.
//!
//! Every function takes a `&dyn Backend` and returns loose rows in a
//! `Result<_, DbError>`. No mapping, no domain types; the query shape
//! (filter, order, limit) is all that lives here.

pub mod products;
pub mod users;
pub mod summaries;
pub mod expenses;
