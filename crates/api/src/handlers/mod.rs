//! One module per resource. Handlers delegate to the cached gateway and
//! attach the cache-tag headers for their endpoint.

pub mod dashboard;
pub mod products;
pub mod users;
pub mod expenses;

use axum::http::HeaderName;
use gateway::{cache::join_tags, Endpoint};

/// Tags provided by a read response.
pub const CACHE_TAGS: HeaderName = HeaderName::from_static("x-cache-tags");
/// Tags made stale by a write response.
pub const INVALIDATED_TAGS: HeaderName = HeaderName::from_static("x-invalidated-tags");

pub(crate) fn provided(endpoint: Endpoint) -> [(HeaderName, String); 1] {
    [(CACHE_TAGS, join_tags(endpoint.provides()))]
}

pub(crate) fn invalidated(endpoint: Endpoint) -> [(HeaderName, String); 1] {
    [(INVALIDATED_TAGS, join_tags(endpoint.invalidates()))]
}
