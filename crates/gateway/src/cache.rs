//! Cache tags and a tag-invalidated query cache.
//!
//! Every read declares the resource tags it *provides*; every write declares
//! the tags it *invalidates*. [`CachedGateway`] serves repeated reads from
//! [`QueryCache`] until a successful write evicts entries carrying one of
//! its tags. Failures are never cached.
//!
//! Each tag has a generation counter, bumped on every invalidation. An
//! entry remembers the generation it was fetched under and is only stored
//! or served while that generation is current, so a read that was in
//! flight across a write never repopulates the cache with its snapshot.

use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Gateway, GatewayError,
    models::{DashboardMetrics, ExpenseByCategorySummary, NewProduct, Product, User},
};

// ---------------------------------------------------------------------------
// Tags and endpoints
// ---------------------------------------------------------------------------

/// Resource kinds a cached read can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheTag {
    DashboardMetrics,
    Products,
    Users,
    Expenses,
}

impl CacheTag {
    pub const ALL: [CacheTag; 4] = [
        Self::DashboardMetrics,
        Self::Products,
        Self::Users,
        Self::Expenses,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DashboardMetrics => "DashboardMetrics",
            Self::Products => "Products",
            Self::Users => "Users",
            Self::Expenses => "Expenses",
        }
    }
}

impl std::fmt::Display for CacheTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The gateway's operations, with their cache-tag contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DashboardMetrics,
    Products,
    CreateProduct,
    Users,
    ExpensesByCategory,
}

impl Endpoint {
    /// Tags attached to this endpoint's cached result.
    pub fn provides(self) -> &'static [CacheTag] {
        match self {
            Self::DashboardMetrics => &[CacheTag::DashboardMetrics],
            Self::Products => &[CacheTag::Products],
            Self::Users => &[CacheTag::Users],
            Self::ExpensesByCategory => &[CacheTag::Expenses],
            Self::CreateProduct => &[],
        }
    }

    /// Tags made stale by a successful call.
    pub fn invalidates(self) -> &'static [CacheTag] {
        match self {
            Self::CreateProduct => &[CacheTag::Products, CacheTag::DashboardMetrics],
            _ => &[],
        }
    }
}

/// Render a tag list for a header or log line: `"Products, DashboardMetrics"`.
pub fn join_tags(tags: &[CacheTag]) -> String {
    tags.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// QueryCache
// ---------------------------------------------------------------------------

/// Identifies one cached result: the endpoint plus its argument, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: Endpoint,
    pub arg: Option<String>,
}

impl CacheKey {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint, arg: None }
    }

    pub fn with_arg(endpoint: Endpoint, arg: impl Into<String>) -> Self {
        Self {
            endpoint,
            arg: Some(arg.into()),
        }
    }

    fn tags(&self) -> &'static [CacheTag] {
        self.endpoint.provides()
    }
}

/// Size and expiry limits for a [`QueryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Most entries held at once; the least useful are evicted beyond it.
    pub max_capacity: u64,
    /// Entries not read for this long are dropped.
    pub time_to_idle: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            time_to_idle: Duration::from_secs(300),
        }
    }
}

#[derive(Clone)]
struct Entry {
    generation: u64,
    value: Arc<dyn Any + Send + Sync>,
}

/// Typed results keyed by [`CacheKey`], bounded in size and idle time.
pub struct QueryCache {
    entries: Cache<CacheKey, Entry>,
    generations: [AtomicU64; CacheTag::ALL.len()],
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_idle(config.time_to_idle)
                .build(),
            generations: Default::default(),
        }
    }

    /// Current generation of the tags `key` depends on. Take it before
    /// fetching and hand it to [`QueryCache::put`].
    pub fn generation(&self, key: &CacheKey) -> u64 {
        key.tags()
            .iter()
            .map(|tag| self.generations[tag.index()].load(Ordering::Acquire))
            .sum()
    }

    /// The cached value for `key`, if present, still current and of type `T`.
    pub fn get<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.entries.get(key)?;
        if entry.generation != self.generation(key) {
            self.entries.invalidate(key);
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Store `value` if none of its tags were invalidated since
    /// `generation` was read. Returns whether it was stored.
    pub fn put<T>(&self, key: CacheKey, value: T, generation: u64) -> bool
    where
        T: Send + Sync + 'static,
    {
        if generation != self.generation(&key) {
            return false;
        }
        self.entries.insert(
            key,
            Entry {
                generation,
                value: Arc::new(value),
            },
        );
        true
    }

    /// Evict every entry carrying any of `tags`. Returns how many went.
    pub fn invalidate(&self, tags: &[CacheTag]) -> usize {
        for tag in tags {
            self.generations[tag.index()].fetch_add(1, Ordering::AcqRel);
        }

        let stale: Vec<Arc<CacheKey>> = self
            .entries
            .iter()
            .filter(|(key, _)| key.tags().iter().any(|t| tags.contains(t)))
            .map(|(key, _)| key)
            .collect();
        for key in &stale {
            self.entries.invalidate(key.as_ref());
        }
        stale.len()
    }

    /// Number of live entries, after pending evictions have run.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// CachedGateway
// ---------------------------------------------------------------------------

/// [`Gateway`] behind a [`QueryCache`].
pub struct CachedGateway {
    gateway: Gateway,
    cache: QueryCache,
}

impl CachedGateway {
    pub fn new(gateway: Gateway) -> Self {
        Self::with_config(gateway, CacheConfig::default())
    }

    pub fn with_config(gateway: Gateway, config: CacheConfig) -> Self {
        Self {
            gateway,
            cache: QueryCache::new(config),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn fetch_dashboard_metrics(&self) -> Result<DashboardMetrics, GatewayError> {
        self.cached(
            CacheKey::new(Endpoint::DashboardMetrics),
            self.gateway.fetch_dashboard_metrics(),
        )
        .await
    }

    pub async fn fetch_products(&self, search: Option<&str>) -> Result<Vec<Product>, GatewayError> {
        // "" and None run the same query, so they share an entry.
        let key = match search.filter(|s| !s.is_empty()) {
            Some(s) => CacheKey::with_arg(Endpoint::Products, s),
            None => CacheKey::new(Endpoint::Products),
        };
        self.cached(key, self.gateway.fetch_products(search)).await
    }

    pub async fn fetch_users(&self) -> Result<Vec<User>, GatewayError> {
        self.cached(CacheKey::new(Endpoint::Users), self.gateway.fetch_users())
            .await
    }

    pub async fn fetch_expenses_by_category(
        &self,
    ) -> Result<Vec<ExpenseByCategorySummary>, GatewayError> {
        self.cached(
            CacheKey::new(Endpoint::ExpensesByCategory),
            self.gateway.fetch_expenses_by_category(),
        )
        .await
    }

    /// Create, then invalidate `Products` and `DashboardMetrics`. A failed
    /// create leaves the cache untouched.
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, GatewayError> {
        let product = self.gateway.create_product(input).await?;

        let tags = Endpoint::CreateProduct.invalidates();
        let evicted = self.cache.invalidate(tags);
        debug!(tags = %join_tags(tags), evicted, "cache invalidated");

        Ok(product)
    }

    /// Serve `key` from the cache, or await `fetch` and store its success.
    /// `fetch` is lazy: it is only polled on a miss.
    async fn cached<T, F>(&self, key: CacheKey, fetch: F) -> Result<T, GatewayError>
    where
        T: Clone + Send + Sync + 'static,
        F: Future<Output = Result<T, GatewayError>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            debug!(endpoint = ?key.endpoint, arg = ?key.arg, "cache hit");
            return Ok(hit);
        }

        let generation = self.cache.generation(&key);
        let value = fetch.await?;
        let endpoint = key.endpoint;
        if !self.cache.put(key, value.clone(), generation) {
            debug!(?endpoint, "invalidated while in flight; not cached");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_current<T: Send + Sync + 'static>(cache: &QueryCache, key: CacheKey, value: T) {
        let generation = cache.generation(&key);
        assert!(cache.put(key, value, generation));
    }

    #[test]
    fn create_product_invalidates_products_and_dashboard() {
        assert_eq!(
            Endpoint::CreateProduct.invalidates(),
            &[CacheTag::Products, CacheTag::DashboardMetrics]
        );
        assert_eq!(Endpoint::Users.invalidates(), &[] as &[CacheTag]);
    }

    #[test]
    fn reads_provide_their_resource_tag() {
        assert_eq!(Endpoint::DashboardMetrics.provides(), &[CacheTag::DashboardMetrics]);
        assert_eq!(Endpoint::Products.provides(), &[CacheTag::Products]);
        assert_eq!(Endpoint::Users.provides(), &[CacheTag::Users]);
        assert_eq!(Endpoint::ExpensesByCategory.provides(), &[CacheTag::Expenses]);
    }

    #[test]
    fn tags_join_for_headers() {
        assert_eq!(
            join_tags(Endpoint::CreateProduct.invalidates()),
            "Products, DashboardMetrics"
        );
    }

    #[test]
    fn invalidate_evicts_only_matching_tags() {
        let cache = QueryCache::default();
        put_current(&cache, CacheKey::new(Endpoint::Products), vec![1u8]);
        put_current(&cache, CacheKey::with_arg(Endpoint::Products, "pen"), vec![2u8]);
        put_current(&cache, CacheKey::new(Endpoint::Users), vec![3u8]);

        let evicted = cache.invalidate(&[CacheTag::Products]);

        assert_eq!(evicted, 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<Vec<u8>>(&CacheKey::new(Endpoint::Users)), Some(vec![3]));
    }

    #[test]
    fn get_with_wrong_type_misses() {
        let cache = QueryCache::default();
        put_current(&cache, CacheKey::new(Endpoint::Users), 42u32);
        assert_eq!(cache.get::<String>(&CacheKey::new(Endpoint::Users)), None);
    }

    #[test]
    fn put_after_invalidation_is_refused() {
        let cache = QueryCache::default();
        let key = CacheKey::new(Endpoint::Products);
        let before = cache.generation(&key);

        cache.invalidate(&[CacheTag::Products]);

        assert!(!cache.put(key.clone(), vec![1u8], before));
        assert_eq!(cache.get::<Vec<u8>>(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn unrelated_invalidation_keeps_generation() {
        let cache = QueryCache::default();
        let key = CacheKey::new(Endpoint::Users);
        let before = cache.generation(&key);

        cache.invalidate(&[CacheTag::Products, CacheTag::DashboardMetrics]);

        assert_eq!(cache.generation(&key), before);
        assert!(cache.put(key, vec![1u8], before));
    }

    #[test]
    fn capacity_bounds_distinct_keys() {
        let cache = QueryCache::new(CacheConfig {
            max_capacity: 50,
            ..CacheConfig::default()
        });

        for i in 0..500 {
            put_current(&cache, CacheKey::with_arg(Endpoint::Products, format!("q{i}")), i);
        }

        assert!(cache.len() <= 50, "{} entries", cache.len());
    }

    #[test]
    fn idle_entries_expire() {
        let cache = QueryCache::new(CacheConfig {
            max_capacity: 10,
            time_to_idle: Duration::from_millis(20),
        });
        let key = CacheKey::new(Endpoint::Users);
        put_current(&cache, key.clone(), 1u8);

        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(cache.get::<u8>(&key), None);
    }
}
