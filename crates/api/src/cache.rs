//! Per-identity caching of list query results.
//!
//! Cache keys are built only by [`CacheKey`]'s constructors. Read paths and
//! write-triggered invalidation both go through them, so a key populated by
//! a list call is exactly the key a later write removes.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bilemo_core::Identity;
use moka::future::Cache;
use tracing::debug;

use crate::models::{Phone, User};

/// Resource tags for cached collections.
#[derive(Debug, Clone, Copy)]
enum ResourceTag {
    Phones,
    Users,
}

impl ResourceTag {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Phones => "phones",
            Self::Users => "users",
        }
    }
}

/// A cache key: a resource tag, plus the identity name for identity-scoped
/// resources.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// The shared phone catalog.
    #[must_use]
    pub fn phones() -> Self {
        Self(ResourceTag::Phones.as_str().to_owned())
    }

    /// The users owned by `identity`.
    #[must_use]
    pub fn users(identity: &Identity) -> Self {
        Self(format!("{}:{}", ResourceTag::Users.as_str(), identity.name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Phones(Arc<Vec<Phone>>),
    Users(Arc<Vec<User>>),
}

/// A value type that can live in the cache.
pub trait Cacheable: Send + Sync + Sized + 'static {
    fn wrap(value: Arc<Self>) -> CacheValue;
    fn unwrap(value: CacheValue) -> Option<Arc<Self>>;
}

impl Cacheable for Vec<Phone> {
    fn wrap(value: Arc<Self>) -> CacheValue {
        CacheValue::Phones(value)
    }

    fn unwrap(value: CacheValue) -> Option<Arc<Self>> {
        match value {
            CacheValue::Phones(phones) => Some(phones),
            CacheValue::Users(_) => None,
        }
    }
}

impl Cacheable for Vec<User> {
    fn wrap(value: Arc<Self>) -> CacheValue {
        CacheValue::Users(value)
    }

    fn unwrap(value: CacheValue) -> Option<Arc<Self>> {
        match value {
            CacheValue::Users(users) => Some(users),
            CacheValue::Phones(_) => None,
        }
    }
}

/// TTL cache for list results, keyed by [`CacheKey`].
#[derive(Clone)]
pub struct ScopedCache {
    entries: Cache<CacheKey, CacheValue>,
}

impl ScopedCache {
    #[must_use]
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    /// Return the cached value for `key`, or run `compute` and cache its
    /// result.
    ///
    /// A failed `compute` stores nothing and its error is returned as is.
    ///
    /// # Errors
    ///
    /// Returns whatever error `compute` returns.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<Arc<T>, E>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.entries.get(key).await.and_then(T::unwrap) {
            debug!(%key, "Cache hit");
            return Ok(value);
        }

        debug!(%key, "Cache miss");
        let value = Arc::new(compute().await?);
        self.entries
            .insert(key.clone(), T::wrap(Arc::clone(&value)))
            .await;
        Ok(value)
    }

    /// Remove `key`. Removing a missing key is a no-op.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key).await;
        debug!(%key, "Cache invalidated");
    }

    /// Whether `key` currently holds a value.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bilemo_core::{CustomerId, CustomerName, PhoneId};

    use super::*;
    use crate::models::PhoneDetails;

    fn cache() -> ScopedCache {
        ScopedCache::new(Duration::from_secs(3600), 100)
    }

    fn identity(name: &str) -> Identity {
        Identity::new(CustomerId::new(1), CustomerName::from(name))
    }

    fn catalog() -> Vec<Phone> {
        vec![Phone {
            id: PhoneId::new(1),
            details: PhoneDetails::default(),
        }]
    }

    async fn load(cache: &ScopedCache, calls: &AtomicUsize) -> Arc<Vec<Phone>> {
        cache
            .get_or_compute(&CacheKey::phones(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(catalog())
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_keys() {
        assert_eq!(CacheKey::phones().as_str(), "phones");
        assert_eq!(CacheKey::users(&identity("alice")).as_str(), "users:alice");
        assert_ne!(
            CacheKey::users(&identity("alice")),
            CacheKey::users(&identity("bob"))
        );
    }

    #[tokio::test]
    async fn test_hit_skips_compute() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        load(&cache, &calls).await;
        load(&cache, &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&CacheKey::phones()));
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        load(&cache, &calls).await;
        cache.invalidate(&CacheKey::phones()).await;
        assert!(!cache.contains(&CacheKey::phones()));

        load(&cache, &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let cache = cache();
        let key = CacheKey::users(&identity("alice"));

        cache.invalidate(&key).await;
        cache.invalidate(&key).await;

        assert!(!cache.contains(&key));
    }

    #[tokio::test]
    async fn test_failed_compute_is_not_cached() {
        let cache = cache();
        let key = CacheKey::users(&identity("alice"));

        let result = cache
            .get_or_compute(&key, || async { Err::<Vec<User>, _>("store down") })
            .await;

        assert_eq!(result.unwrap_err(), "store down");
        assert!(!cache.contains(&key));
    }

    #[tokio::test]
    async fn test_identities_do_not_share_entries() {
        let cache = cache();
        let alice = CacheKey::users(&identity("alice"));
        let bob = CacheKey::users(&identity("bob"));

        cache
            .get_or_compute(&alice, || async { Ok::<Vec<User>, Infallible>(Vec::new()) })
            .await
            .unwrap();

        assert!(cache.contains(&alice));
        assert!(!cache.contains(&bob));
    }
}
