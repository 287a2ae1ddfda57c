//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::ScopedCache;
use crate::config::AccessSettings;
use crate::db::DataStore;
use crate::pagination::Paginator;
use crate::services::tokens::{TokenHasher, TokenHasherError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    TokenHasher(#[from] TokenHasherError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the store, the list cache and the request-independent helpers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn DataStore>,
    cache: ScopedCache,
    paginator: Paginator,
    tokens: TokenHasher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `settings` - Cache, paging and token settings
    /// * `store` - Backing data store
    ///
    /// # Errors
    ///
    /// Returns an error if the token pepper cannot key the hasher.
    pub fn new(settings: &AccessSettings, store: Arc<dyn DataStore>) -> Result<Self, StateError> {
        let cache = ScopedCache::new(settings.cache_ttl, settings.cache_capacity);
        let tokens = TokenHasher::new(&settings.token_pepper)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                store,
                cache,
                paginator: Paginator::new(settings.page_size),
                tokens,
            }),
        })
    }

    /// Get a reference to the data store.
    #[must_use]
    pub fn store(&self) -> &dyn DataStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the list cache.
    #[must_use]
    pub fn cache(&self) -> &ScopedCache {
        &self.inner.cache
    }

    #[must_use]
    pub fn paginator(&self) -> &Paginator {
        &self.inner.paginator
    }

    /// Get a reference to the API token hasher.
    #[must_use]
    pub fn tokens(&self) -> &TokenHasher {
        &self.inner.tokens
    }
}
