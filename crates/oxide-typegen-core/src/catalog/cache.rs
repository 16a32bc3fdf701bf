//! Composite type cache with single-flight population.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use super::CatalogReader;
use crate::metadata::{CompositeTypeMetadata, FunctionMetadata, qualified};

type Slot = Arc<OnceCell<Option<CompositeTypeMetadata>>>;

/// Caches composite type lookups of an inner [`CatalogReader`].
///
/// Each fully-qualified type name gets one slot. The first caller fills it
/// while concurrent callers for the same name wait on the same slot, so a
/// type is read from the catalog at most once per cache. Absent types are
/// cached too; failed lookups are not, and the next caller retries.
///
/// Function lookups pass straight through.
#[derive(Debug)]
pub struct CachedCatalog<C> {
    inner: C,
    types: Mutex<HashMap<String, Slot>>,
}

impl<C: CatalogReader> CachedCatalog<C> {
    /// Wraps a catalog reader.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            types: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the wrapped reader.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of populated cache entries.
    pub fn cached_types(&self) -> usize {
        self.lock().values().filter(|slot| slot.initialized()).count()
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.types.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &str) -> Slot {
        Arc::clone(self.lock().entry(key.to_string()).or_default())
    }
}

impl<C: CatalogReader> CatalogReader for CachedCatalog<C> {
    type Error = C::Error;

    async fn discover_composite_type(
        &self,
        name: &str,
        schema: &str,
    ) -> Result<Option<CompositeTypeMetadata>, Self::Error> {
        let key = qualified(schema, name);
        let slot = self.slot(&key);
        let cached = slot
            .get_or_try_init(|| async {
                debug!(type_name = %key, "composite type cache miss");
                self.inner.discover_composite_type(name, schema).await
            })
            .await?;
        Ok(cached.clone())
    }

    async fn discover_function(
        &self,
        name: &str,
        schema: &str,
    ) -> Result<Option<FunctionMetadata>, Self::Error> {
        self.inner.discover_function(name, schema).await
    }

    async fn list_functions(&self, schema: &str) -> Result<Vec<FunctionMetadata>, Self::Error> {
        self.inner.list_functions(schema).await
    }
}
