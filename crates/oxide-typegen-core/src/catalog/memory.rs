//! In-memory catalog.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::CatalogReader;
use crate::metadata::{CompositeTypeMetadata, FunctionMetadata, qualified};

/// Failure raised by [`StaticCatalog`] for objects marked unreachable.
#[derive(Debug, Clone, thiserror::Error)]
#[error("catalog unavailable for '{0}'")]
pub struct StaticCatalogError(pub String);

/// A [`CatalogReader`] over fixed metadata.
///
/// Useful for tests and for generating types from metadata exported
/// elsewhere. Lookups are counted so callers can observe caching.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    types: HashMap<String, CompositeTypeMetadata>,
    functions: Vec<FunctionMetadata>,
    unreachable: HashSet<String>,
    latency: Option<Duration>,
    type_lookups: AtomicUsize,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a composite type.
    #[must_use]
    pub fn with_composite_type(mut self, ty: CompositeTypeMetadata) -> Self {
        self.types.insert(ty.qualified_name(), ty);
        self
    }

    /// Adds a function.
    #[must_use]
    pub fn with_function(mut self, function: FunctionMetadata) -> Self {
        self.functions.push(function);
        self
    }

    /// Makes every lookup of `schema.name` fail.
    #[must_use]
    pub fn unreachable(mut self, qualified_name: impl Into<String>) -> Self {
        self.unreachable.insert(qualified_name.into());
        self
    }

    /// Delays every composite type lookup.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of composite type lookups served so far.
    #[must_use]
    pub fn type_lookups(&self) -> usize {
        self.type_lookups.load(Ordering::SeqCst)
    }

    fn check_reachable(&self, key: &str) -> Result<(), StaticCatalogError> {
        if self.unreachable.contains(key) {
            Err(StaticCatalogError(key.to_string()))
        } else {
            Ok(())
        }
    }
}

impl CatalogReader for StaticCatalog {
    type Error = StaticCatalogError;

    async fn discover_composite_type(
        &self,
        name: &str,
        schema: &str,
    ) -> Result<Option<CompositeTypeMetadata>, Self::Error> {
        self.type_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let key = qualified(schema, name);
        self.check_reachable(&key)?;
        Ok(self.types.get(&key).cloned())
    }

    async fn discover_function(
        &self,
        name: &str,
        schema: &str,
    ) -> Result<Option<FunctionMetadata>, Self::Error> {
        self.check_reachable(&qualified(schema, name))?;
        Ok(self
            .functions
            .iter()
            .find(|f| f.schema == schema && f.name == name)
            .cloned())
    }

    async fn list_functions(&self, schema: &str) -> Result<Vec<FunctionMetadata>, Self::Error> {
        self.check_reachable(schema)?;
        let mut functions: Vec<FunctionMetadata> = self
            .functions
            .iter()
            .filter(|f| f.schema == schema)
            .cloned()
            .collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(functions)
    }
}
