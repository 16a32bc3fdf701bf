//! Read-only catalog access.
//!
//! Driver crates (oxide-typegen-postgres, etc.) implement
//! [`CatalogReader`] against a live database. The core crate defines the
//! trait, an in-memory [`StaticCatalog`] and the [`CachedCatalog`]
//! wrapper so it stays driver-agnostic.
//!
//! Implementations must never issue writes. A missing type or function is
//! reported as `Ok(None)`; `Err` is reserved for infrastructure failures.

mod cache;
mod memory;

use std::future::Future;
use std::sync::Arc;

pub use cache::CachedCatalog;
pub use memory::StaticCatalog;

use crate::metadata::{CompositeTypeMetadata, FunctionMetadata};

/// Reads composite types and function signatures from a catalog.
pub trait CatalogReader: Send + Sync {
    /// Error type for infrastructure failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Looks up a composite type and its ordered attributes.
    fn discover_composite_type(
        &self,
        name: &str,
        schema: &str,
    ) -> impl Future<Output = Result<Option<CompositeTypeMetadata>, Self::Error>> + Send;

    /// Looks up a single function by name.
    ///
    /// When the name is overloaded, the first signature in catalog order is
    /// returned.
    fn discover_function(
        &self,
        name: &str,
        schema: &str,
    ) -> impl Future<Output = Result<Option<FunctionMetadata>, Self::Error>> + Send;

    /// Lists every function of a schema, ordered by name.
    fn list_functions(
        &self,
        schema: &str,
    ) -> impl Future<Output = Result<Vec<FunctionMetadata>, Self::Error>> + Send;
}

impl<C: CatalogReader> CatalogReader for Arc<C> {
    type Error = C::Error;

    fn discover_composite_type(
        &self,
        name: &str,
        schema: &str,
    ) -> impl Future<Output = Result<Option<CompositeTypeMetadata>, Self::Error>> + Send {
        (**self).discover_composite_type(name, schema)
    }

    fn discover_function(
        &self,
        name: &str,
        schema: &str,
    ) -> impl Future<Output = Result<Option<FunctionMetadata>, Self::Error>> + Send {
        (**self).discover_function(name, schema)
    }

    fn list_functions(
        &self,
        schema: &str,
    ) -> impl Future<Output = Result<Vec<FunctionMetadata>, Self::Error>> + Send {
        (**self).list_functions(schema)
    }
}
