//! Error types for the PostgreSQL catalog reader.

/// Errors raised while reading the PostgreSQL catalog.
#[derive(Debug, thiserror::Error)]
pub enum PgCatalogError {
    /// Database error (connectivity, permissions, a failing catalog query).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for catalog reads.
pub type Result<T> = std::result::Result<T, PgCatalogError>;
