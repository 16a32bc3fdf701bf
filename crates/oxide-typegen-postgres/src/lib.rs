//! # oxide-typegen-postgres
//!
//! PostgreSQL driver for `oxide-typegen-core`.
//!
//! [`PgCatalog`] implements
//! [`CatalogReader`](oxide_typegen_core::catalog::CatalogReader) with
//! read-only queries against `pg_catalog`:
//!
//! - **Composite types** come from `pg_type` / `pg_class` (`relkind = 'c'`)
//!   with attributes from `pg_attribute`, skipping dropped and system
//!   columns, in `attnum` order. Comments are read with `obj_description`
//!   and `col_description`.
//! - **Functions** come from `pg_proc` (`prokind = 'f'`). Argument names,
//!   modes and types are fetched as arrays in one round trip and zipped by
//!   [`assemble_parameters`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxide_typegen_core::prelude::*;
//! use oxide_typegen_postgres::PgCatalog;
//!
//! let catalog = PgCatalog::connect("postgres://localhost/app", 5).await?;
//! let registry = TypeMap::load("types.json")?;
//! let report = Discovery::new(catalog, registry).run("app").await?;
//! println!("{report}");
//! ```

mod catalog;
pub mod error;

pub use catalog::{ATTRIBUTES_SQL, COMPOSITE_TYPE_SQL, PgCatalog, assemble_parameters, parse_mode};
pub use error::{PgCatalogError, Result};
