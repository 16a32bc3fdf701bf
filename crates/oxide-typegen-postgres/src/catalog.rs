//! PostgreSQL catalog reader.
//!
//! Every query here is a plain `SELECT` against `pg_catalog`. Nothing in
//! this module writes to the database.

use oxide_typegen_core::catalog::CatalogReader;
use oxide_typegen_core::metadata::{
    Attribute, CompositeTypeMetadata, FunctionMetadata, Parameter, ParameterMode,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use crate::error::Result;

/// SQL to look up a standalone composite type and its comment.
pub const COMPOSITE_TYPE_SQL: &str = r#"
SELECT t.oid::int8 AS type_oid,
       obj_description(t.oid, 'pg_type') AS comment
FROM pg_catalog.pg_type t
JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
JOIN pg_catalog.pg_class c ON c.oid = t.typrelid
WHERE t.typname = $1
  AND n.nspname = $2
  AND t.typtype = 'c'
  AND c.relkind = 'c'
"#;

/// SQL to list the live attributes of a composite type in ordinal order.
pub const ATTRIBUTES_SQL: &str = r#"
SELECT a.attname::text AS name,
       format_type(a.atttypid, a.atttypmod) AS native_type,
       a.attnum::int4 AS position,
       col_description(t.typrelid, a.attnum) AS comment
FROM pg_catalog.pg_type t
JOIN pg_catalog.pg_attribute a ON a.attrelid = t.typrelid
WHERE t.oid = $1::int8::oid
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY a.attnum
"#;

/// Columns shared by the function queries. Argument names, modes and type
/// names come back as parallel arrays and are zipped in Rust.
const FUNCTION_SELECT: &str = r#"
SELECT n.nspname::text AS schema_name,
       p.proname::text AS function_name,
       pg_catalog.pg_get_function_result(p.oid) AS return_type,
       obj_description(p.oid, 'pg_proc') AS comment,
       l.lanname::text AS language,
       COALESCE(p.proargnames, ARRAY[]::text[]) AS arg_names,
       COALESCE(p.proargmodes::text[], ARRAY[]::text[]) AS arg_modes,
       ARRAY(
           SELECT format_type(arg.type_oid, NULL)
           FROM unnest(COALESCE(p.proallargtypes, p.proargtypes::oid[]))
                WITH ORDINALITY AS arg(type_oid, ord)
           ORDER BY arg.ord
       ) AS arg_types,
       p.pronargdefaults::int4 AS n_defaults
FROM pg_catalog.pg_proc p
JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace
JOIN pg_catalog.pg_language l ON l.oid = p.prolang
WHERE n.nspname = $1
  AND p.prokind = 'f'
"#;

type FunctionRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Vec<String>,
    Vec<String>,
    Vec<String>,
    i32,
);

/// Reads composite types and functions from a PostgreSQL catalog.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Creates a catalog reader over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a pool of `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn read_composite_type(
        &self,
        name: &str,
        schema: &str,
    ) -> Result<Option<CompositeTypeMetadata>> {
        let row: Option<(i64, Option<String>)> = sqlx::query_as(COMPOSITE_TYPE_SQL)
            .bind(name)
            .bind(schema)
            .fetch_optional(&self.pool)
            .await?;

        let Some((type_oid, comment)) = row else {
            debug!(schema, type_name = name, "composite type not found");
            return Ok(None);
        };

        let rows: Vec<(String, String, i32, Option<String>)> = sqlx::query_as(ATTRIBUTES_SQL)
            .bind(type_oid)
            .fetch_all(&self.pool)
            .await?;

        let attributes = rows
            .into_iter()
            .map(|(name, native_type, position, comment)| Attribute {
                name,
                native_type,
                position,
                comment,
            })
            .collect();

        Ok(Some(CompositeTypeMetadata {
            schema: schema.to_string(),
            name: name.to_string(),
            attributes,
            comment,
        }))
    }

    async fn read_functions(&self, schema: &str, name: Option<&str>) -> Result<Vec<FunctionMetadata>> {
        let sql = match name {
            Some(_) => format!("{FUNCTION_SELECT}  AND p.proname = $2\nORDER BY p.oid\nLIMIT 1"),
            None => format!("{FUNCTION_SELECT}ORDER BY p.proname, p.oid"),
        };

        let mut query = sqlx::query_as::<_, FunctionRow>(&sql).bind(schema);
        if let Some(name) = name {
            query = query.bind(name);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(function_from_row).collect())
    }
}

impl CatalogReader for PgCatalog {
    type Error = crate::error::PgCatalogError;

    async fn discover_composite_type(
        &self,
        name: &str,
        schema: &str,
    ) -> Result<Option<CompositeTypeMetadata>> {
        self.read_composite_type(name, schema).await
    }

    async fn discover_function(&self, name: &str, schema: &str) -> Result<Option<FunctionMetadata>> {
        Ok(self.read_functions(schema, Some(name)).await?.into_iter().next())
    }

    async fn list_functions(&self, schema: &str) -> Result<Vec<FunctionMetadata>> {
        self.read_functions(schema, None).await
    }
}

fn function_from_row(row: FunctionRow) -> FunctionMetadata {
    let (schema, name, return_type, comment, language, arg_names, arg_modes, arg_types, n_defaults) =
        row;
    FunctionMetadata {
        schema,
        name,
        parameters: assemble_parameters(&arg_names, &arg_modes, &arg_types, n_defaults),
        return_type: return_type.unwrap_or_default(),
        comment,
        language,
    }
}

/// Zips the parallel `pg_proc` argument arrays into parameters.
///
/// `modes` is empty when every argument is IN. Defaults belong to the last
/// `n_defaults` input arguments. Unnamed arguments are called `$1`, `$2`, ...
#[must_use]
pub fn assemble_parameters(
    names: &[String],
    modes: &[String],
    types: &[String],
    n_defaults: i32,
) -> Vec<Parameter> {
    let mut parameters: Vec<Parameter> = types
        .iter()
        .enumerate()
        .map(|(i, native_type)| {
            let name = names
                .get(i)
                .filter(|n| !n.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("${}", i + 1));
            let mode = modes.get(i).map_or(ParameterMode::In, |m| parse_mode(m));
            Parameter {
                name,
                native_type: native_type.clone(),
                mode,
                has_default: false,
            }
        })
        .collect();

    let remaining = usize::try_from(n_defaults).unwrap_or(0);
    parameters
        .iter_mut()
        .rev()
        .filter(|p| p.mode != ParameterMode::Out)
        .take(remaining)
        .for_each(|p| p.has_default = true);

    parameters
}

/// Maps a `proargmodes` code to a parameter mode.
#[must_use]
pub fn parse_mode(code: &str) -> ParameterMode {
    match code {
        "o" | "t" => ParameterMode::Out,
        "b" => ParameterMode::InOut,
        _ => ParameterMode::In,
    }
}
