//! Native catalog type to target scalar mapping.
//!
//! Mapping is pure: the same native type text and nullability always
//! produce the same [`TypeRef`]. Unrecognized native types fall back to
//! [`ScalarType::Json`]; callers that care use [`ScalarType::from_native`]
//! to notice the fallback and warn.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target scalar types exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// `true` / `false`.
    Boolean,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// Double precision float.
    Float,
    /// Arbitrary precision decimal.
    Decimal,
    /// Text.
    String,
    /// UUID identifier.
    Uuid,
    /// Timestamp.
    DateTime,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Opaque JSON value; the fallback for unknown native types.
    Json,
}

impl ScalarType {
    /// Returns the client-facing scalar name.
    #[must_use]
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::BigInt => "BigInt",
            Self::Float => "Float",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Uuid => "UUID",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Json => "JSON",
        }
    }

    /// Parses a client-facing scalar name (`String`, `UUID`, ...).
    ///
    /// A trailing `!` is accepted and ignored.
    #[must_use]
    pub fn from_graphql_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_end_matches('!');
        Some(match name {
            "Boolean" => Self::Boolean,
            "Int" => Self::Int,
            "BigInt" => Self::BigInt,
            "Float" => Self::Float,
            "Decimal" => Self::Decimal,
            "String" => Self::String,
            "UUID" | "ID" => Self::Uuid,
            "DateTime" => Self::DateTime,
            "Date" => Self::Date,
            "Time" => Self::Time,
            "JSON" => Self::Json,
            _ => return None,
        })
    }

    /// Maps a scalar native type, returning `None` if it is not recognized.
    ///
    /// Array types are not scalars; see [`map_native_type`].
    #[must_use]
    pub fn from_native(native_type: &str) -> Option<Self> {
        let normalized = normalize(native_type);
        Some(match normalized.as_str() {
            "bool" | "boolean" => Self::Boolean,
            "int2" | "int4" | "smallint" | "integer" | "int" | "serial" | "smallserial" => {
                Self::Int
            }
            "int8" | "bigint" | "bigserial" => Self::BigInt,
            "real" | "float4" | "float8" | "double precision" | "float" => Self::Float,
            "numeric" | "decimal" | "money" => Self::Decimal,
            "text" | "varchar" | "character varying" | "char" | "character" | "bpchar"
            | "citext" | "name" => Self::String,
            "uuid" => Self::Uuid,
            "timestamp" | "timestamptz" | "timestamp with time zone"
            | "timestamp without time zone" => Self::DateTime,
            "date" => Self::Date,
            "time" | "timetz" | "time with time zone" | "time without time zone" => Self::Time,
            "json" | "jsonb" => Self::Json,
            _ => return None,
        })
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.graphql_name())
    }
}

/// The shape of a field type: a scalar or a list of another type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// A single scalar value.
    Scalar(ScalarType),
    /// A list of values.
    List(Box<TypeRef>),
}

/// A field type with its nullability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Scalar or list shape.
    pub kind: TypeKind,
    /// Whether the value may be null.
    pub nullable: bool,
}

impl TypeRef {
    /// Creates a scalar type reference.
    #[must_use]
    pub fn scalar(scalar: ScalarType, nullable: bool) -> Self {
        Self {
            kind: TypeKind::Scalar(scalar),
            nullable,
        }
    }

    /// Creates a list type reference.
    #[must_use]
    pub fn list(element: TypeRef, nullable: bool) -> Self {
        Self {
            kind: TypeKind::List(Box::new(element)),
            nullable,
        }
    }

    /// Returns the innermost scalar.
    #[must_use]
    pub fn base_scalar(&self) -> ScalarType {
        match &self.kind {
            TypeKind::Scalar(scalar) => *scalar,
            TypeKind::List(element) => element.base_scalar(),
        }
    }

    /// Replaces the innermost scalar, keeping the list shape and
    /// nullability.
    #[must_use]
    pub fn with_base_scalar(self, scalar: ScalarType) -> Self {
        let kind = match self.kind {
            TypeKind::Scalar(_) => TypeKind::Scalar(scalar),
            TypeKind::List(element) => TypeKind::List(Box::new(element.with_base_scalar(scalar))),
        };
        Self {
            kind,
            nullable: self.nullable,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Scalar(scalar) => write!(f, "{scalar}")?,
            TypeKind::List(element) => write!(f, "[{element}]")?,
        }
        if !self.nullable {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// Maps a native type to a target type reference.
///
/// Array elements are non-null; unrecognized scalars become JSON.
#[must_use]
pub fn map_native_type(native_type: &str, nullable: bool) -> TypeRef {
    let trimmed = native_type.trim();
    if let Some(element) = trimmed.strip_suffix("[]") {
        return TypeRef::list(map_native_type(element, false), nullable);
    }
    TypeRef::scalar(
        ScalarType::from_native(trimmed).unwrap_or(ScalarType::Json),
        nullable,
    )
}

/// Returns true if the native type (or its array element) is recognized.
#[must_use]
pub fn is_known_native_type(native_type: &str) -> bool {
    let mut trimmed = native_type.trim();
    while let Some(element) = trimmed.strip_suffix("[]") {
        trimmed = element.trim_end();
    }
    ScalarType::from_native(trimmed).is_some()
}

/// Lower-cases and strips type modifiers: `VARCHAR(255)` becomes `varchar`.
fn normalize(native_type: &str) -> String {
    let lowered = native_type.trim().to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut depth = 0usize;
    for ch in lowered.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
