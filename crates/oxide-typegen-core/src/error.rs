//! Error types for catalog-driven type generation.
//!
//! Only [`TypegenError`] ever leaves the engine. Annotation problems,
//! unresolved registry references and per-target timeouts are recovered
//! locally and surface as a [`SkipReason`] in the discovery report.

use std::time::Duration;

/// Errors that abort a discovery pass.
#[derive(Debug, thiserror::Error)]
pub enum TypegenError {
    /// The catalog store could not be read (connectivity, permissions,
    /// a failing catalog query).
    #[error("Catalog error: {0}")]
    Catalog(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (reading a type registry, writing generated artifacts).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TypegenError {
    /// Wraps a catalog driver error.
    pub fn catalog<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Catalog(Box::new(err))
    }
}

/// Result type for type generation operations.
pub type Result<T> = std::result::Result<T, TypegenError>;

/// Why an annotation block could not be turned into metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    /// The comment does not carry the annotation marker at all.
    #[error("annotation marker not found")]
    MissingMarker,

    /// A mandatory key is absent from the block.
    #[error("missing required key '{0}'")]
    MissingKey(&'static str),

    /// The block is present but structurally invalid.
    #[error("malformed annotation: {0}")]
    Malformed(String),
}

impl AnnotationError {
    /// Returns true when the marker was present but the block was unusable.
    ///
    /// A missing marker is the ordinary "not annotated" case and is not
    /// worth a diagnostic.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        !matches!(self, Self::MissingMarker)
    }
}

/// Why a single candidate function produced no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The mutation annotation carries the marker but does not parse.
    MalformedAnnotation(AnnotationError),
    /// The declared success or failure type is not in the registry.
    UnresolvedTypeReference {
        /// Which side of the result was missing (`success` or `failure`).
        role: &'static str,
        /// The type name that was looked up.
        type_name: String,
    },
    /// The target did not finish within the per-target timeout.
    TimedOut(Duration),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedAnnotation(err) => write!(f, "malformed mutation annotation ({err})"),
            Self::UnresolvedTypeReference { role, type_name } => {
                write!(f, "{role} type '{type_name}' is not registered")
            }
            Self::TimedOut(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display_is_one_line() {
        let reasons = [
            SkipReason::MalformedAnnotation(AnnotationError::MissingKey("success_type")),
            SkipReason::UnresolvedTypeReference {
                role: "failure",
                type_name: "CreateContactError".into(),
            },
            SkipReason::TimedOut(Duration::from_millis(1500)),
        ];

        for reason in &reasons {
            let text = reason.to_string();
            assert!(!text.contains('\n'), "multi-line reason: {text}");
        }
        assert_eq!(
            reasons[1].to_string(),
            "failure type 'CreateContactError' is not registered"
        );
        assert_eq!(reasons[2].to_string(), "timed out after 1500ms");
    }

    #[test]
    fn test_missing_marker_is_not_diagnostic() {
        assert!(!AnnotationError::MissingMarker.is_diagnostic());
        assert!(AnnotationError::MissingKey("name").is_diagnostic());
        assert!(AnnotationError::Malformed("x".into()).is_diagnostic());
    }

    #[test]
    fn test_catalog_error_wraps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TypegenError::catalog(io);
        assert!(err.to_string().starts_with("Catalog error:"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
