//! Annotation blocks embedded in catalog comments.
//!
//! Comments may carry free text around a single marker block. Only the
//! block is read; everything else in the comment is ignored.
//!
//! # Field annotations
//!
//! One line, the marker followed by a comma-separated `key=value` list:
//!
//! ```text
//! @oxide:field name=email,type=String!,required=true,description=Primary email
//! ```
//!
//! A segment without `=` continues the previous value, so descriptions may
//! contain commas.
//!
//! # Type annotations
//!
//! Same line grammar as field annotations, on a composite type comment:
//!
//! ```text
//! @oxide:type description=Fields accepted when creating a contact
//! ```
//!
//! # Mutation annotations
//!
//! The marker on its own line, then one `key=value` per line until a blank
//! line, a line that is not `key=value`, or the end of the comment:
//!
//! ```text
//! @oxide:mutation
//! name=createContact
//! success_type=CreateContactSuccess
//! failure_type=CreateContactError
//! context_params=[auth_tenant_id, auth_user_id]
//! ```
//!
//! `context_params` is always an inline bracketed list of bare identifiers.
//! There is no quoting or escaping inside the list.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;
use crate::naming::{ANNOTATION_PREFIX, FIELD_MARKER, MUTATION_MARKER, TYPE_MARKER};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid identifier regex"));

static BLOCK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").expect("Invalid block line regex")
});

/// Metadata declared on a composite type attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAnnotation {
    /// Declared field name.
    pub name: String,
    /// Declared target type (e.g. `String!`), if any.
    pub type_name: Option<String>,
    /// Whether the field is required.
    pub required: bool,
    /// Whether the field is an enum.
    pub is_enum: bool,
    /// Field description.
    pub description: Option<String>,
}

/// Metadata declared on a composite type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    /// Type description.
    pub description: Option<String>,
}

/// Metadata declared on a mutation function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationAnnotation {
    /// Mutation name exposed to clients.
    pub name: String,
    /// Mutation description.
    pub description: Option<String>,
    /// Registry name of the success result type.
    pub success_type: String,
    /// Registry name of the failure result type.
    pub failure_type: String,
    /// Explicit composite input type, possibly schema-qualified.
    pub input_type: Option<String>,
    /// Explicit context parameter names, in declaration order.
    pub context_params: Option<Vec<String>>,
}

/// Parses a field annotation, returning `None` when absent or unusable.
#[must_use]
pub fn parse_field_annotation(comment: &str) -> Option<FieldAnnotation> {
    FieldAnnotation::parse(comment).ok()
}

/// Parses a type annotation, returning `None` when absent or unusable.
#[must_use]
pub fn parse_type_annotation(comment: &str) -> Option<TypeAnnotation> {
    TypeAnnotation::parse(comment).ok()
}

/// Parses a mutation annotation, returning `None` when absent or unusable.
#[must_use]
pub fn parse_mutation_annotation(comment: &str) -> Option<MutationAnnotation> {
    MutationAnnotation::parse(comment).ok()
}

/// Returns true if the comment carries a mutation marker line.
#[must_use]
pub fn has_mutation_marker(comment: &str) -> bool {
    comment
        .lines()
        .any(|line| strip_marker(line.trim(), MUTATION_MARKER).is_some())
}

/// Returns the free text of a comment that precedes any annotation marker.
#[must_use]
pub fn description_text(comment: &str) -> Option<String> {
    let text = comment
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with(ANNOTATION_PREFIX))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(text)
}

impl FieldAnnotation {
    /// Parses the field annotation block of a comment.
    pub fn parse(comment: &str) -> Result<Self, AnnotationError> {
        let payload = comment
            .lines()
            .find_map(|line| strip_marker(line.trim(), FIELD_MARKER))
            .ok_or(AnnotationError::MissingMarker)?;

        let mut name = None;
        let mut type_name = None;
        let mut required = false;
        let mut is_enum = false;
        let mut description = None;

        for (key, value) in split_pairs(payload)? {
            match key.as_str() {
                "name" => name = non_empty(value),
                "type" => type_name = non_empty(value),
                "required" => required = is_true(&value),
                "enum" => is_enum = is_true(&value),
                "description" => description = non_empty(value),
                _ => {}
            }
        }

        Ok(Self {
            name: name.ok_or(AnnotationError::MissingKey("name"))?,
            type_name,
            required,
            is_enum,
            description,
        })
    }
}

impl TypeAnnotation {
    /// Parses the type annotation line of a comment.
    pub fn parse(comment: &str) -> Result<Self, AnnotationError> {
        let payload = comment
            .lines()
            .find_map(|line| strip_marker(line.trim(), TYPE_MARKER))
            .ok_or(AnnotationError::MissingMarker)?;

        let mut annotation = Self::default();
        for (key, value) in split_pairs(payload)? {
            if key == "description" {
                annotation.description = non_empty(value);
            }
        }
        Ok(annotation)
    }
}

impl MutationAnnotation {
    /// Parses the mutation annotation block of a comment.
    pub fn parse(comment: &str) -> Result<Self, AnnotationError> {
        let mut lines = comment.lines().map(str::trim);
        let inline = lines
            .by_ref()
            .find_map(|line| strip_marker(line, MUTATION_MARKER))
            .ok_or(AnnotationError::MissingMarker)?;
        if !inline.is_empty() {
            return Err(AnnotationError::Malformed(format!(
                "unexpected text after marker: '{inline}'"
            )));
        }

        let mut name = None;
        let mut description = None;
        let mut success_type = None;
        let mut failure_type = None;
        let mut input_type = None;
        let mut context_params = None;

        for line in lines {
            let Some(caps) = BLOCK_LINE.captures(line) else {
                break;
            };
            let value = unquote(&caps[2]);
            match &caps[1] {
                "name" => name = non_empty(value),
                "description" => description = non_empty(value),
                "success_type" => success_type = non_empty(value),
                "failure_type" => failure_type = non_empty(value),
                "input_type" => input_type = non_empty(value),
                "context_params" => context_params = Some(parse_identifier_list(&value)?),
                _ => {}
            }
        }

        Ok(Self {
            name: name.ok_or(AnnotationError::MissingKey("name"))?,
            description,
            success_type: success_type.ok_or(AnnotationError::MissingKey("success_type"))?,
            failure_type: failure_type.ok_or(AnnotationError::MissingKey("failure_type"))?,
            input_type,
            context_params,
        })
    }
}

/// Returns the text after `marker` if `line` starts with it as a whole word.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Splits `a=1,b=2` into pairs, folding `=`-less segments into the
/// previous value.
fn split_pairs(payload: &str) -> Result<Vec<(String, String)>, AnnotationError> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for segment in payload.split(',') {
        let pair = segment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v))
            .filter(|(k, _)| IDENTIFIER.is_match(k));

        match (pair, pairs.last_mut()) {
            (Some((key, value)), _) => pairs.push((key.to_string(), value.to_string())),
            (None, Some((_, previous))) => {
                previous.push(',');
                previous.push_str(segment);
            }
            (None, None) if segment.trim().is_empty() => {}
            (None, None) => {
                return Err(AnnotationError::Malformed(format!(
                    "expected key=value, found '{}'",
                    segment.trim()
                )));
            }
        }
    }

    Ok(pairs
        .into_iter()
        .map(|(key, value)| (key, unquote(&value)))
        .collect())
}

/// Parses `[a, b, c]` into identifiers.
fn parse_identifier_list(value: &str) -> Result<Vec<String>, AnnotationError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| {
            AnnotationError::Malformed(format!("context_params must be a [list], found '{value}'"))
        })?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(str::trim)
        .map(|item| {
            if IDENTIFIER.is_match(item) {
                Ok(item.to_string())
            } else {
                Err(AnnotationError::Malformed(format!(
                    "invalid context parameter name '{item}'"
                )))
            }
        })
        .collect()
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
