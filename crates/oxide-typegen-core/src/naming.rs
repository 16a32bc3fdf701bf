//! Naming conventions shared by the synthesizers.
//!
//! Every generated name is a pure function of catalog names, so repeated
//! discovery passes always produce identical type names.

use heck::ToUpperCamelCase;

use crate::metadata::Parameter;

/// Common prefix of every annotation marker.
pub const ANNOTATION_PREFIX: &str = "@oxide:";

/// Marker that opens a field annotation line.
pub const FIELD_MARKER: &str = "@oxide:field";

/// Marker that opens a type annotation line.
pub const TYPE_MARKER: &str = "@oxide:type";

/// Marker that opens a mutation annotation block.
pub const MUTATION_MARKER: &str = "@oxide:mutation";

/// Name of the structured payload parameter.
pub const PAYLOAD_PARAMETER: &str = "input_payload";

/// Native types accepted for the structured payload parameter.
pub const PAYLOAD_NATIVE_TYPES: &[&str] = &["jsonb", "json"];

/// Prefix carried by business parameters, stripped from field names.
pub const BUSINESS_PREFIX: &str = "p_";

/// Prefix carried by environment-supplied context parameters.
pub const CONTEXT_PREFIX: &str = "auth_";

/// Context parameters with a canonical logical key.
pub const CANONICAL_CONTEXT_KEYS: &[(&str, &str)] = &[
    ("auth_tenant_id", "tenant_id"),
    ("auth_user_id", "user_id"),
];

const FUNCTION_PREFIX: &str = "fn_";
const COMPOSITE_PREFIX: &str = "type_";
const INPUT_SUFFIX: &str = "_input";

/// Drops a leading `schema.` qualifier, if any.
#[must_use]
pub fn strip_schema(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, bare)| bare)
}

/// Returns the composite input type conventionally paired with a function.
///
/// `fn_create_contact` and `create_contact` both map to
/// `type_create_contact_input`.
#[must_use]
pub fn composite_input_type_name(function_name: &str) -> String {
    let base = strip_schema(function_name);
    let base = base.strip_prefix(FUNCTION_PREFIX).unwrap_or(base);
    format!("{COMPOSITE_PREFIX}{base}{INPUT_SUFFIX}")
}

/// Returns the generated input type name for a function or composite type.
#[must_use]
pub fn input_type_name(source_name: &str) -> String {
    let base = strip_schema(source_name);
    let base = base
        .strip_prefix(FUNCTION_PREFIX)
        .or_else(|| base.strip_prefix(COMPOSITE_PREFIX))
        .unwrap_or(base);
    let base = base.strip_suffix(INPUT_SUFFIX).unwrap_or(base);
    format!("{}Input", base.to_upper_camel_case())
}

/// Returns the input field name for a business parameter.
#[must_use]
pub fn business_field_name(parameter_name: &str) -> &str {
    match parameter_name.strip_prefix(BUSINESS_PREFIX) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => parameter_name,
    }
}

/// Returns true if a parameter name follows the context convention.
#[must_use]
pub fn is_context_parameter_name(name: &str) -> bool {
    name.len() > CONTEXT_PREFIX.len() && name.starts_with(CONTEXT_PREFIX)
}

/// Derives the logical context key for a parameter name.
///
/// Canonical names map to their canonical key; other prefixed names lose
/// the prefix; names without the prefix are kept as-is.
#[must_use]
pub fn context_key(parameter_name: &str) -> String {
    if let Some((_, key)) = CANONICAL_CONTEXT_KEYS
        .iter()
        .find(|(name, _)| *name == parameter_name)
    {
        return (*key).to_string();
    }
    match parameter_name.strip_prefix(CONTEXT_PREFIX) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => parameter_name.to_string(),
    }
}

/// Returns true for the structured payload parameter.
#[must_use]
pub fn is_payload_parameter(parameter: &Parameter) -> bool {
    parameter.name == PAYLOAD_PARAMETER
        && PAYLOAD_NATIVE_TYPES.contains(&parameter.native_type.trim().to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_input_type_name() {
        assert_eq!(
            composite_input_type_name("fn_create_contact"),
            "type_create_contact_input"
        );
        assert_eq!(
            composite_input_type_name("app.create_contact"),
            "type_create_contact_input"
        );
    }

    #[test]
    fn test_input_type_name_is_stable_across_sources() {
        assert_eq!(input_type_name("fn_create_contact"), "CreateContactInput");
        assert_eq!(input_type_name("create_contact"), "CreateContactInput");
        assert_eq!(
            input_type_name("app.type_create_contact_input"),
            "CreateContactInput"
        );
        assert_eq!(input_type_name("create_contact"), input_type_name("create_contact"));
    }

    #[test]
    fn test_business_field_name() {
        assert_eq!(business_field_name("p_contact_id"), "contact_id");
        assert_eq!(business_field_name("contact_id"), "contact_id");
        assert_eq!(business_field_name("p_"), "p_");
    }

    #[test]
    fn test_context_key() {
        assert_eq!(context_key("auth_tenant_id"), "tenant_id");
        assert_eq!(context_key("auth_user_id"), "user_id");
        assert_eq!(context_key("auth_organization_id"), "organization_id");
        assert_eq!(context_key("tenant"), "tenant");
        assert!(is_context_parameter_name("auth_region"));
        assert!(!is_context_parameter_name("auth_"));
        assert!(!is_context_parameter_name("p_auth_id"));
    }

    #[test]
    fn test_payload_parameter() {
        assert!(is_payload_parameter(&Parameter::new("input_payload", "jsonb")));
        assert!(is_payload_parameter(&Parameter::new("input_payload", "JSON")));
        assert!(!is_payload_parameter(&Parameter::new("input_payload", "text")));
        assert!(!is_payload_parameter(&Parameter::new("payload", "jsonb")));
    }
}
