//! Context parameter classification.
//!
//! Context parameters carry caller identity and tenancy. The serving layer
//! fills them from the request environment; they must never be exposed to
//! clients as input fields.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::MutationAnnotation;
use crate::metadata::FunctionMetadata;
use crate::naming::{context_key, is_context_parameter_name};

/// Ordered mapping from logical context key to parameter name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextParameterMap(IndexMap<String, String>);

impl ContextParameterMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter under `key`.
    ///
    /// A parameter is never dropped: when `key` is already bound to another
    /// parameter, the raw parameter name is used instead, then `key_2`,
    /// `key_3`, ... A parameter that is already mapped is left alone.
    pub fn insert(&mut self, key: impl Into<String>, parameter: impl Into<String>) {
        let key = key.into();
        let parameter = parameter.into();
        if self.contains_parameter(&parameter) {
            return;
        }

        let key = if !self.0.contains_key(&key) {
            key
        } else if !self.0.contains_key(&parameter) {
            parameter.clone()
        } else {
            (2..)
                .map(|n| format!("{key}_{n}"))
                .find(|candidate| !self.0.contains_key(candidate))
                .unwrap_or(key)
        };
        self.0.insert(key, parameter);
    }

    /// Returns the parameter bound to a logical key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true if `parameter` is one of the mapped parameters.
    #[must_use]
    pub fn contains_parameter(&self, parameter: &str) -> bool {
        self.0.values().any(|p| p == parameter)
    }

    /// Iterates `(key, parameter)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, p)| (k.as_str(), p.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no parameter is classified as context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, P: Into<String>> FromIterator<(K, P)> for ContextParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, parameter) in iter {
            map.insert(key, parameter);
        }
        map
    }
}

/// Classifies the context parameters of a function.
///
/// An explicit `context_params` list in the annotation wins outright:
/// exactly the listed names that exist on the function are used, and no
/// convention scan happens. Otherwise every parameter carrying the context
/// prefix is captured.
#[must_use]
pub fn extract(
    function: &FunctionMetadata,
    annotation: Option<&MutationAnnotation>,
) -> ContextParameterMap {
    if let Some(explicit) = annotation.and_then(|a| a.context_params.as_ref()) {
        return explicit
            .iter()
            .filter(|name| {
                let exists = function.get_parameter(name).is_some();
                if !exists {
                    debug!(
                        function = %function.qualified_name(),
                        parameter = %name,
                        "declared context parameter does not exist, skipping"
                    );
                }
                exists
            })
            .map(|name| (context_key(name), name.clone()))
            .collect();
    }

    function
        .parameters
        .iter()
        .filter(|p| is_context_parameter_name(&p.name))
        .map(|p| (context_key(&p.name), p.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Parameter;

    fn annotation(context_params: Option<Vec<&str>>) -> MutationAnnotation {
        MutationAnnotation {
            name: "createContact".into(),
            description: None,
            success_type: "CreateContactSuccess".into(),
            failure_type: "CreateContactError".into(),
            input_type: None,
            context_params: context_params
                .map(|names| names.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_canonical_keys() {
        let function = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"))
            .parameter(Parameter::new("auth_user_id", "uuid"))
            .parameter(Parameter::new("input_payload", "jsonb"));

        let map = extract(&function, None);
        assert_eq!(
            map,
            [("tenant_id", "auth_tenant_id"), ("user_id", "auth_user_id")]
                .into_iter()
                .collect::<ContextParameterMap>()
        );
    }

    #[test]
    fn test_canonical_keys_any_order() {
        let function = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("input_payload", "jsonb"))
            .parameter(Parameter::new("auth_user_id", "uuid"))
            .parameter(Parameter::new("auth_tenant_id", "uuid"));

        let map = extract(&function, None);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("tenant_id"), Some("auth_tenant_id"));
        assert_eq!(map.get("user_id"), Some("auth_user_id"));
    }

    #[test]
    fn test_generic_derivation() {
        let function = FunctionMetadata::new("app", "update_contact")
            .parameter(Parameter::new("p_contact_id", "uuid"))
            .parameter(Parameter::new("auth_organization_id", "uuid"));

        let map = extract(&function, None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("organization_id"), Some("auth_organization_id"));
        assert!(!map.contains_parameter("p_contact_id"));
    }

    #[test]
    fn test_explicit_list_overrides_convention() {
        let function = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"))
            .parameter(Parameter::new("auth_user_id", "uuid"))
            .parameter(Parameter::new("auth_region", "text"));
        let ann = annotation(Some(vec!["auth_tenant_id", "auth_user_id"]));

        let map = extract(&function, Some(&ann));
        let pairs: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(
            pairs,
            [("tenant_id", "auth_tenant_id"), ("user_id", "auth_user_id")]
        );
        assert!(!map.contains_parameter("auth_region"));
    }

    #[test]
    fn test_explicit_list_skips_missing_and_keeps_unprefixed() {
        let function = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("tenant", "uuid"))
            .parameter(Parameter::new("auth_user_id", "uuid"));
        let ann = annotation(Some(vec!["tenant", "auth_ghost"]));

        let map = extract(&function, Some(&ann));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("tenant"), Some("tenant"));
    }

    #[test]
    fn test_empty_explicit_list_means_no_context() {
        let function = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"));
        let ann = annotation(Some(vec![]));
        assert!(extract(&function, Some(&ann)).is_empty());
    }

    #[test]
    fn test_annotation_without_list_uses_convention() {
        let function = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"));
        let ann = annotation(None);
        assert_eq!(extract(&function, Some(&ann)).get("tenant_id"), Some("auth_tenant_id"));
    }

    #[test]
    fn test_explicit_list_key_collision_keeps_every_parameter() {
        let function = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"))
            .parameter(Parameter::new("tenant_id", "uuid"))
            .parameter(Parameter::new("p_email", "text"));
        let ann = annotation(Some(vec!["auth_tenant_id", "tenant_id"]));

        let map = extract(&function, Some(&ann));
        assert_eq!(map.len(), 2);
        assert!(map.contains_parameter("auth_tenant_id"));
        assert!(map.contains_parameter("tenant_id"));
        assert_eq!(map.get("tenant_id"), Some("auth_tenant_id"));
        assert_eq!(map.get("tenant_id_2"), Some("tenant_id"));
    }

    #[test]
    fn test_insert_falls_back_to_parameter_name() {
        let mut map = ContextParameterMap::new();
        map.insert("region", "auth_region");
        map.insert("region", "auth_area");
        map.insert("region", "auth_region");

        let pairs: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(pairs, [("region", "auth_region"), ("auth_area", "auth_area")]);
    }

    #[test]
    fn test_context_free_function() {
        let function = FunctionMetadata::new("app", "ping").parameter(Parameter::new("p_x", "int4"));
        assert!(extract(&function, None).is_empty());
    }
}
