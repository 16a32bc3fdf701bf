//! Generated type descriptors and the type registry.
//!
//! Descriptors are plain ordered structures. The serving layer iterates
//! [`TypeDescriptor::fields`] directly; nothing is built by reflection.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::type_mapper::TypeRef;

/// Whether a descriptor describes client input or a result object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DescriptorKind {
    /// Client-supplied input object.
    #[default]
    Input,
    /// Result object returned to clients.
    Object,
}

/// One field of a generated type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Client-facing field name.
    pub name: String,
    /// Field type and nullability.
    pub type_ref: TypeRef,
    /// Field description.
    pub description: Option<String>,
    /// Catalog attribute or parameter the field was generated from.
    pub origin: Option<String>,
    /// Whether the field was declared as an enum.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_enum: bool,
}

impl FieldDescriptor {
    /// Creates a field without description or origin.
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
            origin: None,
            is_enum: false,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Records the originating catalog name.
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Marks the field as an enum.
    #[must_use]
    pub fn enum_flag(mut self, is_enum: bool) -> Self {
        self.is_enum = is_enum;
        self
    }

    /// Returns whether the field may be null.
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.type_ref.nullable
    }
}

/// A generated type: name plus ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Generated type name.
    pub name: String,
    /// Input or object.
    #[serde(default)]
    pub kind: DescriptorKind,
    /// Type description.
    #[serde(default)]
    pub description: Option<String>,
    /// Fields in generation order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Starts building an input type.
    #[must_use]
    pub fn input(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(name, DescriptorKind::Input)
    }

    /// Starts building an object type.
    #[must_use]
    pub fn object(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(name, DescriptorKind::Object)
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the field names in order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Builder producing a [`TypeDescriptor`] with an ordered field list.
#[derive(Debug, Clone)]
pub struct TypeDescriptorBuilder {
    descriptor: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DescriptorKind) -> Self {
        Self {
            descriptor: TypeDescriptor {
                name: name.into(),
                kind,
                description: None,
                fields: Vec::new(),
            },
        }
    }

    /// Sets the type description.
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.descriptor.description = description;
        self
    }

    /// Appends a field. A field whose name is already taken is dropped.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.push(field);
        self
    }

    /// Appends a field in place. Returns false if the name was taken.
    pub fn push(&mut self, field: FieldDescriptor) -> bool {
        if self.descriptor.get_field(&field.name).is_some() {
            warn!(
                type_name = %self.descriptor.name,
                field = %field.name,
                "duplicate field name, keeping the first"
            );
            return false;
        }
        self.descriptor.fields.push(field);
        true
    }

    /// Drops every field the predicate rejects.
    #[must_use]
    pub fn retain(mut self, keep: impl FnMut(&FieldDescriptor) -> bool) -> Self {
        self.descriptor.fields.retain(keep);
        self
    }

    /// Finishes the descriptor.
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

/// Lookup of previously synthesized descriptors by logical name.
pub trait TypeRegistry: Send + Sync {
    /// Returns the descriptor registered under `name`.
    fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>>;
}

/// An owned, in-memory [`TypeRegistry`].
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeMap {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its own name, replacing any previous one.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parses a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<TypeDescriptor> = serde_json::from_str(json)?;
        Ok(descriptors
            .into_iter()
            .fold(Self::new(), |registry, d| registry.with(d)))
    }

    /// Loads a JSON array of descriptors from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl TypeRegistry for TypeMap {
    fn lookup(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_mapper::ScalarType;

    #[test]
    fn test_builder_keeps_order_and_rejects_duplicates() {
        let ty = TypeDescriptor::input("CreateContactInput")
            .field(FieldDescriptor::new("email", TypeRef::scalar(ScalarType::String, false)))
            .field(FieldDescriptor::new("companyId", TypeRef::scalar(ScalarType::Uuid, true)))
            .field(FieldDescriptor::new("email", TypeRef::scalar(ScalarType::Int, true)))
            .build();

        assert_eq!(ty.field_names(), ["email", "companyId"]);
        assert_eq!(ty.kind, DescriptorKind::Input);
        assert!(!ty.get_field("email").unwrap().nullable());
    }

    #[test]
    fn test_retain() {
        let ty = TypeDescriptor::input("X")
            .field(FieldDescriptor::new("a", TypeRef::scalar(ScalarType::Int, true)).origin("p_a"))
            .field(FieldDescriptor::new("b", TypeRef::scalar(ScalarType::Int, true)).origin("auth_b"))
            .retain(|f| f.origin.as_deref() != Some("auth_b"))
            .build();
        assert_eq!(ty.field_names(), ["a"]);
    }

    #[test]
    fn test_type_map_from_json() {
        let json = r#"[
            {"name": "CreateContactSuccess", "kind": "Object"},
            {"name": "CreateContactError", "kind": "Object", "fields": [
                {"name": "message", "type_ref": {"kind": {"Scalar": "String"}, "nullable": false}}
            ]}
        ]"#;

        let registry = TypeMap::from_json(json).unwrap();
        assert_eq!(registry.len(), 2);

        let error = registry.lookup("CreateContactError").unwrap();
        assert_eq!(error.fields[0].type_ref.to_string(), "String!");
        assert!(registry.lookup("Missing").is_none());
    }

    #[test]
    fn test_type_map_rejects_invalid_json() {
        assert!(TypeMap::from_json("{not json").is_err());
    }
}
