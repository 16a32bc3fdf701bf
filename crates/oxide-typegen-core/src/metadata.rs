//! Catalog metadata snapshots.
//!
//! These types are read-only snapshots of what the catalog reported at
//! discovery time. They are built fresh on every pass and never written
//! back to the database.

use serde::{Deserialize, Serialize};

/// One attribute of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name as stored in the catalog.
    pub name: String,
    /// Native type text (e.g. `text`, `uuid`, `character varying(64)`).
    pub native_type: String,
    /// 1-based ordinal position within the type.
    pub position: i32,
    /// Attribute comment, if any.
    pub comment: Option<String>,
}

impl Attribute {
    /// Creates a new attribute without a comment.
    #[must_use]
    pub fn new(name: impl Into<String>, native_type: impl Into<String>, position: i32) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            position,
            comment: None,
        }
    }

    /// Sets the attribute comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A named composite type and its ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeTypeMetadata {
    /// Schema the type lives in.
    pub schema: String,
    /// Type name.
    pub name: String,
    /// Attributes in ascending ordinal position.
    pub attributes: Vec<Attribute>,
    /// Type-level comment, if any.
    pub comment: Option<String>,
}

impl CompositeTypeMetadata {
    /// Creates a composite type, sorting attributes by position.
    #[must_use]
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        mut attributes: Vec<Attribute>,
    ) -> Self {
        attributes.sort_by_key(|a| a.position);
        Self {
            schema: schema.into(),
            name: name.into(),
            attributes,
            comment: None,
        }
    }

    /// Sets the type-level comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns `schema.name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }
}

/// Parameter passing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ParameterMode {
    /// Input parameter.
    #[default]
    In,
    /// Output parameter.
    Out,
    /// Input and output parameter.
    InOut,
}

/// One parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, unique within the function.
    pub name: String,
    /// Native type text.
    pub native_type: String,
    /// Passing mode.
    pub mode: ParameterMode,
    /// Whether the parameter declares a default value.
    pub has_default: bool,
}

impl Parameter {
    /// Creates an IN parameter without a default.
    #[must_use]
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            mode: ParameterMode::In,
            has_default: false,
        }
    }

    /// Sets the passing mode.
    #[must_use]
    pub fn mode(mut self, mode: ParameterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Marks the parameter as having a default value.
    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Returns true for IN parameters.
    #[must_use]
    pub fn is_input(&self) -> bool {
        self.mode == ParameterMode::In
    }
}

/// A function signature as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// Schema the function lives in.
    pub schema: String,
    /// Function name.
    pub name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Return type text.
    pub return_type: String,
    /// Function comment, if any.
    pub comment: Option<String>,
    /// Implementation language tag (informational only).
    pub language: String,
}

impl FunctionMetadata {
    /// Creates a function returning `jsonb` in `plpgsql`.
    #[must_use]
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            parameters: Vec::new(),
            return_type: "jsonb".to_string(),
            comment: None,
            language: "plpgsql".to_string(),
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Sets the function comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the language tag.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns `schema.name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }
}

/// Joins a schema and an object name.
#[must_use]
pub fn qualified(schema: &str, name: &str) -> String {
    format!("{schema}.{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_type_sorts_attributes() {
        let ty = CompositeTypeMetadata::new(
            "app",
            "type_create_contact_input",
            vec![
                Attribute::new("status", "text", 3),
                Attribute::new("email", "text", 1),
                Attribute::new("company_id", "uuid", 2),
            ],
        );

        let names: Vec<&str> = ty.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["email", "company_id", "status"]);
        assert_eq!(ty.qualified_name(), "app.type_create_contact_input");
    }

    #[test]
    fn test_function_builder() {
        let func = FunctionMetadata::new("app", "create_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"))
            .parameter(Parameter::new("p_note", "text").with_default())
            .parameter(Parameter::new("result", "jsonb").mode(ParameterMode::Out));

        assert_eq!(func.parameters.len(), 3);
        assert!(func.get_parameter("p_note").unwrap().has_default);
        assert!(!func.get_parameter("result").unwrap().is_input());
        assert!(func.get_parameter("missing").is_none());
    }
}
