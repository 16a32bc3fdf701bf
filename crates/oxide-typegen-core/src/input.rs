//! Client-facing input type synthesis.
//!
//! Two strategies are tried in order:
//!
//! 1. [`InputStrategy::CompositeType`]: the function takes a single
//!    structured payload parameter whose shape is a composite type. Fields
//!    come from the composite type's attributes and their annotations.
//! 2. [`InputStrategy::Parameters`]: one field per business IN parameter.
//!
//! The first strategy declining is an ordinary outcome, not an error.
//! Whatever strategy wins, context parameters are filtered out last.

use tracing::{debug, warn};

use crate::annotation::{FieldAnnotation, MutationAnnotation, TypeAnnotation, description_text};
use crate::catalog::CatalogReader;
use crate::context::ContextParameterMap;
use crate::descriptor::{FieldDescriptor, TypeDescriptor, TypeDescriptorBuilder};
use crate::error::{AnnotationError, Result, TypegenError};
use crate::metadata::{Attribute, CompositeTypeMetadata, FunctionMetadata, qualified};
use crate::naming::{
    business_field_name, composite_input_type_name, input_type_name, is_context_parameter_name,
    is_payload_parameter, strip_schema,
};
use crate::type_mapper::{ScalarType, is_known_native_type, map_native_type};

/// Strategy that produced an input type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum InputStrategy {
    /// Fields from a composite type describing the structured payload.
    CompositeType,
    /// Fields from the function's business parameters.
    Parameters,
}

/// An input type together with the strategy that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedInput {
    /// The generated input type.
    pub descriptor: TypeDescriptor,
    /// Which strategy produced it.
    pub strategy: InputStrategy,
}

/// Why the composite type strategy did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Declined {
    NoPayloadParameter,
    TypeNotFound(String),
}

/// Builds the client-facing input type of a function.
///
/// Only catalog failures are returned as errors. A missing composite type
/// falls back to the parameter strategy with a warning.
pub async fn generate_input_type<C: CatalogReader>(
    function: &FunctionMetadata,
    annotation: Option<&MutationAnnotation>,
    catalog: &C,
    context: &ContextParameterMap,
) -> Result<SynthesizedInput> {
    let (strategy, builder) = match from_composite_type(function, annotation, catalog).await? {
        Ok(builder) => (InputStrategy::CompositeType, builder),
        Err(declined) => {
            match &declined {
                Declined::NoPayloadParameter => debug!(
                    function = %function.qualified_name(),
                    "no structured payload parameter, using parameters"
                ),
                Declined::TypeNotFound(type_name) => warn!(
                    function = %function.qualified_name(),
                    composite_type = %type_name,
                    "composite input type not found, falling back to parameters"
                ),
            }
            (InputStrategy::Parameters, from_parameters(function, context))
        }
    };

    let descriptor = builder
        .retain(|field| {
            let leaks = is_context_field(field, context);
            if leaks {
                debug!(
                    function = %function.qualified_name(),
                    field = %field.name,
                    "dropping context field from input"
                );
            }
            !leaks
        })
        .build();

    Ok(SynthesizedInput {
        descriptor,
        strategy,
    })
}

/// Resolves the composite type name for the payload of `function`.
///
/// The annotation's `input_type` wins over the naming convention; its
/// schema qualifier is ignored and the function's schema is used.
#[must_use]
pub fn resolve_composite_type_name(
    function: &FunctionMetadata,
    annotation: Option<&MutationAnnotation>,
) -> String {
    annotation
        .and_then(|a| a.input_type.as_deref())
        .map_or_else(
            || composite_input_type_name(&function.name),
            |explicit| strip_schema(explicit).to_string(),
        )
}

/// Builds the fields of a composite type.
///
/// Annotated attributes use their declared name, `required` flag and,
/// when it names a known scalar, their declared type. Unannotated
/// attributes keep their raw name and are nullable.
#[must_use]
pub fn fields_from_composite(composite: &CompositeTypeMetadata) -> Vec<FieldDescriptor> {
    composite
        .attributes
        .iter()
        .map(|attr| attribute_field(composite, attr))
        .collect()
}

/// Builds the fields of a composite type as they appear in an input type,
/// with context fields removed.
#[must_use]
pub fn input_fields_from_composite(
    composite: &CompositeTypeMetadata,
    context: &ContextParameterMap,
) -> Vec<FieldDescriptor> {
    fields_from_composite(composite)
        .into_iter()
        .filter(|field| !is_context_field(field, context))
        .collect()
}

/// Returns true if a field originates from a context parameter, either
/// classified in `context` or named by the context convention.
fn is_context_field(field: &FieldDescriptor, context: &ContextParameterMap) -> bool {
    field
        .origin
        .as_deref()
        .is_some_and(|origin| context.contains_parameter(origin) || is_context_parameter_name(origin))
}

async fn from_composite_type<C: CatalogReader>(
    function: &FunctionMetadata,
    annotation: Option<&MutationAnnotation>,
    catalog: &C,
) -> Result<std::result::Result<TypeDescriptorBuilder, Declined>> {
    let payloads = function
        .parameters
        .iter()
        .filter(|p| p.is_input() && is_payload_parameter(p))
        .count();
    if payloads != 1 {
        return Ok(Err(Declined::NoPayloadParameter));
    }

    let type_name = resolve_composite_type_name(function, annotation);
    let Some(composite) = catalog
        .discover_composite_type(&type_name, &function.schema)
        .await
        .map_err(TypegenError::catalog)?
    else {
        return Ok(Err(Declined::TypeNotFound(qualified(
            &function.schema,
            &type_name,
        ))));
    };

    debug!(
        function = %function.qualified_name(),
        composite_type = %composite.qualified_name(),
        attributes = composite.attributes.len(),
        "building input from composite type"
    );

    let description = composite.comment.as_deref().and_then(type_description);
    let builder = fields_from_composite(&composite).into_iter().fold(
        TypeDescriptor::input(input_type_name(&composite.name)).description(description),
        TypeDescriptorBuilder::field,
    );
    Ok(Ok(builder))
}

/// Description of a composite type: the `@oxide:type` description if
/// declared, otherwise the free text of its comment.
fn type_description(comment: &str) -> Option<String> {
    match TypeAnnotation::parse(comment) {
        Ok(TypeAnnotation {
            description: Some(description),
        }) => Some(description),
        Ok(_) | Err(AnnotationError::MissingMarker) => description_text(comment),
        Err(err) => {
            warn!(error = %err, "ignoring type annotation");
            description_text(comment)
        }
    }
}

fn attribute_field(composite: &CompositeTypeMetadata, attr: &Attribute) -> FieldDescriptor {
    let annotation = attr
        .comment
        .as_deref()
        .and_then(|comment| match FieldAnnotation::parse(comment) {
            Ok(annotation) => Some(annotation),
            Err(err) => {
                if err.is_diagnostic() {
                    warn!(
                        composite_type = %composite.qualified_name(),
                        attribute = %attr.name,
                        error = %err,
                        "ignoring field annotation"
                    );
                }
                None
            }
        });

    if !is_known_native_type(&attr.native_type) {
        warn!(
            composite_type = %composite.qualified_name(),
            attribute = %attr.name,
            native_type = %attr.native_type,
            "unknown native type, mapping to JSON"
        );
    }

    let Some(annotation) = annotation else {
        return FieldDescriptor::new(&attr.name, map_native_type(&attr.native_type, true))
            .origin(&attr.name);
    };

    let mut type_ref = map_native_type(&attr.native_type, !annotation.required);
    if let Some(declared) = annotation.type_name.as_deref() {
        match ScalarType::from_graphql_name(declared) {
            Some(scalar) => type_ref = type_ref.with_base_scalar(scalar),
            None => debug!(
                attribute = %attr.name,
                declared_type = %declared,
                "declared type is not a known scalar, keeping mapped type"
            ),
        }
    }

    FieldDescriptor::new(annotation.name, type_ref)
        .description(annotation.description)
        .enum_flag(annotation.is_enum)
        .origin(&attr.name)
}

fn from_parameters(function: &FunctionMetadata, context: &ContextParameterMap) -> TypeDescriptorBuilder {
    let mut builder = TypeDescriptor::input(input_type_name(&function.name));

    for parameter in &function.parameters {
        if !parameter.is_input()
            || is_payload_parameter(parameter)
            || context.contains_parameter(&parameter.name)
        {
            continue;
        }
        if !is_known_native_type(&parameter.native_type) {
            warn!(
                function = %function.qualified_name(),
                parameter = %parameter.name,
                native_type = %parameter.native_type,
                "unknown native type, mapping to JSON"
            );
        }
        builder.push(
            FieldDescriptor::new(
                business_field_name(&parameter.name),
                map_native_type(&parameter.native_type, parameter.has_default),
            )
            .origin(&parameter.name),
        );
    }

    builder
}
