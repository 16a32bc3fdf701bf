//! Input and context synthesis scenarios.
//!
//! Each test builds catalog metadata in memory and checks the generated
//! input type and context map.

mod common;

use std::collections::HashSet;

use common::{SCHEMA, contact_input_type, render};
use oxide_typegen_core::input::fields_from_composite;
use oxide_typegen_core::prelude::*;

async fn input_for(function: &FunctionMetadata, catalog: &StaticCatalog) -> SynthesizedInput {
    let context = extract(function, None);
    generate_input_type(function, None, catalog, &context)
        .await
        .unwrap()
}

#[test]
fn test_annotated_attributes_synthesize_ordered_fields() {
    let fields = fields_from_composite(&contact_input_type());

    let rendered: Vec<String> = fields
        .iter()
        .map(|f| format!("{}: {}", f.name, f.type_ref))
        .collect();
    assert_eq!(rendered, ["email: String!", "companyId: UUID", "status: String!"]);
}

#[test]
fn test_tenant_and_user_parameters() {
    let function = FunctionMetadata::new(SCHEMA, "create_contact")
        .parameter(Parameter::new("auth_tenant_id", "uuid"))
        .parameter(Parameter::new("auth_user_id", "uuid"))
        .parameter(Parameter::new("input_payload", "jsonb"));

    let context = extract(&function, None);
    let pairs: Vec<(&str, &str)> = context.iter().collect();
    assert_eq!(
        pairs,
        [("tenant_id", "auth_tenant_id"), ("user_id", "auth_user_id")]
    );
}

#[test]
fn test_generic_context_key() {
    let function = FunctionMetadata::new(SCHEMA, "update_contact")
        .parameter(Parameter::new("p_contact_id", "uuid"))
        .parameter(Parameter::new("auth_organization_id", "uuid"));

    let context = extract(&function, None);
    let pairs: Vec<(&str, &str)> = context.iter().collect();
    assert_eq!(pairs, [("organization_id", "auth_organization_id")]);
}

#[test]
fn test_explicit_context_list_excludes_other_prefixed_params() {
    let function = FunctionMetadata::new(SCHEMA, "create_contact")
        .parameter(Parameter::new("auth_tenant_id", "uuid"))
        .parameter(Parameter::new("auth_user_id", "uuid"))
        .parameter(Parameter::new("auth_region", "text"));
    let annotation = parse_mutation_annotation(&common::mutation_comment(
        "createContact",
        "CreateContactSuccess",
        "CreateContactError",
        &["context_params=[auth_tenant_id, auth_user_id]"],
    ))
    .unwrap();

    let map = extract(&function, Some(&annotation));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("tenant_id"), Some("auth_tenant_id"));
    assert_eq!(map.get("user_id"), Some("auth_user_id"));
    assert!(!map.contains_parameter("auth_region"));
}

#[tokio::test]
async fn test_declared_context_with_shared_key_stays_out_of_input() {
    let function = FunctionMetadata::new(SCHEMA, "create_contact")
        .parameter(Parameter::new("auth_tenant_id", "uuid"))
        .parameter(Parameter::new("tenant_id", "uuid"))
        .parameter(Parameter::new("p_email", "text"));
    let annotation = parse_mutation_annotation(&common::mutation_comment(
        "createContact",
        "CreateContactSuccess",
        "CreateContactError",
        &["context_params=[auth_tenant_id, tenant_id]"],
    ))
    .unwrap();

    let context = extract(&function, Some(&annotation));
    assert!(context.contains_parameter("auth_tenant_id"));
    assert!(context.contains_parameter("tenant_id"));

    let input = generate_input_type(&function, Some(&annotation), &StaticCatalog::new(), &context)
        .await
        .unwrap();
    assert_eq!(input.descriptor.field_names(), ["email"]);
}

#[tokio::test]
async fn test_unmarked_comment_keeps_raw_attribute() {
    let catalog = StaticCatalog::new().with_composite_type(CompositeTypeMetadata::new(
        SCHEMA,
        "type_create_contact_input",
        vec![
            Attribute::new("first_name", "varchar(64)", 1).comment("Given name of the contact."),
            Attribute::new("email", "text", 2)
                .comment("@oxide:field name=email,type=String!,required=true"),
        ],
    ));
    let function = FunctionMetadata::new(SCHEMA, "create_contact")
        .parameter(Parameter::new("input_payload", "jsonb"));

    let input = input_for(&function, &catalog).await;
    assert_eq!(input.strategy, InputStrategy::CompositeType);
    assert_eq!(render(&input.descriptor), ["first_name: String", "email: String!"]);
}

#[tokio::test]
async fn test_fallback_matches_business_parameters() {
    let function = FunctionMetadata::new(SCHEMA, "update_contact")
        .parameter(Parameter::new("auth_tenant_id", "uuid"))
        .parameter(Parameter::new("input_payload", "jsonb"))
        .parameter(Parameter::new("p_contact_id", "uuid"))
        .parameter(Parameter::new("p_status", "text").with_default())
        .parameter(Parameter::new("p_updated", "boolean").mode(ParameterMode::Out));

    let input = input_for(&function, &StaticCatalog::new()).await;

    assert_eq!(input.strategy, InputStrategy::Parameters);
    assert!(!input.descriptor.fields.is_empty());
    let origins: Vec<&str> = input
        .descriptor
        .fields
        .iter()
        .filter_map(|f| f.origin.as_deref())
        .collect();
    assert_eq!(origins, ["p_contact_id", "p_status"]);
    assert_eq!(render(&input.descriptor), ["contact_id: UUID!", "status: String"]);
}

#[tokio::test]
async fn test_input_and_context_are_disjoint() {
    let catalog = StaticCatalog::new().with_composite_type(CompositeTypeMetadata::new(
        SCHEMA,
        "type_create_contact_input",
        vec![
            Attribute::new("email", "text", 1),
            Attribute::new("auth_user_id", "uuid", 2),
        ],
    ));
    let functions = [
        FunctionMetadata::new(SCHEMA, "create_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"))
            .parameter(Parameter::new("auth_user_id", "uuid"))
            .parameter(Parameter::new("input_payload", "jsonb")),
        FunctionMetadata::new(SCHEMA, "update_contact")
            .parameter(Parameter::new("auth_tenant_id", "uuid"))
            .parameter(Parameter::new("p_contact_id", "uuid"))
            .parameter(Parameter::new("auth_organization_id", "uuid").with_default()),
    ];

    for function in &functions {
        let context = extract(function, None);
        let input = generate_input_type(function, None, &catalog, &context)
            .await
            .unwrap();

        let context_params: HashSet<&str> = context.iter().map(|(_, p)| p).collect();
        for field in &input.descriptor.fields {
            let origin = field.origin.as_deref().unwrap();
            assert!(
                !context_params.contains(origin),
                "{} leaked context parameter {origin}",
                function.name
            );
            assert!(!origin.starts_with("auth_"));
        }
    }
}

#[tokio::test]
async fn test_generated_names_are_stable() {
    let catalog = StaticCatalog::new().with_composite_type(contact_input_type());
    let with_payload = FunctionMetadata::new(SCHEMA, "create_contact")
        .parameter(Parameter::new("input_payload", "jsonb"));
    let without_payload = FunctionMetadata::new(SCHEMA, "create_contact")
        .parameter(Parameter::new("p_email", "text"));

    let first = input_for(&with_payload, &catalog).await;
    let second = input_for(&with_payload, &catalog).await;
    let fallback = input_for(&without_payload, &catalog).await;

    assert_eq!(first, second);
    assert_eq!(first.descriptor.name, "CreateContactInput");
    assert_eq!(fallback.descriptor.name, first.descriptor.name);
}
