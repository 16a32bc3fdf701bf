#![allow(dead_code)]

use oxide_typegen_core::prelude::*;

pub const SCHEMA: &str = "app";

/// Builds a mutation annotation comment.
pub fn mutation_comment(name: &str, success: &str, failure: &str, extra: &[&str]) -> String {
    let mut lines = vec![
        "@oxide:mutation".to_string(),
        format!("name={name}"),
        format!("success_type={success}"),
        format!("failure_type={failure}"),
    ];
    lines.extend(extra.iter().map(|line| (*line).to_string()));
    lines.join("\n")
}

/// The contact input type used throughout the scenarios.
pub fn contact_input_type() -> CompositeTypeMetadata {
    CompositeTypeMetadata::new(
        SCHEMA,
        "type_create_contact_input",
        vec![
            Attribute::new("email", "text", 1)
                .comment("@oxide:field name=email,type=String!,required=true"),
            Attribute::new("company_id", "uuid", 2)
                .comment("@oxide:field name=companyId,required=false"),
            Attribute::new("status", "text", 3)
                .comment("@oxide:field name=status,type=String!,required=true"),
        ],
    )
}

/// A registry holding the result types of every fixture mutation.
pub fn registry() -> TypeMap {
    ["CreateContact", "UpdateContact", "ArchiveContact"]
        .iter()
        .flat_map(|base| {
            [
                TypeDescriptor::object(format!("{base}Success"))
                    .field(FieldDescriptor::new(
                        "message",
                        TypeRef::scalar(ScalarType::String, false),
                    ))
                    .build(),
                TypeDescriptor::object(format!("{base}Error"))
                    .field(FieldDescriptor::new(
                        "code",
                        TypeRef::scalar(ScalarType::String, false),
                    ))
                    .build(),
            ]
        })
        .fold(TypeMap::new(), TypeMap::with)
}

pub fn render(descriptor: &TypeDescriptor) -> Vec<String> {
    descriptor
        .fields
        .iter()
        .map(|f| format!("{}: {}", f.name, f.type_ref))
        .collect()
}
