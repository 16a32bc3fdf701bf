//! # oxide-typegen-core
//!
//! Generates client-facing API types from database catalog metadata.
//!
//! The engine reads composite types and function signatures through a
//! [`CatalogReader`](catalog::CatalogReader), parses the annotation blocks
//! embedded in their comments, and synthesizes:
//!
//! - **Input types** for mutation functions, either from the composite type
//!   describing a structured `input_payload` parameter or, when there is
//!   none, from the function's business parameters.
//! - **Mutation descriptors** bundling the input type, the success and
//!   failure result types (looked up in a caller-supplied
//!   [`TypeRegistry`](descriptor::TypeRegistry)), the context parameter map
//!   and the identity of the function to call.
//!
//! Context parameters (`auth_*`) are filled by the serving layer from the
//! request environment. They never appear as input fields, whatever
//! strategy built the input type.
//!
//! The engine is read-only: it never creates, alters or drops database
//! objects and can be re-run at any time.
//!
//! # Example
//!
//! ```rust
//! use oxide_typegen_core::prelude::*;
//!
//! # async fn example() -> oxide_typegen_core::error::Result<()> {
//! let catalog = StaticCatalog::new()
//!     .with_composite_type(CompositeTypeMetadata::new(
//!         "app",
//!         "type_create_contact_input",
//!         vec![
//!             Attribute::new("email", "text", 1)
//!                 .comment("@oxide:field name=email,type=String!,required=true"),
//!             Attribute::new("company_id", "uuid", 2)
//!                 .comment("@oxide:field name=companyId,required=false"),
//!         ],
//!     ))
//!     .with_function(
//!         FunctionMetadata::new("app", "create_contact")
//!             .parameter(Parameter::new("auth_tenant_id", "uuid"))
//!             .parameter(Parameter::new("input_payload", "jsonb"))
//!             .comment(
//!                 "@oxide:mutation\n\
//!                  name=createContact\n\
//!                  success_type=CreateContactSuccess\n\
//!                  failure_type=CreateContactError",
//!             ),
//!     );
//!
//! let registry = TypeMap::new()
//!     .with(TypeDescriptor::object("CreateContactSuccess").build())
//!     .with(TypeDescriptor::object("CreateContactError").build());
//!
//! let report = Discovery::new(catalog, registry).run("app").await?;
//! let mutation = &report.mutations[0];
//! assert_eq!(mutation.input.field_names(), ["email", "companyId"]);
//! assert_eq!(mutation.context.get("tenant_id"), Some("auth_tenant_id"));
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod catalog;
pub mod context;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod input;
pub mod metadata;
pub mod mutation;
pub mod naming;
pub mod type_mapper;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::annotation::{
        FieldAnnotation, MutationAnnotation, TypeAnnotation, parse_field_annotation,
        parse_mutation_annotation, parse_type_annotation,
    };
    pub use crate::catalog::{CachedCatalog, CatalogReader, StaticCatalog};
    pub use crate::context::{ContextParameterMap, extract};
    pub use crate::descriptor::{
        DescriptorKind, FieldDescriptor, TypeDescriptor, TypeDescriptorBuilder, TypeMap,
        TypeRegistry,
    };
    pub use crate::discovery::{Discovery, DiscoveryOptions, DiscoveryReport, SkippedFunction};
    pub use crate::error::{AnnotationError, Result, SkipReason, TypegenError};
    pub use crate::input::{InputStrategy, SynthesizedInput, generate_input_type};
    pub use crate::metadata::{
        Attribute, CompositeTypeMetadata, FunctionMetadata, Parameter, ParameterMode,
    };
    pub use crate::mutation::{
        FunctionIdentity, MutationDescriptor, MutationOutcome, generate_mutation,
    };
    pub use crate::type_mapper::{ScalarType, TypeKind, TypeRef, map_native_type};
}
