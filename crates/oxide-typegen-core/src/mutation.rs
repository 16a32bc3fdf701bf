//! Mutation descriptor synthesis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::annotation::{MutationAnnotation, description_text};
use crate::catalog::CatalogReader;
use crate::context::{ContextParameterMap, extract};
use crate::descriptor::{TypeDescriptor, TypeRegistry};
use crate::error::{Result, SkipReason};
use crate::input::{InputStrategy, generate_input_type};
use crate::metadata::{FunctionMetadata, qualified};

/// Schema and name of the function a mutation calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionIdentity {
    /// Schema name.
    pub schema: String,
    /// Function name.
    pub name: String,
}

impl FunctionIdentity {
    /// Returns `schema.name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }
}

impl From<&FunctionMetadata> for FunctionIdentity {
    fn from(function: &FunctionMetadata) -> Self {
        Self {
            schema: function.schema.clone(),
            name: function.name.clone(),
        }
    }
}

/// Everything the serving layer needs to bind one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDescriptor {
    /// Mutation name exposed to clients.
    pub name: String,
    /// Mutation description.
    pub description: Option<String>,
    /// Client-facing input type.
    pub input: TypeDescriptor,
    /// Strategy that produced the input type.
    pub input_strategy: InputStrategy,
    /// Result type on success.
    pub success: Arc<TypeDescriptor>,
    /// Result type on failure.
    pub failure: Arc<TypeDescriptor>,
    /// Context parameters filled from the request environment.
    pub context: ContextParameterMap,
    /// Function the mutation calls.
    pub function: FunctionIdentity,
}

/// Result of synthesizing one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation was generated.
    Generated(Box<MutationDescriptor>),
    /// The function produced nothing usable.
    Skipped(SkipReason),
}

impl MutationOutcome {
    /// Returns the descriptor, if one was generated.
    #[must_use]
    pub fn into_descriptor(self) -> Option<MutationDescriptor> {
        match self {
            Self::Generated(descriptor) => Some(*descriptor),
            Self::Skipped(_) => None,
        }
    }
}

/// Synthesizes the mutation descriptor of one annotated function.
///
/// An unresolved success or failure type skips this function only. Catalog
/// failures are returned as errors.
pub async fn generate_mutation<C, R>(
    function: &FunctionMetadata,
    annotation: &MutationAnnotation,
    registry: &R,
    catalog: &C,
) -> Result<MutationOutcome>
where
    C: CatalogReader,
    R: TypeRegistry + ?Sized,
{
    let context = extract(function, Some(annotation));
    let input = generate_input_type(function, Some(annotation), catalog, &context).await?;

    let success = match resolve(registry, "success", &annotation.success_type) {
        Ok(ty) => ty,
        Err(reason) => return Ok(skip(function, reason)),
    };
    let failure = match resolve(registry, "failure", &annotation.failure_type) {
        Ok(ty) => ty,
        Err(reason) => return Ok(skip(function, reason)),
    };

    debug!(
        function = %function.qualified_name(),
        mutation = %annotation.name,
        input = %input.descriptor.name,
        fields = input.descriptor.fields.len(),
        context = context.len(),
        "mutation synthesized"
    );

    let description = annotation
        .description
        .clone()
        .or_else(|| function.comment.as_deref().and_then(description_text));

    Ok(MutationOutcome::Generated(Box::new(MutationDescriptor {
        name: annotation.name.clone(),
        description,
        input: input.descriptor,
        input_strategy: input.strategy,
        success,
        failure,
        context,
        function: FunctionIdentity::from(function),
    })))
}

fn resolve<R: TypeRegistry + ?Sized>(
    registry: &R,
    role: &'static str,
    type_name: &str,
) -> std::result::Result<Arc<TypeDescriptor>, SkipReason> {
    registry
        .lookup(type_name)
        .ok_or_else(|| SkipReason::UnresolvedTypeReference {
            role,
            type_name: type_name.to_string(),
        })
}

fn skip(function: &FunctionMetadata, reason: SkipReason) -> MutationOutcome {
    warn!(function = %function.qualified_name(), %reason, "skipping mutation");
    MutationOutcome::Skipped(reason)
}
