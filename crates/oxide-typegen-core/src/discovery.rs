//! Batch discovery over a schema.
//!
//! A pass lists the functions of a schema, keeps those carrying a mutation
//! annotation and synthesizes each one concurrently. A problem with one
//! function is recorded as a skip and never stops the others; only catalog
//! failures abort the pass.
//!
//! Dropping the future returned by [`Discovery::run`] cancels the pass.
//! Nothing needs rolling back: every artifact is an immutable snapshot.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::annotation::{MutationAnnotation, has_mutation_marker};
use crate::catalog::{CachedCatalog, CatalogReader};
use crate::descriptor::TypeRegistry;
use crate::error::{Result, SkipReason, TypegenError};
use crate::metadata::FunctionMetadata;
use crate::mutation::{FunctionIdentity, MutationDescriptor, MutationOutcome, generate_mutation};

/// Options for a discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum number of functions processed at once.
    pub concurrency: usize,
    /// Time limit for one function, catalog lookups included.
    pub lookup_timeout: Option<Duration>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryOptions {
    /// Creates default options: 8 concurrent functions, 30s per function.
    #[must_use]
    pub fn new() -> Self {
        Self {
            concurrency: 8,
            lookup_timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Sets the concurrency limit (at least 1).
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the per-function time limit.
    #[must_use]
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    /// Disables the per-function time limit.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.lookup_timeout = None;
        self
    }
}

/// A candidate function that produced no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFunction {
    /// The function that was skipped.
    pub function: FunctionIdentity,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    /// Schema that was scanned.
    pub schema: String,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// When the pass finished.
    pub finished_at: DateTime<Utc>,
    /// Number of functions in the schema.
    pub functions_scanned: usize,
    /// Number of functions carrying a mutation annotation.
    pub candidates: usize,
    /// Synthesized mutations, ordered by function name.
    pub mutations: Vec<MutationDescriptor>,
    /// Skipped candidates, ordered by function name.
    pub skipped: Vec<SkippedFunction>,
}

impl fmt::Display for DiscoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        writeln!(
            f,
            "Schema '{}': {} functions scanned, {} candidates, {} mutations synthesized, {} skipped ({}ms)",
            self.schema,
            self.functions_scanned,
            self.candidates,
            self.mutations.len(),
            self.skipped.len(),
            elapsed.num_milliseconds()
        )?;
        for skip in &self.skipped {
            writeln!(f, "  - {}: {}", skip.function.qualified_name(), skip.reason)?;
        }
        Ok(())
    }
}

/// Drives discovery passes against a catalog.
///
/// Composite type lookups are cached across passes; call
/// [`Discovery::refresh`] to forget them before a schema refresh.
pub struct Discovery<C, R> {
    catalog: CachedCatalog<C>,
    registry: R,
    options: DiscoveryOptions,
}

impl<C: CatalogReader, R: TypeRegistry> Discovery<C, R> {
    /// Creates a discovery driver with default options.
    pub fn new(catalog: C, registry: R) -> Self {
        Self {
            catalog: CachedCatalog::new(catalog),
            registry,
            options: DiscoveryOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the cached catalog.
    pub fn catalog(&self) -> &CachedCatalog<C> {
        &self.catalog
    }

    /// Forgets cached composite types.
    pub fn refresh(&self) {
        self.catalog.clear();
    }

    /// Runs one discovery pass over `schema`.
    pub async fn run(&self, schema: &str) -> Result<DiscoveryReport> {
        let started_at = Utc::now();
        let functions = self
            .catalog
            .list_functions(schema)
            .await
            .map_err(TypegenError::catalog)?;

        let candidates: Vec<&FunctionMetadata> = functions
            .iter()
            .filter(|f| f.comment.as_deref().is_some_and(has_mutation_marker))
            .collect();
        info!(
            schema,
            functions = functions.len(),
            candidates = candidates.len(),
            "discovery started"
        );

        let outcomes: Vec<(FunctionIdentity, MutationOutcome)> = stream::iter(candidates.iter().copied())
            .map(|function| async move {
                let outcome = self.process(function).await?;
                Ok::<_, TypegenError>((FunctionIdentity::from(function), outcome))
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        let mut mutations = Vec::new();
        let mut skipped = Vec::new();
        for (function, outcome) in outcomes {
            match outcome {
                MutationOutcome::Generated(descriptor) => mutations.push(*descriptor),
                MutationOutcome::Skipped(reason) => skipped.push(SkippedFunction { function, reason }),
            }
        }
        mutations.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        skipped.sort_by(|a, b| a.function.name.cmp(&b.function.name));

        let report = DiscoveryReport {
            schema: schema.to_string(),
            started_at,
            finished_at: Utc::now(),
            functions_scanned: functions.len(),
            candidates: candidates.len(),
            mutations,
            skipped,
        };
        info!(
            schema,
            mutations = report.mutations.len(),
            skipped = report.skipped.len(),
            "discovery finished"
        );
        Ok(report)
    }

    /// Synthesizes the mutation of a single function.
    ///
    /// Returns `None` if the function does not exist.
    pub async fn generate_function(&self, name: &str, schema: &str) -> Result<Option<MutationOutcome>> {
        let Some(function) = self
            .catalog
            .discover_function(name, schema)
            .await
            .map_err(TypegenError::catalog)?
        else {
            return Ok(None);
        };
        self.process(&function).await.map(Some)
    }

    async fn process(&self, function: &FunctionMetadata) -> Result<MutationOutcome> {
        let comment = function.comment.as_deref().unwrap_or_default();
        let annotation = match MutationAnnotation::parse(comment) {
            Ok(annotation) => annotation,
            Err(err) => {
                warn!(function = %function.qualified_name(), error = %err, "unusable mutation annotation");
                return Ok(MutationOutcome::Skipped(SkipReason::MalformedAnnotation(err)));
            }
        };

        let work = generate_mutation(function, &annotation, &self.registry, &self.catalog);
        match self.options.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.unwrap_or_else(|_| {
                warn!(function = %function.qualified_name(), ?limit, "mutation synthesis timed out");
                Ok(MutationOutcome::Skipped(SkipReason::TimedOut(limit)))
            }),
            None => work.await,
        }
    }
}
