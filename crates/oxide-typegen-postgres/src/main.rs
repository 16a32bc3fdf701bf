//! oxide-typegen CLI
//!
//! Command-line tool for generating API types from a PostgreSQL catalog.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use oxide_typegen_core::annotation::parse_mutation_annotation;
use oxide_typegen_core::input::input_fields_from_composite;
use oxide_typegen_core::naming::input_type_name;
use oxide_typegen_core::prelude::*;
use oxide_typegen_postgres::PgCatalog;

/// Generate GraphQL input and mutation types from database metadata.
#[derive(Parser)]
#[command(name = "oxide-typegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL")]
    database: String,

    /// Maximum number of pooled connections.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover annotated mutation functions and synthesize their types.
    Discover {
        /// Schema to scan.
        #[arg(short, long, default_value = "public")]
        schema: String,

        /// JSON file with the result types mutations refer to.
        #[arg(short, long)]
        types: Option<PathBuf>,

        /// Write the synthesized mutations to this file as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of functions processed at once.
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Time limit per function, in seconds.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },

    /// Show a composite type and the input fields generated from it.
    InspectType {
        /// Composite type name.
        name: String,

        /// Schema of the type.
        #[arg(short, long, default_value = "public")]
        schema: String,
    },

    /// List the functions of a schema with their context parameters.
    Functions {
        /// Schema to list.
        #[arg(short, long, default_value = "public")]
        schema: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let catalog = PgCatalog::connect(&cli.database, cli.max_connections).await?;

    match cli.command {
        Commands::Discover {
            schema,
            types,
            output,
            concurrency,
            timeout_secs,
        } => {
            let registry = match types {
                Some(path) => TypeMap::load(&path)?,
                None => TypeMap::new(),
            };
            if registry.is_empty() {
                warn!("No result types registered; every mutation will be skipped.");
            }

            let options = DiscoveryOptions::new()
                .concurrency(concurrency)
                .lookup_timeout(Duration::from_secs(timeout_secs));
            let report = Discovery::new(catalog, registry)
                .with_options(options)
                .run(&schema)
                .await?;

            print!("{report}");

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&report.mutations)?;
                std::fs::write(&path, json)?;
                info!("Wrote {} mutations to {}", report.mutations.len(), path.display());
            }
        }

        Commands::InspectType { name, schema } => {
            let Some(composite) = catalog.discover_composite_type(&name, &schema).await? else {
                println!("Composite type {schema}.{name} not found.");
                return Ok(());
            };

            println!("\n{} ({})", composite.qualified_name(), input_type_name(&composite.name));
            println!("{:-<60}", "");
            println!("Attributes:");
            for attr in &composite.attributes {
                println!(" {:>3}  {:<24} {}", attr.position, attr.name, attr.native_type);
            }
            println!("\nInput fields (context attributes removed):");
            for field in input_fields_from_composite(&composite, &ContextParameterMap::new()) {
                println!("  {}: {}", field.name, field.type_ref);
            }
            println!();
        }

        Commands::Functions { schema } => {
            let functions = catalog.list_functions(&schema).await?;
            if functions.is_empty() {
                info!("No functions found in schema '{}'.", schema);
                return Ok(());
            }

            for function in &functions {
                let annotation = function.comment.as_deref().and_then(parse_mutation_annotation);
                let context = extract(function, annotation.as_ref());
                let params: Vec<String> = function
                    .parameters
                    .iter()
                    .map(|p| format!("{} {}", p.name, p.native_type))
                    .collect();

                let marker = if annotation.is_some() { "[M]" } else { "   " };
                println!(
                    " {marker} {}({}) -> {}",
                    function.qualified_name(),
                    params.join(", "),
                    function.return_type
                );
                for (key, parameter) in context.iter() {
                    println!("       context {key} <- {parameter}");
                }
            }
        }
    }

    Ok(())
}
