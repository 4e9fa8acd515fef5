//! CLI for inspecting the component registry built from manifests
//!
//! Runs one discovery pass over the configured manifests and answers a single
//! query, printing descriptors as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use component_registry::{
    run_discovery_pass, ComponentDescriptor, ComponentDiscovery, ComponentQuery,
    ComponentRegistry, FailurePolicy, RegistryConfig,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "component-registry", author, version, about = "Component registry inspector")]
struct Args {
    /// TOML config file (defaults to COMPONENT_REGISTRY_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Additional manifest to load (repeatable)
    #[arg(short, long = "manifest", global = true)]
    manifests: Vec<PathBuf>,

    /// Stop at the first registration failure instead of skipping it
    #[arg(long, global = true)]
    abort_on_error: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered components, optionally filtered by classification
    List {
        /// Only include these classification tags
        #[arg(long, conflicts_with = "ignore")]
        select: Vec<String>,
        /// Exclude these classification tags
        #[arg(long)]
        ignore: Vec<String>,
    },
    /// Show one component
    Show { name: String },
    /// Components inheriting from a parent type
    Children {
        parent: String,
        /// Search the full ancestry instead of immediate parents
        #[arg(short, long)]
        recursive: bool,
    },
    /// Components related to a registered component
    Related { id: String },
    /// Classification tags with their component counts
    Types,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<RegistryConfig> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RegistryConfig::from_env().context("reading environment configuration")?,
    };
    config.discovery.manifests.extend(args.manifests.iter().cloned());
    if args.abort_on_error {
        config.discovery.on_error = FailurePolicy::Abort;
    }
    Ok(config)
}

fn print_descriptors(descriptors: &[ComponentDescriptor]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(descriptors)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let registry = ComponentRegistry::new();
    let providers: Vec<Box<dyn ComponentDiscovery>> = vec![Box::new(config.manifest_discovery())];
    let report = run_discovery_pass(&registry, &providers, config.discovery.on_error)?;
    if !report.is_clean() {
        eprintln!(
            "{} component(s) failed to register; run with --verbose for details",
            report.failures.len()
        );
    }

    match args.command {
        Command::List { select, ignore } => {
            let mut query = ComponentQuery::all();
            if !select.is_empty() {
                query = query.with_select(select);
            }
            if !ignore.is_empty() {
                query = query.with_ignore(ignore);
            }
            print_descriptors(&registry.get_components_by_type(&query)?)?;
        }
        Command::Show { name } => {
            print_descriptors(&[registry.get(&name)?])?;
        }
        Command::Children { parent, recursive } => {
            print_descriptors(&registry.get_child_components(&parent, recursive))?;
        }
        Command::Related { id } => {
            print_descriptors(&registry.get_related_components(&id)?)?;
        }
        Command::Types => {
            let mut counts = serde_json::Map::new();
            for tag in registry.classifications() {
                let count = registry
                    .get_components_by_type(&ComponentQuery::select(&tag))?
                    .len();
                counts.insert(tag, json!(count));
            }
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
    }

    Ok(())
}
