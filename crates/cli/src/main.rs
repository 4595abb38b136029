use std::path::PathBuf;

use anyhow::{bail, Context, Error, Result};
use clap::{Parser, ValueHint};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use typegraph::{load_modules, LoadConfig, Module, Registry};
use typegraph_frontend::StaticFrontend;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Typegraph - Resolve the type graph of a checked program",
    long_about = None
)]
struct Args {
    /// Path to the program dump produced by a front-end (JSON format)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Session options (TOML format)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Module to load; may be repeated. Everything in the dump when omitted
    #[arg(short, long = "module")]
    modules: Vec<String>,

    /// Worker threads
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Type expression to look up after loading, e.g. `[]*pkg.Record`
    #[arg(short, long)]
    type_of: Option<String>,

    /// Module path unqualified names in `--type-of` are resolved in
    #[arg(long)]
    context: Option<String>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn session_config(args: &Args) -> Result<LoadConfig> {
    let mut config = match &args.config {
        Some(path) => LoadConfig::from_path(path)
            .with_context(|| format!("Error reading config '{}'", path.display()))?,
        None => LoadConfig::default(),
    };
    config.modules.extend(args.modules.iter().cloned());
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    config.verbose |= args.verbose;
    Ok(config)
}

fn summary(module: &Module) -> serde_json::Value {
    json!({
        "path": module.path(),
        "identifier": module.identifier(),
        "records": module.records().len(),
        "interfaces": module.interfaces().len(),
        "functions": module.functions().len(),
        "aliases": module.aliases().len(),
        "declarations": module.declarations().len(),
    })
}

fn print_modules(registry: &Registry, as_json: bool) -> Result<()> {
    let modules: Vec<_> = registry
        .modules()
        .into_iter()
        .filter(|module| !module.is_builtin())
        .collect();
    if as_json {
        let summaries: Vec<_> = modules.iter().map(|module| summary(module)).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    for module in modules {
        println!(
            "{} ({}): {} records, {} interfaces, {} functions, {} aliases, {} declarations",
            module.path(),
            module.identifier(),
            module.records().len(),
            module.interfaces().len(),
            module.functions().len(),
            module.aliases().len(),
            module.declarations().len(),
        );
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = session_config(&args)?;
    info!(input = %args.input.display(), "loading program");
    let frontend = StaticFrontend::from_path(&args.input)
        .with_context(|| format!("Error reading program '{}'", args.input.display()))?;
    let registry = load_modules(&frontend, &config).context("Resolution failed")?;
    info!(
        modules = registry.len(),
        types = registry.store().len(),
        "program resolved"
    );

    print_modules(&registry, args.json)?;

    if let Some(expr) = &args.type_of {
        let context = args.context.as_deref();
        let Some(id) = registry.type_of(expr, context) else {
            bail!("cannot resolve type expression `{expr}`");
        };
        println!(
            "{expr}: {} ({}, {}), zero value {}",
            registry.name_of(id, true, context),
            registry.full_name(id),
            registry.kind(id),
            registry.zero(id, true, context)
        );
    }

    Ok(())
}
