//! Arbor CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Keeps per-module code metadata in sync with the source tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Explicit config file (replaces the global ~/.arbor/config.yaml layer)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON-RPC tools over stdin/stdout
    Serve,
    /// Print the content hash of a module directory
    Hash { path: String },
    /// Print the symbols extracted from a module directory
    Symbols { path: String },
    /// Rebuild codetree.md for a project root
    Tree { path: String },
    /// Show spec, model and freshness of a module
    Status { path: String },
    /// Audit a project; exits non-zero when errors are found
    Validate { path: String },
    /// Rewrite codemodel.md for a module
    Sync { path: String },
    /// Print a symbol's source body
    Body { path: String, symbol: String },
    /// Add or remove a directory from the project exclusions
    Exclude {
        root: String,
        /// add or remove
        action: String,
        target: String,
    },
    /// Create a module or backfill its metadata documents
    Scaffold {
        path: String,
        name: String,
        #[arg(long = "type")]
        component_type: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        summary: String,
        #[arg(long, default_value = "")]
        context: String,
    },
    /// Copy the agent assets from the home directory into <path>/.agent
    InitAgent { path: String },
    /// Install agent assets, build the tree at the code root and scaffold it
    InitProject {
        path: String,
        /// Where the code starts; defaults to the project root
        #[arg(long, default_value = ".")]
        code_path: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        summary: String,
        #[arg(long, default_value = "")]
        context: String,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON only.
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("arbor={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Arbor v{}", env!("CARGO_PKG_VERSION"));

    let engine = commands::engine(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => commands::serve(engine),
        Commands::Hash { path } => commands::hash(&engine, &path),
        Commands::Symbols { path } => commands::symbols(&engine, &path),
        Commands::Tree { path } => commands::tree(&engine, &path),
        Commands::Status { path } => commands::status(&engine, &path),
        Commands::Validate { path } => {
            if !commands::validate(&engine, &path)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Sync { path } => commands::sync(&engine, &path),
        Commands::Body { path, symbol } => commands::body(&engine, &path, &symbol),
        Commands::Exclude {
            root,
            action,
            target,
        } => commands::exclude(&engine, &root, &action, &target),
        Commands::Scaffold {
            path,
            name,
            component_type,
            title,
            summary,
            context,
        } => commands::scaffold(
            &engine,
            arbor_engine::ScaffoldParams {
                path,
                name,
                component_type,
                title,
                summary,
                context,
            },
        ),
        Commands::InitAgent { path } => commands::init_agent(&engine, &path),
        Commands::InitProject {
            path,
            code_path,
            title,
            summary,
            context,
        } => commands::init_project(
            &engine,
            &path,
            &code_path,
            arbor_engine::ScaffoldParams {
                title,
                summary,
                context,
                ..Default::default()
            },
        ),
        Commands::Version => {
            println!("arbor v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
