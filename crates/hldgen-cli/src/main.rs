mod cmd;
mod output;
mod report;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    hld::HldSubcommand, maintainers::MaintainersSubcommand, project::ProjectSubcommand,
    service::ServiceSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hldgen",
    about = "Generate Azure Pipelines definitions and scaffolding for a GitOps HLD workflow",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from bedrock.yaml or .git/)
    #[arg(long, global = true, env = "HLDGEN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a project and its HLD lifecycle pipeline
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Scaffold an HLD repository and its manifest-generation pipeline
    Hld {
        #[command(subcommand)]
        subcommand: HldSubcommand,
    },

    /// Create services and their build-and-update pipelines
    Service {
        #[command(subcommand)]
        subcommand: ServiceSubcommand,
    },

    /// Manage maintainers.yaml
    Maintainers {
        #[command(subcommand)]
        subcommand: MaintainersSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = hldgen_core::paths::resolve(&root)
        .map_err(anyhow::Error::from)
        .and_then(|root| match cli.command {
            Commands::Project { subcommand } => cmd::project::run(&root, subcommand, cli.json),
            Commands::Hld { subcommand } => cmd::hld::run(&root, subcommand, cli.json),
            Commands::Service { subcommand } => cmd::service::run(&root, subcommand, cli.json),
            Commands::Maintainers { subcommand } => {
                cmd::maintainers::run(&root, subcommand, cli.json)
            }
        });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
