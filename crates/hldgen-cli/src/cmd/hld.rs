use crate::output::print_outcomes;
use crate::report::TracingReporter;
use anyhow::Context;
use clap::Subcommand;
use hldgen_core::{generate, templates};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum HldSubcommand {
    /// Scaffold an HLD repository: manifest-generation pipeline, component.yaml, .gitignore
    Init {
        /// HLD repository directory (default: project root)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: HldSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        HldSubcommand::Init { dir } => init(root, dir.as_deref(), json),
    }
}

fn init(root: &Path, dir: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let hld_dir = dir.map(|d| root.join(d)).unwrap_or_else(|| root.to_path_buf());
    let reporter = TracingReporter;

    let outcomes = vec![
        generate::generate_hld_pipeline(&hld_dir, &reporter)
            .context("failed to write manifest-generation pipeline")?,
        generate::generate_default_component(&hld_dir, &reporter)
            .context("failed to write component.yaml")?,
        generate::generate_gitignore(&hld_dir, templates::DEFAULT_GITIGNORE, &reporter)
            .context("failed to write .gitignore")?,
    ];
    print_outcomes(root, &outcomes, json)
}
