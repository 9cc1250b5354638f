use crate::output::print_outcomes;
use crate::report::TracingReporter;
use anyhow::Context;
use clap::Subcommand;
use hldgen_core::{generate, maintainers::Maintainer, templates};
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Scaffold bedrock.yaml, maintainers.yaml, the lifecycle pipeline and .gitignore
    Init {
        /// Maintainer recorded for the project root
        #[arg(long, requires = "maintainer_email")]
        maintainer_name: Option<String>,
        /// Email of the project root maintainer
        #[arg(long, requires = "maintainer_name")]
        maintainer_email: Option<String>,
    },
    /// Write only the HLD lifecycle pipeline (hld-lifecycle.yaml)
    LifecyclePipeline,
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Init {
            maintainer_name,
            maintainer_email,
        } => {
            let maintainers = match (maintainer_name, maintainer_email) {
                (Some(name), Some(email)) => vec![Maintainer::new(name, email)],
                _ => Vec::new(),
            };
            init(root, maintainers, json)
        }
        ProjectSubcommand::LifecyclePipeline => {
            let outcome = generate::generate_lifecycle_pipeline(root, &TracingReporter)
                .context("failed to write lifecycle pipeline")?;
            print_outcomes(root, &[outcome], json)
        }
    }
}

fn init(root: &Path, maintainers: Vec<Maintainer>, json: bool) -> anyhow::Result<()> {
    let reporter = TracingReporter;
    let outcomes = vec![
        generate::generate_bedrock(root, &reporter).context("failed to write bedrock.yaml")?,
        generate::generate_maintainers(root, maintainers, &reporter)
            .context("failed to write maintainers.yaml")?,
        generate::generate_lifecycle_pipeline(root, &reporter)
            .context("failed to write lifecycle pipeline")?,
        generate::generate_gitignore(root, templates::DEFAULT_GITIGNORE, &reporter)
            .context("failed to write .gitignore")?,
    ];

    if !json {
        println!("Initializing project in: {}", root.display());
    }
    print_outcomes(root, &outcomes, json)?;
    if !json {
        println!("\nNext: hldgen service create <name>");
    }
    Ok(())
}
