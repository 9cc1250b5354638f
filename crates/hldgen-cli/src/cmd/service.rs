use crate::output::print_outcomes;
use crate::report::TracingReporter;
use anyhow::Context;
use clap::{Args, Subcommand};
use hldgen_core::{
    bedrock::BedrockFile,
    generate, io,
    maintainers::{add_service_to_maintainers_file, Maintainer},
    paths::{self, ServiceName},
    templates,
};
use std::path::{Path, PathBuf};

/// Ring used when neither `--ring` nor `bedrock.yaml` names one.
const FALLBACK_RING: &str = "master";

#[derive(Subcommand)]
pub enum ServiceSubcommand {
    /// Create a service directory with .gitignore, Dockerfile and build pipeline
    Create {
        #[command(flatten)]
        target: PipelineArgs,
        /// Maintainer recorded for the service in maintainers.yaml
        #[arg(long, requires = "maintainer_email")]
        maintainer_name: Option<String>,
        /// Email of the service maintainer
        #[arg(long, requires = "maintainer_name")]
        maintainer_email: Option<String>,
    },
    /// Write only the build-and-update pipeline for a service
    Pipeline {
        #[command(flatten)]
        target: PipelineArgs,
    },
}

#[derive(Args)]
pub struct PipelineArgs {
    /// Service name
    pub name: ServiceName,
    /// Service directory relative to the project root (default: <name>)
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Branch that triggers the build (repeatable; default: rings in bedrock.yaml)
    #[arg(long = "ring", value_name = "BRANCH")]
    pub rings: Vec<String>,
    /// Azure DevOps variable group (repeatable; default: variableGroups in bedrock.yaml)
    #[arg(long = "variable-group", value_name = "GROUP")]
    pub variable_groups: Vec<String>,
}

pub fn run(root: &Path, subcmd: ServiceSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ServiceSubcommand::Create {
            target,
            maintainer_name,
            maintainer_email,
        } => {
            let maintainers = match (maintainer_name, maintainer_email) {
                (Some(name), Some(email)) => vec![Maintainer::new(name, email)],
                _ => Vec::new(),
            };
            create(root, &target, maintainers, json)
        }
        ServiceSubcommand::Pipeline { target } => {
            let outcome = write_pipeline(root, &target)?;
            print_outcomes(root, &[outcome], json)
        }
    }
}

fn service_dir(root: &Path, target: &PipelineArgs) -> PathBuf {
    match &target.path {
        Some(p) => root.join(p),
        None => root.join(target.name.as_str()),
    }
}

/// Explicit flags win; otherwise fall back to bedrock.yaml, if present.
fn pipeline_inputs(
    root: &Path,
    target: &PipelineArgs,
) -> anyhow::Result<(Vec<String>, Vec<String>)> {
    let bedrock_path = paths::bedrock_path(root);
    let bedrock = if bedrock_path.is_file() {
        BedrockFile::load(&bedrock_path)
            .with_context(|| format!("failed to load {}", bedrock_path.display()))?
    } else {
        BedrockFile::default()
    };

    let mut rings = if target.rings.is_empty() {
        bedrock.ring_branches()
    } else {
        target.rings.clone()
    };
    if rings.is_empty() {
        rings.push(FALLBACK_RING.to_string());
    }

    let groups = if target.variable_groups.is_empty() {
        bedrock.variable_groups
    } else {
        target.variable_groups.clone()
    };
    Ok((rings, groups))
}

fn write_pipeline(root: &Path, target: &PipelineArgs) -> anyhow::Result<generate::Outcome> {
    let (rings, groups) = pipeline_inputs(root, target)?;
    let dir = service_dir(root, target);
    generate::generate_service_pipeline(
        root,
        &dir,
        &target.name,
        &rings,
        &groups,
        &TracingReporter,
    )
    .with_context(|| format!("failed to write build pipeline for '{}'", target.name))
}

fn create(
    root: &Path,
    target: &PipelineArgs,
    maintainers: Vec<Maintainer>,
    json: bool,
) -> anyhow::Result<()> {
    let maintainers_file = paths::maintainers_path(root);
    if !maintainers_file.is_file() {
        anyhow::bail!(
            "{} not found in {}: run 'hldgen project init' first",
            paths::MAINTAINERS_FILENAME,
            root.display()
        );
    }

    let dir = service_dir(root, target);
    let rel_path = paths::relative_path(&paths::resolve(root)?, &paths::resolve(&dir)?);
    if rel_path.is_empty() {
        anyhow::bail!(
            "service directory for '{}' is the project root; pass --path <dir>",
            target.name
        );
    }
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let reporter = TracingReporter;
    let outcomes = vec![
        generate::generate_gitignore(&dir, templates::DEFAULT_GITIGNORE, &reporter)
            .context("failed to write .gitignore")?,
        generate::generate_dockerfile(&dir, &reporter).context("failed to write Dockerfile")?,
        write_pipeline(root, target)?,
    ];

    add_service_to_maintainers_file(&maintainers_file, &rel_path, maintainers)
        .with_context(|| format!("failed to update {}", maintainers_file.display()))?;
    tracing::info!("Updating {}", paths::MAINTAINERS_FILENAME);

    if !json {
        println!("Creating service '{}' in: {}", target.name, dir.display());
    }
    print_outcomes(root, &outcomes, json)?;
    if !json {
        println!(
            "  updated: {} ({})",
            paths::MAINTAINERS_FILENAME,
            paths::normalize_service_path(&rel_path)
        );
    }
    Ok(())
}
