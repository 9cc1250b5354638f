use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use hldgen_core::maintainers::{add_service_to_maintainers_file, Maintainer};
use hldgen_core::paths;
use std::path::Path;

#[derive(Subcommand)]
pub enum MaintainersSubcommand {
    /// Record (or replace) the maintainers of a service path
    Add {
        /// Service path relative to the project root
        service_path: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

pub fn run(root: &Path, subcmd: MaintainersSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MaintainersSubcommand::Add {
            service_path,
            name,
            email,
        } => add(root, &service_path, Maintainer::new(name, email), json),
    }
}

fn add(root: &Path, service_path: &str, maintainer: Maintainer, json: bool) -> anyhow::Result<()> {
    let file = paths::maintainers_path(root);
    let service_path = service_path.trim_start_matches("./");
    add_service_to_maintainers_file(&file, service_path, vec![maintainer.clone()])
        .with_context(|| format!("failed to update {}", file.display()))?;
    tracing::info!("Updating {}", paths::MAINTAINERS_FILENAME);

    let key = paths::normalize_service_path(service_path);
    if json {
        print_json(&serde_json::json!({
            "service": key,
            "maintainers": [maintainer],
        }))?;
    } else {
        println!("  updated: {} ({key})", paths::MAINTAINERS_FILENAME);
    }
    Ok(())
}
