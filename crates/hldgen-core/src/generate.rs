//! Idempotent artifact generation.
//!
//! Every entry point resolves its target file, skips with a warning when a
//! regular file is already there, and otherwise builds, serializes and writes
//! the document before reporting what the operator has to do next. Storage
//! faults are returned as-is; nothing is retried or cleaned up, and the
//! existence check is not locked against concurrent writers.

use crate::bedrock::BedrockFile;
use crate::error::Result;
use crate::io;
use crate::maintainers::{Maintainer, MaintainersFile};
use crate::paths::{self, normalize_service_path, ServiceName};
use crate::report::Reporter;
use crate::templates;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Written { path: PathBuf },
    Skipped { path: PathBuf },
}

impl Outcome {
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Written { path } | Outcome::Skipped { path } => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Outcome::Written { .. })
    }
}

// ---------------------------------------------------------------------------
// Required pipeline variables
// ---------------------------------------------------------------------------

const HLD_REPO_VAR: (&str, &str) = (
    "HLD_REPO",
    "Repository for your HLD in AzDo. eg. 'dev.azure.com/bhnook/fabrikam/_git/hld'",
);
const PAT_VAR: (&str, &str) = (
    "PAT",
    "AzDo Personal Access Token with permissions to the HLD repository.",
);

pub const SERVICE_PIPELINE_VARIABLES: &[(&str, &str)] = &[
    ("ACR_NAME", "name of your ACR"),
    HLD_REPO_VAR,
    PAT_VAR,
    ("SP_APP_ID", "service principal ID with access to your ACR"),
    ("SP_PASS", "service principal secret"),
    ("SP_TENANT", "service principal tenant"),
];

pub const MANIFEST_PIPELINE_VARIABLES: &[(&str, &str)] = &[
    (
        "MANIFEST_REPO",
        "Repository for your kubernetes manifests in AzDo. eg. 'dev.azure.com/bhnook/fabrikam/_git/materialized'",
    ),
    PAT_VAR,
];

pub const LIFECYCLE_PIPELINE_VARIABLES: &[(&str, &str)] = &[HLD_REPO_VAR, PAT_VAR];

fn describe_variables(vars: &[(&str, &str)]) -> String {
    vars.iter()
        .map(|(name, about)| format!("'{name}' ({about})"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Resolve `dir/filename`, skip if it exists, otherwise render and write it.
fn generate_file<F>(
    dir: &Path,
    filename: &str,
    reporter: &dyn Reporter,
    render: F,
) -> Result<Outcome>
where
    F: FnOnce() -> Result<String>,
{
    let path = paths::resolve(dir)?.join(filename);

    if io::file_exists(&path) {
        reporter.warn(&format!(
            "Existing {filename} found at {}, skipping generation.",
            path.display()
        ));
        return Ok(Outcome::Skipped { path });
    }

    let text = render()?;
    reporter.info(&format!("Writing {filename} file to {}", path.display()));
    if io::write_if_missing(&path, &text)? {
        Ok(Outcome::Written { path })
    } else {
        Ok(Outcome::Skipped { path })
    }
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Write the build-and-update pipeline into the service directory.
///
/// The trigger path filter is the service path relative to `project_root`.
pub fn generate_service_pipeline(
    project_root: &Path,
    service_path: &Path,
    service_name: &ServiceName,
    ring_branches: &[String],
    variable_groups: &[String],
    reporter: &dyn Reporter,
) -> Result<Outcome> {
    let abs_root = paths::resolve(project_root)?;
    let abs_service = paths::resolve(service_path)?;
    let filename = paths::SERVICE_PIPELINE_FILENAME;

    reporter.info(&format!("Generating {filename} in {}", abs_service.display()));
    reporter.debug(&format!("variable groups: {}", variable_groups.len()));

    let rel_path = normalize_service_path(&paths::relative_path(&abs_root, &abs_service));
    let outcome = generate_file(&abs_service, filename, reporter, || {
        let pipeline = templates::service_build_and_update_pipeline(
            service_name.as_str(),
            &rel_path,
            ring_branches,
            variable_groups,
        )?;
        templates::to_yaml(&pipeline)
    })?;

    if outcome.is_written() {
        reporter.info(&format!(
            "Generated {filename} for service in path '{rel_path}'. Commit and push this file to master before attempting to deploy via the command 'spk service install-build-pipeline {service_name}'; before running the pipeline ensure the following environment variables are available to your project variable groups: {}",
            describe_variables(SERVICE_PIPELINE_VARIABLES)
        ));
    }
    Ok(outcome)
}

/// Write the manifest-generation pipeline into an HLD repository.
pub fn generate_hld_pipeline(hld_dir: &Path, reporter: &dyn Reporter) -> Result<Outcome> {
    let filename = paths::RENDER_HLD_PIPELINE_FILENAME;
    reporter.info(&format!(
        "Generating hld manifest-generation in {}",
        paths::resolve(hld_dir)?.display()
    ));

    let outcome = generate_file(hld_dir, filename, reporter, || {
        templates::to_yaml(&templates::manifest_generation_pipeline())
    })?;

    if outcome.is_written() {
        reporter.info(&format!(
            "Generated {filename}. Commit and push this file to master before attempting to deploy via the command 'spk hld install-manifest-pipeline'; before running the pipeline ensure the following environment variables are available to your pipeline: {}",
            describe_variables(MANIFEST_PIPELINE_VARIABLES)
        ));
    }
    Ok(outcome)
}

/// Write the HLD lifecycle (reconcile) pipeline into the project root.
pub fn generate_lifecycle_pipeline(project_root: &Path, reporter: &dyn Reporter) -> Result<Outcome> {
    let filename = paths::PROJECT_PIPELINE_FILENAME;
    reporter.info(&format!(
        "Generating hld lifecycle pipeline {filename} in {}",
        paths::resolve(project_root)?.display()
    ));

    let outcome = generate_file(project_root, filename, reporter, || {
        templates::to_yaml(&templates::hld_lifecycle_pipeline())
    })?;

    if outcome.is_written() {
        reporter.info(&format!(
            "Generated {filename}. Commit and push this file to master before attempting to deploy via the command 'spk project install-lifecycle-pipeline'; before running the pipeline ensure the following environment variables are available to your pipeline: {}",
            describe_variables(LIFECYCLE_PIPELINE_VARIABLES)
        ));
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Repository scaffolding
// ---------------------------------------------------------------------------

pub fn generate_default_component(dir: &Path, reporter: &dyn Reporter) -> Result<Outcome> {
    reporter.info(&format!(
        "Generating {} in {}",
        paths::COMPONENT_FILENAME,
        paths::resolve(dir)?.display()
    ));
    generate_file(dir, paths::COMPONENT_FILENAME, reporter, || {
        templates::to_yaml(&templates::default_component())
    })
}

pub fn generate_gitignore(dir: &Path, content: &str, reporter: &dyn Reporter) -> Result<Outcome> {
    reporter.info(&format!(
        "Generating starter .gitignore in {}",
        paths::resolve(dir)?.display()
    ));
    generate_file(dir, paths::GITIGNORE_FILENAME, reporter, || {
        Ok(content.to_string())
    })
}

pub fn generate_dockerfile(dir: &Path, reporter: &dyn Reporter) -> Result<Outcome> {
    reporter.info(&format!(
        "Generating starter Dockerfile in {}",
        paths::resolve(dir)?.display()
    ));
    generate_file(dir, paths::DOCKERFILE_FILENAME, reporter, || {
        Ok(templates::DEFAULT_DOCKERFILE.to_string())
    })
}

/// Starter `maintainers.yaml` owning the project root.
pub fn generate_maintainers(
    dir: &Path,
    maintainers: Vec<Maintainer>,
    reporter: &dyn Reporter,
) -> Result<Outcome> {
    generate_file(dir, paths::MAINTAINERS_FILENAME, reporter, || {
        templates::to_yaml(&MaintainersFile::for_project(maintainers))
    })
}

/// Empty `bedrock.yaml` with no rings, services or variable groups.
pub fn generate_bedrock(dir: &Path, reporter: &dyn Reporter) -> Result<Outcome> {
    generate_file(dir, paths::BEDROCK_FILENAME, reporter, || {
        templates::to_yaml(&BedrockFile::default())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HldgenError;
    use crate::pipeline::AzurePipeline;
    use crate::report::{Level, RecordingReporter};
    use tempfile::TempDir;

    fn name(s: &str) -> ServiceName {
        ServiceName::parse(s).unwrap()
    }

    fn branches() -> Vec<String> {
        vec!["master".to_string(), "qa".to_string(), "test".to_string()]
    }

    fn service_pipeline(root: &Path, reporter: &RecordingReporter) -> Outcome {
        let service = root.join("my-service");
        std::fs::create_dir_all(&service).unwrap();
        generate_service_pipeline(root, &service, &name("my-service"), &branches(), &[], reporter)
            .unwrap()
    }

    #[test]
    fn service_pipeline_scenario() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();
        let outcome = service_pipeline(dir.path(), &reporter);
        assert!(outcome.is_written());
        assert!(outcome.path().ends_with("my-service/build-update-hld.yaml"));

        let yaml = std::fs::read_to_string(outcome.path()).unwrap();
        let pipeline: AzurePipeline = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(pipeline.trigger.paths.unwrap().include, vec!["./my-service"]);
        let stages = pipeline.stages.unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].stage, "build");
        let condition = stages[1].condition.as_deref().unwrap();
        assert!(condition.contains("DEPLOY/"));
        assert!(condition.contains("'master'"));
    }

    #[test]
    fn second_call_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();
        let first = service_pipeline(dir.path(), &reporter);
        let before = std::fs::read(first.path()).unwrap();
        let mtime = std::fs::metadata(first.path()).unwrap().modified().unwrap();

        let again = RecordingReporter::new();
        let second = service_pipeline(dir.path(), &again);
        assert_eq!(
            second,
            Outcome::Skipped {
                path: first.path().to_path_buf()
            }
        );
        assert_eq!(std::fs::read(first.path()).unwrap(), before);
        assert_eq!(
            std::fs::metadata(first.path()).unwrap().modified().unwrap(),
            mtime
        );

        let warnings = again.messages(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Existing build-update-hld.yaml found at"));
        assert!(warnings[0].contains("skipping generation"));
    }

    #[test]
    fn existing_file_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hld-lifecycle.yaml"), "custom: true\n").unwrap();
        let outcome = generate_lifecycle_pipeline(dir.path(), &RecordingReporter::new()).unwrap();
        assert!(!outcome.is_written());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("hld-lifecycle.yaml")).unwrap(),
            "custom: true\n"
        );
    }

    #[test]
    fn output_is_deterministic_across_directories() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();

        let pa = service_pipeline(a.path(), &reporter);
        let pb = service_pipeline(b.path(), &reporter);
        assert_eq!(
            std::fs::read(pa.path()).unwrap(),
            std::fs::read(pb.path()).unwrap()
        );

        let ha = generate_hld_pipeline(a.path(), &reporter).unwrap();
        let hb = generate_hld_pipeline(b.path(), &reporter).unwrap();
        assert_eq!(
            std::fs::read(ha.path()).unwrap(),
            std::fs::read(hb.path()).unwrap()
        );
    }

    #[test]
    fn nested_service_path_is_relative_to_root() {
        let dir = TempDir::new().unwrap();
        let service = dir.path().join("packages/service1");
        std::fs::create_dir_all(&service).unwrap();
        let outcome = generate_service_pipeline(
            dir.path(),
            &service,
            &name("service1"),
            &["master".to_string()],
            &["my-vg".to_string()],
            &RecordingReporter::new(),
        )
        .unwrap();

        let pipeline: AzurePipeline =
            serde_yaml::from_str(&std::fs::read_to_string(outcome.path()).unwrap()).unwrap();
        assert_eq!(
            pipeline.trigger.paths.unwrap().include,
            vec!["./packages/service1"]
        );
        assert_eq!(pipeline.variables.unwrap()[0].group, "my-vg");
    }

    #[test]
    fn service_at_project_root() {
        let dir = TempDir::new().unwrap();
        let outcome = generate_service_pipeline(
            dir.path(),
            dir.path(),
            &name("root-svc"),
            &["master".to_string()],
            &[],
            &RecordingReporter::new(),
        )
        .unwrap();
        let pipeline: AzurePipeline =
            serde_yaml::from_str(&std::fs::read_to_string(outcome.path()).unwrap()).unwrap();
        assert_eq!(pipeline.trigger.paths.unwrap().include, vec!["./"]);
    }

    #[test]
    fn service_follow_up_lists_required_variables() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();
        service_pipeline(dir.path(), &reporter);

        let infos = reporter.messages(Level::Info);
        let follow_up = infos.last().unwrap();
        for var in ["ACR_NAME", "HLD_REPO", "PAT", "SP_APP_ID", "SP_PASS", "SP_TENANT"] {
            assert!(follow_up.contains(&format!("'{var}'")), "missing {var}");
        }
        assert!(follow_up.contains("'spk service install-build-pipeline my-service'"));
        assert!(reporter.messages(Level::Warn).is_empty());
    }

    #[test]
    fn skipped_generation_has_no_follow_up() {
        let dir = TempDir::new().unwrap();
        generate_hld_pipeline(dir.path(), &RecordingReporter::new()).unwrap();

        let reporter = RecordingReporter::new();
        generate_hld_pipeline(dir.path(), &reporter).unwrap();
        assert!(reporter
            .messages(Level::Info)
            .iter()
            .all(|m| !m.contains("MANIFEST_REPO")));
    }

    #[test]
    fn hld_and_lifecycle_follow_ups() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();
        generate_hld_pipeline(dir.path(), &reporter).unwrap();
        generate_lifecycle_pipeline(dir.path(), &reporter).unwrap();

        let infos = reporter.messages(Level::Info);
        assert!(infos
            .iter()
            .any(|m| m.contains("'MANIFEST_REPO'") && m.contains("spk hld install-manifest-pipeline")));
        assert!(infos
            .iter()
            .any(|m| m.contains("'HLD_REPO'") && m.contains("spk project install-lifecycle-pipeline")));
    }

    #[test]
    fn no_branches_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let err = generate_service_pipeline(
            dir.path(),
            dir.path(),
            &name("svc"),
            &[],
            &[],
            &RecordingReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, HldgenError::NoRingBranches));
        assert!(!dir.path().join(paths::SERVICE_PIPELINE_FILENAME).exists());
    }

    #[test]
    fn missing_directory_is_a_storage_fault() {
        let dir = TempDir::new().unwrap();
        let err = generate_dockerfile(&dir.path().join("nope"), &RecordingReporter::new())
            .unwrap_err();
        assert!(matches!(err, HldgenError::Io(_)));
    }

    #[test]
    fn scaffolding_files() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();

        generate_gitignore(dir.path(), "spk.log", &reporter).unwrap();
        generate_dockerfile(dir.path(), &reporter).unwrap();
        generate_default_component(dir.path(), &reporter).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "spk.log"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Dockerfile")).unwrap(),
            "FROM alpine\nRUN echo 'hello world'"
        );
        let component = std::fs::read_to_string(dir.path().join("component.yaml")).unwrap();
        assert!(component.starts_with("name: default-component\n"));

        let second = generate_gitignore(dir.path(), "other", &reporter).unwrap();
        assert!(!second.is_written());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            "spk.log"
        );
    }

    #[test]
    fn project_documents() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();
        generate_bedrock(dir.path(), &reporter).unwrap();
        generate_maintainers(
            dir.path(),
            vec![Maintainer::new("my name", "me@example.com")],
            &reporter,
        )
        .unwrap();

        let bedrock = BedrockFile::load(&dir.path().join("bedrock.yaml")).unwrap();
        assert_eq!(bedrock, BedrockFile::default());
        let maintainers = MaintainersFile::load(&dir.path().join("maintainers.yaml")).unwrap();
        assert_eq!(maintainers.services["./"].maintainers[0].name, "my name");
    }

    #[test]
    fn outcome_json_shape() {
        let outcome = Outcome::Skipped {
            path: PathBuf::from("/tmp/x/.gitignore"),
        };
        let yaml = serde_yaml::to_string(&outcome).unwrap();
        assert_eq!(yaml, "status: skipped\npath: /tmp/x/.gitignore\n");
    }
}
