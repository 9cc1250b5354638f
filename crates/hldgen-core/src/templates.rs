//! Pure document builders. Nothing here touches the filesystem or reports;
//! identical inputs give identical documents.

use crate::component::{Component, Subcomponent};
use crate::error::{HldgenError, Result};
use crate::paths::{normalize_service_path, VM_IMAGE};
use crate::pipeline::{
    AzurePipeline, CheckoutStep, Env, Filter, Job, Pool, ScriptStep, Stage, Step, TaskStep,
    Trigger, VariableGroup,
};
use indexmap::IndexMap;
use serde::Serialize;

pub const DEFAULT_DOCKERFILE: &str = "FROM alpine\nRUN echo 'hello world'";
pub const DEFAULT_GITIGNORE: &str = "spk.log";

const INTROSPECTION_CONDITION: &str = "and(ne(variables['INTROSPECTION_ACCOUNT_NAME'], ''), ne(variables['INTROSPECTION_ACCOUNT_KEY'], ''),ne(variables['INTROSPECTION_TABLE_NAME'], ''),ne(variables['INTROSPECTION_PARTITION_KEY'], ''))";
const HLD_UPDATE_CONDITION: &str = "and(succeeded('build'), or(startsWith(variables['Build.SourceBranch'], 'refs/heads/DEPLOY/'),eq(variables['Build.SourceBranchName'],'master')))";
const BUILD_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/Microsoft/bedrock/master/gitops/azure-devops/build.sh";

/// Serialize a document. Keys keep declaration/insertion order and long
/// lines are never folded.
pub fn to_yaml<T: Serialize>(document: &T) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

fn script<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

fn env(pairs: &[(&str, &str)]) -> Env {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_yaml::Value::from(*v)))
        .collect()
}

fn pool() -> Pool {
    Pool {
        vm_image: VM_IMAGE.to_string(),
    }
}

fn master_trigger() -> Trigger {
    Trigger {
        branches: Some(Filter::include(["master"])),
        paths: None,
    }
}

fn download_build_script_step() -> Step {
    Step::Script(ScriptStep {
        script: script(&[
            "# Download build.sh",
            "curl $BEDROCK_BUILD_SCRIPT > build.sh",
            "chmod +x ./build.sh",
        ]),
        display_name: "Download bedrock bash scripts".to_string(),
        condition: None,
        env: Some(env(&[("BEDROCK_BUILD_SCRIPT", "$(BUILD_SCRIPT_URL)")])),
    })
}

fn hld_push_env() -> Env {
    env(&[
        ("ACCESS_TOKEN_SECRET", "$(PAT)"),
        ("AZURE_DEVOPS_EXT_PAT", "$(PAT)"),
        ("REPO", "$(HLD_REPO)"),
    ])
}

// ---------------------------------------------------------------------------
// Service build and update pipeline
// ---------------------------------------------------------------------------

/// Two-stage pipeline for one service: build and push the image, then open a
/// pull request against the HLD repository bumping the image tag.
pub fn service_build_and_update_pipeline(
    service_name: &str,
    rel_service_path: &str,
    ring_branches: &[String],
    variable_groups: &[String],
) -> Result<AzurePipeline> {
    if ring_branches.is_empty() {
        return Err(HldgenError::NoRingBranches);
    }
    let service_path = normalize_service_path(rel_service_path);

    let build = Stage {
        stage: "build".to_string(),
        depends_on: None,
        condition: None,
        jobs: vec![Job {
            job: "run_build_push_acr".to_string(),
            pool: pool(),
            steps: vec![
                azure_login_step(),
                build_introspection_step(service_name),
                acr_build_step(service_name, &service_path),
            ],
        }],
    };

    let hld_update = Stage {
        stage: "hld_update".to_string(),
        depends_on: Some("build".to_string()),
        condition: Some(HLD_UPDATE_CONDITION.to_string()),
        jobs: vec![Job {
            job: "update_image_tag".to_string(),
            pool: pool(),
            steps: vec![download_build_script_step(), update_hld_step(service_name)],
        }],
    };

    Ok(AzurePipeline {
        trigger: Trigger {
            branches: Some(Filter::include(ring_branches.iter().cloned())),
            paths: Some(Filter::include([service_path])),
        },
        variables: Some(
            variable_groups
                .iter()
                .map(|group| VariableGroup {
                    group: group.clone(),
                })
                .collect(),
        ),
        pool: None,
        stages: Some(vec![build, hld_update]),
        steps: None,
    })
}

fn azure_login_step() -> Step {
    Step::Script(ScriptStep {
        script: script(&[
            r#"echo "az login --service-principal --username $(SP_APP_ID) --password $(SP_PASS) --tenant $(SP_TENANT)""#,
            r#"az login --service-principal --username "$(SP_APP_ID)" --password "$(SP_PASS)" --tenant "$(SP_TENANT)""#,
        ]),
        display_name: "Azure Login".to_string(),
        condition: None,
        env: None,
    })
}

fn build_introspection_step(service_name: &str) -> Step {
    Step::Script(ScriptStep {
        script: script(&[
            format!("export BUILD_REPO_NAME=$(echo $(Build.Repository.Name)-{service_name} | tr '[:upper:]' '[:lower:]')"),
            r#"tag_name="$BUILD_REPO_NAME:$(Build.SourceBranchName)-$(Build.BuildNumber)""#.to_string(),
            "commitId=$(Build.SourceVersion)".to_string(),
            r#"commitId=$(echo "${commitId:0:7}")"#.to_string(),
            "service=$(Build.Repository.Name)".to_string(),
            "service=${service##*/}".to_string(),
            r#"echo "Downloading SPK""#.to_string(),
            format!("curl {BUILD_SCRIPT_URL} > build.sh"),
            "chmod +x build.sh".to_string(),
            ". ./build.sh --source-only".to_string(),
            "get_spk_version".to_string(),
            "download_spk".to_string(),
            "./spk/spk deployment create -n $(INTROSPECTION_ACCOUNT_NAME) -k $(INTROSPECTION_ACCOUNT_KEY) -t $(INTROSPECTION_TABLE_NAME) -p $(INTROSPECTION_PARTITION_KEY) --p1 $(Build.BuildId) --image-tag $tag_name --commit-id $commitId --service $service".to_string(),
        ]),
        display_name: "If configured, update Spektate storage with build pipeline".to_string(),
        condition: Some(INTROSPECTION_CONDITION.to_string()),
        env: None,
    })
}

fn acr_build_step(service_name: &str, service_path: &str) -> Step {
    Step::Script(ScriptStep {
        script: script(&[
            format!("export BUILD_REPO_NAME=$(echo $(Build.Repository.Name)-{service_name} | tr '[:upper:]' '[:lower:]')"),
            r#"echo "Image Name: $BUILD_REPO_NAME""#.to_string(),
            format!("cd {service_path}"),
            r#"echo "az acr build -r $(ACR_NAME) --image $BUILD_REPO_NAME:$(Build.SourceBranchName)-$(Build.BuildNumber) .""#.to_string(),
            "az acr build -r $(ACR_NAME) --image $BUILD_REPO_NAME:$(Build.SourceBranchName)-$(Build.BuildNumber) .".to_string(),
        ]),
        display_name: "ACR Build and Publish".to_string(),
        condition: None,
        env: None,
    })
}

fn update_hld_step(service_name: &str) -> Step {
    Step::Script(ScriptStep {
        script: script(&[
            format!("export SERVICE_NAME_LOWER=$(echo {service_name} | tr '[:upper:]' '[:lower:]')"),
            "export BUILD_REPO_NAME=$(echo $(Build.Repository.Name)-$SERVICE_NAME_LOWER | tr '[:upper:]' '[:lower:]')".to_string(),
            "export BRANCH_NAME=DEPLOY/$BUILD_REPO_NAME-$(Build.SourceBranchName)-$(Build.BuildNumber)".to_string(),
            "# --- From https://raw.githubusercontent.com/Microsoft/bedrock/master/gitops/azure-devops/release.sh".to_string(),
            ". build.sh --source-only".to_string(),
            String::new(),
            "# Initialization".to_string(),
            "verify_access_token".to_string(),
            "init".to_string(),
            "helm init".to_string(),
            String::new(),
            "# Fabrikate".to_string(),
            "get_fab_version".to_string(),
            "download_fab".to_string(),
            String::new(),
            "# Clone HLD repo".to_string(),
            "git_connect".to_string(),
            "# --- End Script".to_string(),
            String::new(),
            "# Update HLD".to_string(),
            r#"git checkout -b "$BRANCH_NAME""#.to_string(),
            "../fab/fab set --subcomponent $SERVICE_NAME_LOWER image.tag=$(Build.SourceBranchName)-$(Build.BuildNumber)".to_string(),
            r#"echo "GIT STATUS""#.to_string(),
            "git status".to_string(),
            r#"echo "GIT ADD (git add -A)""#.to_string(),
            "git add -A".to_string(),
            String::new(),
            "# Set git identity".to_string(),
            r#"git config user.email "admin@azuredevops.com""#.to_string(),
            r#"git config user.name "Automated Account""#.to_string(),
            String::new(),
            "# Commit changes".to_string(),
            r#"echo "GIT COMMIT""#.to_string(),
            r#"git commit -m "Updating $SERVICE_NAME_LOWER image tag to $(Build.SourceBranchName)-$(Build.BuildNumber).""#.to_string(),
            String::new(),
            "# Git Push".to_string(),
            "git_push".to_string(),
            String::new(),
            "# Open PR via az repo cli".to_string(),
            "echo 'az extension add --name azure-devops'".to_string(),
            "az extension add --name azure-devops".to_string(),
            String::new(),
            r#"echo 'az repos pr create --description "Updating $SERVICE_NAME_LOWER to $(Build.SourceBranchName)-$(Build.BuildNumber)."'"#.to_string(),
            r#"response=$(az repos pr create --description "Updating $SERVICE_NAME_LOWER to $(Build.SourceBranchName)-$(Build.BuildNumber).")"#.to_string(),
            "pr_id=$(echo $response | jq -r '.pullRequestId')".to_string(),
            String::new(),
            String::new(),
            "# Update introspection storage with this information, if applicable".to_string(),
            r#"if [ -z "$(INTROSPECTION_ACCOUNT_NAME)" -o -z "$(INTROSPECTION_ACCOUNT_KEY)" -o -z "$(INTROSPECTION_TABLE_NAME)" -o -z "$(INTROSPECTION_PARTITION_KEY)" ]; then"#.to_string(),
            r#"echo "Introspection variables are not defined. Skipping...""#.to_string(),
            "else".to_string(),
            "latest_commit=$(git rev-parse --short HEAD)".to_string(),
            r#"tag_name="$BUILD_REPO_NAME:$(Build.SourceBranchName)-$(Build.BuildNumber)""#.to_string(),
            r#"echo "Downloading SPK""#.to_string(),
            format!("curl {BUILD_SCRIPT_URL} > build.sh"),
            "chmod +x build.sh".to_string(),
            ". ./build.sh --source-only".to_string(),
            "get_spk_version".to_string(),
            "download_spk".to_string(),
            "./spk/spk deployment create  -n $(INTROSPECTION_ACCOUNT_NAME) -k $(INTROSPECTION_ACCOUNT_KEY) -t $(INTROSPECTION_TABLE_NAME) -p $(INTROSPECTION_PARTITION_KEY) --p2 $(Build.BuildId) --hld-commit-id $latest_commit --env $BRANCH_NAME --image-tag $tag_name --pr $pr_id".to_string(),
            "fi".to_string(),
        ]),
        display_name: "Download Fabrikate, Update HLD, Push changes, Open PR, and if configured, push to Spektate storage".to_string(),
        condition: None,
        env: Some(hld_push_env()),
    })
}

// ---------------------------------------------------------------------------
// HLD manifest generation pipeline
// ---------------------------------------------------------------------------

/// Renders the HLD into Kubernetes manifests. Pull requests only validate;
/// every other build publishes to the manifest repository.
pub fn manifest_generation_pipeline() -> AzurePipeline {
    let mut verify_env = Env::new();
    verify_env.insert("VERIFY_ONLY".to_string(), serde_yaml::Value::from(1));

    let build_sh_inputs = || {
        let mut inputs = IndexMap::new();
        inputs.insert("scriptPath".to_string(), "build.sh".to_string());
        inputs
    };

    AzurePipeline {
        trigger: master_trigger(),
        variables: None,
        pool: Some(pool()),
        stages: None,
        steps: Some(vec![
            Step::Checkout(CheckoutStep {
                checkout: "self".to_string(),
                persist_credentials: true,
                clean: true,
            }),
            download_build_script_step(),
            Step::Task(TaskStep {
                task: "ShellScript@2".to_string(),
                display_name: "Validate fabrikate definitions".to_string(),
                inputs: build_sh_inputs(),
                condition: Some("eq(variables['Build.Reason'], 'PullRequest')".to_string()),
                env: Some(verify_env),
            }),
            Step::Task(TaskStep {
                task: "ShellScript@2".to_string(),
                display_name:
                    "Transform fabrikate definitions and publish to YAML manifests to repo"
                        .to_string(),
                inputs: build_sh_inputs(),
                condition: Some("ne(variables['Build.Reason'], 'PullRequest')".to_string()),
                env: Some(env(&[
                    ("ACCESS_TOKEN_SECRET", "$(PAT)"),
                    ("COMMIT_MESSAGE", "$(Build.SourceVersionMessage)"),
                    ("REPO", "$(MANIFEST_REPO)"),
                    ("BRANCH_NAME", "$(Build.SourceBranchName)"),
                ])),
            }),
            Step::Script(ScriptStep {
                script: script(&[
                    r#"cd "$HOME"/${MANIFEST_REPO##*/}"#.to_string(),
                    "commitId=$(Build.SourceVersion)".to_string(),
                    r#"commitId=$(echo "${commitId:0:7}")"#.to_string(),
                    "latest_commit=$(git rev-parse --short HEAD)".to_string(),
                    r#"echo "Downloading SPK""#.to_string(),
                    format!("curl {BUILD_SCRIPT_URL} > build.sh"),
                    "chmod +x build.sh".to_string(),
                    ". ./build.sh --source-only".to_string(),
                    "get_spk_version".to_string(),
                    "download_spk".to_string(),
                    r#"message="$(Build.SourceVersionMessage)""#.to_string(),
                    r#"if [[ $message == *"Merged PR"* ]]; then"#.to_string(),
                    r"pr_id=$(echo $message | grep -oE '[0-9]+' | head -1 | sed -e 's/^0+//')".to_string(),
                    "./spk/spk deployment create -n $(INTROSPECTION_ACCOUNT_NAME) -k $(INTROSPECTION_ACCOUNT_KEY) -t $(INTROSPECTION_TABLE_NAME) -p $(INTROSPECTION_PARTITION_KEY) --p3 $(Build.BuildId) --hld-commit-id $commitId --manifest-commit-id $latest_commit --pr pr_id".to_string(),
                    "else".to_string(),
                    "./spk/spk deployment create -n $(INTROSPECTION_ACCOUNT_NAME) -k $(INTROSPECTION_ACCOUNT_KEY) -t $(INTROSPECTION_TABLE_NAME) -p $(INTROSPECTION_PARTITION_KEY) --p3 $(Build.BuildId) --hld-commit-id $commitId --manifest-commit-id $latest_commit".to_string(),
                    "fi".to_string(),
                ]),
                display_name: "If configured, update manifest pipeline details in Spektate db"
                    .to_string(),
                condition: Some(INTROSPECTION_CONDITION.to_string()),
                env: None,
            }),
        ]),
    }
}

// ---------------------------------------------------------------------------
// HLD lifecycle pipeline
// ---------------------------------------------------------------------------

/// Reconciles the project's services into the HLD repository and opens a
/// pull request with the result.
pub fn hld_lifecycle_pipeline() -> AzurePipeline {
    AzurePipeline {
        trigger: master_trigger(),
        variables: Some(Vec::new()),
        pool: Some(pool()),
        stages: None,
        steps: Some(vec![
            download_build_script_step(),
            Step::Script(ScriptStep {
                script: script(&[
                    "# From https://raw.githubusercontent.com/Microsoft/bedrock/master/gitops/azure-devops/release.sh",
                    ". build.sh --source-only",
                    "",
                    "# Initialization",
                    "verify_access_token",
                    "init",
                    "helm init",
                    "",
                    "# Fabrikate",
                    "get_fab_version",
                    "download_fab",
                    "",
                    "# SPK",
                    "get_spk_version",
                    "download_spk",
                    "",
                    "# Clone HLD repo",
                    "git_connect",
                    "",
                    "# Update HLD via spk",
                    r#"git checkout -b "RECONCILE/$(Build.Repository.Name)-$(Build.BuildNumber)""#,
                    r#"echo "spk hld reconcile $(Build.Repository.Name) $PWD ./..""#,
                    "spk hld reconcile $(Build.Repository.Name) $PWD ./..",
                    r#"echo "GIT STATUS""#,
                    "git status",
                    r#"echo "GIT ADD (git add -A)""#,
                    "git add -A",
                    "",
                    "# Set git identity",
                    r#"git config user.email "admin@azuredevops.com""#,
                    r#"git config user.name "Automated Account""#,
                    "",
                    "# Commit changes",
                    r#"echo "GIT COMMIT""#,
                    r#"git commit -m "Reconciling HLD with $(Build.Repository.Name)-$(Build.BuildNumber).""#,
                    "",
                    "# Git Push",
                    "git_push",
                    "",
                    "# Open PR via az repo cli",
                    "echo 'az extension add --name azure-devops'",
                    "az extension add --name azure-devops",
                    "",
                    r#"echo 'az repos pr create --description "Reconciling HLD with $(Build.Repository.Name)-$(Build.BuildNumber)."'"#,
                    r#"az repos pr create --description "Reconciling HLD with $(Build.Repository.Name)-$(Build.BuildNumber).""#,
                ]),
                display_name: "Download Fabrikate and SPK, Update HLD, Push changes, Open PR"
                    .to_string(),
                condition: None,
                env: Some(hld_push_env()),
            }),
        ]),
    }
}

// ---------------------------------------------------------------------------
// Fabrikate component
// ---------------------------------------------------------------------------

/// Default HLD component pulling in the cloud native stack.
pub fn default_component() -> Component {
    Component {
        name: "default-component".to_string(),
        subcomponents: vec![Subcomponent {
            name: "cloud-native".to_string(),
            method: "git".to_string(),
            source: "https://github.com/microsoft/fabrikate-definitions.git".to_string(),
            path: "definitions/fabrikate-cloud-native".to_string(),
        }],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn scripts(steps: &[Step]) -> Vec<&str> {
        steps
            .iter()
            .filter_map(|s| match s {
                Step::Script(s) => Some(s.script.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn service_pipeline_scenario() {
        let p = service_build_and_update_pipeline(
            "my-service",
            "./my-service",
            &branches(&["master", "qa", "test"]),
            &[],
        )
        .unwrap();

        assert_eq!(
            p.trigger.branches.as_ref().unwrap().include,
            vec!["master", "qa", "test"]
        );
        assert_eq!(p.trigger.paths.as_ref().unwrap().include, vec!["./my-service"]);
        assert_eq!(p.variables, Some(Vec::new()));

        let stages = p.stages.as_ref().unwrap();
        let names: Vec<&str> = stages.iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(names, vec!["build", "hld_update"]);

        let hld = &stages[1];
        assert_eq!(hld.depends_on.as_deref(), Some("build"));
        let condition = hld.condition.as_deref().unwrap();
        assert!(condition.contains("'refs/heads/DEPLOY/'"));
        assert!(condition.contains("'master'"));
        assert!(condition.starts_with("and(succeeded('build')"));
    }

    #[test]
    fn service_pipeline_step_order() {
        let p = service_build_and_update_pipeline("svc", "svc", &branches(&["master"]), &[])
            .unwrap();
        let build = p.stage("build").unwrap();
        assert_eq!(build.jobs[0].job, "run_build_push_acr");
        let names: Vec<_> = build.jobs[0]
            .steps
            .iter()
            .map(|s| s.display_name().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "Azure Login",
                "If configured, update Spektate storage with build pipeline",
                "ACR Build and Publish",
            ]
        );
        assert_eq!(
            build.jobs[0].steps[1].condition(),
            Some(INTROSPECTION_CONDITION)
        );

        let hld = p.stage("hld_update").unwrap();
        assert_eq!(hld.jobs[0].job, "update_image_tag");
        assert_eq!(
            hld.jobs[0].steps[0].display_name(),
            Some("Download bedrock bash scripts")
        );
    }

    #[test]
    fn service_path_normalization_is_stable() {
        let a = service_build_and_update_pipeline("foo", "services/foo", &branches(&["master"]), &[])
            .unwrap();
        let b =
            service_build_and_update_pipeline("foo", "./services/foo", &branches(&["master"]), &[])
                .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trigger.paths.unwrap().include, vec!["./services/foo"]);
    }

    #[test]
    fn service_name_flows_into_scripts() {
        let p = service_build_and_update_pipeline("Fabrikam", "fabrikam", &branches(&["master"]), &[])
            .unwrap();
        let build = p.stage("build").unwrap();
        let acr = scripts(&build.jobs[0].steps)[2];
        assert!(acr.contains("$(Build.Repository.Name)-Fabrikam"));
        assert!(acr.lines().any(|l| l == "cd ./fabrikam"));

        let hld = p.stage("hld_update").unwrap();
        let update = scripts(&hld.jobs[0].steps)[1];
        assert!(update.starts_with("export SERVICE_NAME_LOWER=$(echo Fabrikam |"));
        assert!(update.ends_with("\nfi"));
    }

    #[test]
    fn variable_groups_become_group_references() {
        let p = service_build_and_update_pipeline(
            "svc",
            "svc",
            &branches(&["master"]),
            &branches(&["acr-vars", "hld-vars"]),
        )
        .unwrap();
        let groups: Vec<_> = p
            .variables
            .unwrap()
            .into_iter()
            .map(|v| v.group)
            .collect();
        assert_eq!(groups, vec!["acr-vars", "hld-vars"]);
    }

    #[test]
    fn service_pipeline_requires_branches() {
        let err = service_build_and_update_pipeline("svc", "svc", &[], &[]).unwrap_err();
        assert!(matches!(err, HldgenError::NoRingBranches));
    }

    #[test]
    fn service_pipeline_yaml_keeps_stage_order() {
        let p = service_build_and_update_pipeline("svc", "svc", &branches(&["master"]), &[])
            .unwrap();
        let yaml = to_yaml(&p).unwrap();
        let build = yaml.find("stage: build").unwrap();
        let hld = yaml.find("stage: hld_update").unwrap();
        assert!(build < hld);
        assert!(yaml.starts_with("trigger:"));

        let parsed: AzurePipeline = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, p);
    }

    #[test]
    fn long_lines_are_not_folded() {
        let p = service_build_and_update_pipeline("svc", "svc", &branches(&["master"]), &[])
            .unwrap();
        let yaml = to_yaml(&p).unwrap();
        assert!(yaml.contains(HLD_UPDATE_CONDITION));
    }

    #[test]
    fn manifest_pipeline_shape() {
        let p = manifest_generation_pipeline();
        assert_eq!(p.trigger.branches.as_ref().unwrap().include, vec!["master"]);
        assert!(p.variables.is_none());
        assert!(p.stages.is_none());
        assert_eq!(p.pool.as_ref().unwrap().vm_image, VM_IMAGE);

        let steps = p.steps.as_ref().unwrap();
        assert_eq!(steps.len(), 5);
        assert!(matches!(&steps[0], Step::Checkout(c) if c.checkout == "self" && c.clean));

        let validate = steps[2].condition().unwrap();
        let publish = steps[3].condition().unwrap();
        assert_eq!(validate, "eq(variables['Build.Reason'], 'PullRequest')");
        assert_eq!(publish, "ne(variables['Build.Reason'], 'PullRequest')");

        let Step::Task(task) = &steps[2] else {
            panic!("expected task step");
        };
        assert_eq!(task.inputs["scriptPath"], "build.sh");
        assert_eq!(
            task.env.as_ref().unwrap()["VERIFY_ONLY"],
            serde_yaml::Value::from(1)
        );
    }

    #[test]
    fn manifest_pipeline_env_order() {
        let p = manifest_generation_pipeline();
        let Step::Task(task) = &p.steps.as_ref().unwrap()[3] else {
            panic!("expected task step");
        };
        let keys: Vec<_> = task.env.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["ACCESS_TOKEN_SECRET", "COMMIT_MESSAGE", "REPO", "BRANCH_NAME"]
        );
        let yaml = to_yaml(&p).unwrap();
        assert!(yaml.contains("VERIFY_ONLY: 1"));
    }

    #[test]
    fn manifest_pipeline_pr_id_strips_zeros_literally() {
        let p = manifest_generation_pipeline();
        let spektate = *scripts(p.steps.as_ref().unwrap()).last().unwrap();
        assert!(spektate
            .lines()
            .any(|l| l.ends_with("| head -1 | sed -e 's/^0+//')")));
        assert!(!spektate.contains(r"0\+"));
    }

    #[test]
    fn lifecycle_pipeline_shape() {
        let p = hld_lifecycle_pipeline();
        assert_eq!(p.variables, Some(Vec::new()));
        let steps = p.steps.as_ref().unwrap();
        assert_eq!(steps.len(), 2);
        let reconcile = scripts(steps)[1];
        assert!(reconcile
            .lines()
            .any(|l| l == "spk hld reconcile $(Build.Repository.Name) $PWD ./.."));
        let yaml = to_yaml(&p).unwrap();
        assert!(yaml.contains("variables: []"));
    }

    #[test]
    fn default_component_shape() {
        let yaml = to_yaml(&default_component()).unwrap();
        assert_eq!(
            yaml,
            "name: default-component\n\
             subcomponents:\n\
             - name: cloud-native\n  \
               method: git\n  \
               source: https://github.com/microsoft/fabrikate-definitions.git\n  \
               path: definitions/fabrikate-cloud-native\n"
        );
    }

    #[test]
    fn builders_are_deterministic() {
        let args = branches(&["master", "qa"]);
        let a = to_yaml(&service_build_and_update_pipeline("svc", "svc", &args, &[]).unwrap())
            .unwrap();
        let b = to_yaml(&service_build_and_update_pipeline("svc", "svc", &args, &[]).unwrap())
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(
            to_yaml(&manifest_generation_pipeline()).unwrap(),
            to_yaml(&manifest_generation_pipeline()).unwrap()
        );
    }
}
