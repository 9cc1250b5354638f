//! Azure Pipelines document model.
//!
//! Field declaration order is serialization order, and every sequence keeps
//! the order it was built in: stages and jobs run in declaration order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Environment block of a step. Values are mostly pipeline macro strings
/// such as `$(PAT)`, but flags like `VERIFY_ONLY: 1` stay numeric.
pub type Env = IndexMap<String, serde_yaml::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzurePipeline {
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<VariableGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<Pool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub include: Vec<String>,
}

impl Filter {
    pub fn include<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableGroup {
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub vm_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job: String,
    pub pool: Pool,
    pub steps: Vec<Step>,
}

/// A single pipeline step. The variant is recognised by its leading key
/// (`checkout`, `task` or `script`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Checkout(CheckoutStep),
    Task(TaskStep),
    Script(ScriptStep),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStep {
    pub checkout: String,
    pub persist_credentials: bool,
    pub clean: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStep {
    /// Multi-line shell payload, kept opaque.
    pub script: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Env>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStep {
    pub task: String,
    pub display_name: String,
    pub inputs: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Env>,
}

#[cfg(test)]
impl Step {
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Step::Checkout(_) => None,
            Step::Task(t) => Some(&t.display_name),
            Step::Script(s) => Some(&s.display_name),
        }
    }

    pub fn condition(&self) -> Option<&str> {
        match self {
            Step::Checkout(_) => None,
            Step::Task(t) => t.condition.as_deref(),
            Step::Script(s) => s.condition.as_deref(),
        }
    }
}

#[cfg(test)]
impl AzurePipeline {
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.as_ref()?.iter().find(|s| s.stage == name)
    }
}
