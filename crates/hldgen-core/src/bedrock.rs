use crate::error::{HldgenError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// HelmConfig
// ---------------------------------------------------------------------------

/// Where a service's helm chart comes from: a path inside a git repository,
/// or a named chart in a helm repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HelmChart {
    Git {
        git: String,
        branch: String,
        #[serde(default)]
        path: String,
    },
    Repository {
        repository: String,
        chart: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelmConfig {
    pub chart: HelmChart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockService {
    pub helm: HelmConfig,
    #[serde(rename = "k8sBackendPort")]
    pub k8s_backend_port: u16,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ring {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

// ---------------------------------------------------------------------------
// BedrockFile
// ---------------------------------------------------------------------------

/// `bedrock.yaml`: rings, services and variable groups of a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockFile {
    #[serde(default)]
    pub rings: IndexMap<String, Ring>,
    #[serde(default)]
    pub services: IndexMap<String, BedrockService>,
    #[serde(default)]
    pub variable_groups: Vec<String>,
}

impl BedrockFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(HldgenError::BedrockFileNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let file: BedrockFile = serde_yaml::from_str(&data)?;
        Ok(file)
    }

    /// Branches that trigger service builds: one per ring.
    pub fn ring_branches(&self) -> Vec<String> {
        self.rings.keys().cloned().collect()
    }

    #[cfg(test)]
    pub fn default_ring(&self) -> Option<&str> {
        self.rings
            .iter()
            .find(|(_, ring)| ring.is_default == Some(true))
            .map(|(name, _)| name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
