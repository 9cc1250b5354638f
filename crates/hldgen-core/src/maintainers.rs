use crate::error::{HldgenError, Result};
use crate::paths::normalize_service_path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Maintainer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceMaintainers {
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
}

/// `maintainers.yaml`: service path -> maintainers, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaintainersFile {
    #[serde(default)]
    pub services: IndexMap<String, ServiceMaintainers>,
}

// ---------------------------------------------------------------------------
// Document operations
// ---------------------------------------------------------------------------

impl MaintainersFile {
    /// Starter document owning the project root (`./`).
    pub fn for_project(maintainers: Vec<Maintainer>) -> Self {
        let mut services = IndexMap::new();
        services.insert("./".to_string(), ServiceMaintainers { maintainers });
        Self { services }
    }

    #[cfg(test)]
    pub fn load(path: &Path) -> Result<Self> {
        let data = read_existing(path)?;
        let file: MaintainersFile = serde_yaml::from_str(&data)?;
        Ok(file)
    }
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(HldgenError::MaintainersFileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Record `maintainers` under `./<new_service_path>` in `maintainers_file`.
///
/// The document is edited as an untyped mapping, so other entries keep their
/// key order and any fields this crate does not model. An existing key is
/// replaced in place (last write wins); a new key is appended.
pub fn add_service_to_maintainers_file(
    maintainers_file: &Path,
    new_service_path: &str,
    maintainers: Vec<Maintainer>,
) -> Result<()> {
    let data = read_existing(maintainers_file)?;
    let mut doc: Mapping = serde_yaml::from_str(&data)?;

    let key = Value::String(normalize_service_path(new_service_path));
    let entry = serde_yaml::to_value(ServiceMaintainers { maintainers })?;
    if matches!(doc.get("services"), None | Some(Value::Null)) {
        doc.insert(
            Value::String("services".to_string()),
            Value::Mapping(Mapping::new()),
        );
    }
    let Some(Value::Mapping(services)) = doc.get_mut("services") else {
        return Err(<serde_yaml::Error as serde::de::Error>::custom(
            "services: expected a mapping of service path to maintainers",
        )
        .into());
    };
    services.insert(key, entry);

    let text = serde_yaml::to_string(&doc)?;
    crate::io::atomic_write(maintainers_file, text.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
