use crate::error::{HldgenError, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Filename constants
// ---------------------------------------------------------------------------

pub const SERVICE_PIPELINE_FILENAME: &str = "build-update-hld.yaml";
pub const RENDER_HLD_PIPELINE_FILENAME: &str = "manifest-generation.yaml";
pub const PROJECT_PIPELINE_FILENAME: &str = "hld-lifecycle.yaml";
pub const COMPONENT_FILENAME: &str = "component.yaml";
pub const GITIGNORE_FILENAME: &str = ".gitignore";
pub const DOCKERFILE_FILENAME: &str = "Dockerfile";
pub const MAINTAINERS_FILENAME: &str = "maintainers.yaml";
pub const BEDROCK_FILENAME: &str = "bedrock.yaml";

/// Hosted agent image used by every generated pipeline.
pub const VM_IMAGE: &str = "ubuntu-latest";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn maintainers_path(root: &Path) -> PathBuf {
    root.join(MAINTAINERS_FILENAME)
}

pub fn bedrock_path(root: &Path) -> PathBuf {
    root.join(BEDROCK_FILENAME)
}

/// Absolute, lexically normalized form of `path`. `.` and `..` are folded
/// without touching the filesystem.
pub fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Path of `target` relative to `base`, `/`-separated. Both must already be
/// resolved. Returns an empty string when they are the same directory.
pub fn relative_path(base: &Path, target: &Path) -> String {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();
    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base.len() {
        parts.push("..".to_string());
    }
    for c in &target[common..] {
        parts.push(c.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

/// Prefix `./` unless the path already starts with it.
pub fn normalize_service_path(rel_path: &str) -> String {
    if rel_path.starts_with("./") {
        rel_path.to_string()
    } else {
        format!("./{rel_path}")
    }
}

/// A service name safe to use as a directory name under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn parse(name: &str) -> Result<Self> {
        if name.trim().is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
            return Err(HldgenError::InvalidServiceName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServiceName {
    type Err = HldgenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
