use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HldgenError {
    #[error("maintainers file not found: {}", .0.display())]
    MaintainersFileNotFound(PathBuf),

    #[error("bedrock file not found: {}", .0.display())]
    BedrockFileNotFound(PathBuf),

    #[error("at least one ring branch is required to trigger the build pipeline")]
    NoRingBranches,

    #[error("invalid service name '{0}': must be non-empty and contain no path separators")]
    InvalidServiceName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, HldgenError>;
