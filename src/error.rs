use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors: anything that stops a run before or while reading input
#[derive(Error, Debug)]
pub enum ZoneScanError {
    #[error("Permission denied reading '{}'.", .0.display())]
    PermissionDenied(PathBuf),

    #[error("'{}' is not a file.", .0.display())]
    NotAFile(PathBuf),

    #[error("Cannot open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ZoneScanError {
    /// Classify an error raised while opening `path`
    pub fn from_open(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Open { path, source: err },
        }
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid TTL bound in {var}: {value}")]
    InvalidTtlBound { var: &'static str, value: String },

    #[error("ttl_min ({min}) is greater than ttl_max ({max})")]
    InvertedTtlRange { min: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, ZoneScanError>;
