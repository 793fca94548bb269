use std::path::PathBuf;
use thiserror::Error;

/// Main error type for callslice operations
#[derive(Error, Debug)]
pub enum CallsliceError {
    #[error("Cannot read module manifest {}: {source}", path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid module manifest {}: {reason}", path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Package load failed: {0}")]
    PackageLoadFailure(String),

    #[error("Function {name} not found in package {package}")]
    EntryPointNotFound { name: String, package: String },

    #[error("Cannot read source of {}: {reason}", path.display())]
    SourceReadFailure { path: PathBuf, reason: String },

    #[error("Working directory change to {} failed: {source}", path.display())]
    WorkingDirectoryFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CallsliceError>;
