//! Error types for toolchainbot
//!
//! Domain-specific error types using thiserror. Every error is fatal at the
//! point of detection; [`ToolchainError::exit_code`] maps each class to its
//! own process exit status.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::stage::{Component, Stage};

/// Command-line usage errors
#[derive(Error, Debug, PartialEq)]
pub enum UsageError {
    /// A built-in target was selected but no install prefix is known
    #[error("Built-in target '{target}' requires an install prefix. Use --prefix or set 'prefix' in the config file")]
    MissingPrefix { target: String },

    /// A host tool required by the pipeline is not on PATH
    #[error("Required tool '{tool}' not found in PATH")]
    MissingTool { tool: String },
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Could not read config file '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: PathBuf, error: String },

    /// Work directory does not exist
    #[error("Target directory does not exist: {path}")]
    MissingWorkDir { path: PathBuf },

    /// Parallelism value is not a number
    #[error("Invalid jobs value '{value}': expected N or -jN")]
    InvalidJobs { value: String },

    /// The install prefix cannot be placed on PATH
    #[error("Install prefix '{path}' cannot be added to PATH: {error}")]
    InvalidSearchPath { path: PathBuf, error: String },
}

/// Version string errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VersionError {
    /// Version is not a dotted list of at least two numbers
    #[error("Invalid version format '{version}': {reason}")]
    InvalidVersionFormat { version: String, reason: String },
}

/// Built-in target resolution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// Target is not in the built-in catalog
    #[error("Unknown target '{name}'. Supported targets: {supported:?}")]
    UnknownTarget { name: String, supported: Vec<String> },

    /// Requested component version is below the target's minimum
    #[error("Version {requested} of {component} does not work for this target (minimum {minimum})")]
    UnsupportedComponentVersion {
        component: Component,
        requested: String,
        minimum: String,
    },

    /// Requested component version could not be parsed
    #[error("Bad version for {component}: {source}")]
    Version {
        component: Component,
        source: VersionError,
    },
}

/// Source acquisition errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// No archive for the component could be found or retrieved
    #[error("Could not find source archive for {name}-{version} in '{dir}'")]
    SourceNotFound {
        name: String,
        version: String,
        dir: PathBuf,
    },

    /// The archive tool failed
    #[error("Failed to extract '{archive}': {error}")]
    ExtractionFailed { archive: PathBuf, error: String },

    /// The companion overlay could not be moved into the source tree
    #[error("Failed to merge '{from}' into '{to}': {error}")]
    MergeFailed {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Version error while checking the companion range
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to resolve an absolute path
    #[error("Failed to resolve path '{path}': {error}")]
    Resolve { path: PathBuf, error: String },
}

/// Build stage errors
#[derive(Error, Debug)]
pub enum StageError {
    /// An external invocation exited non-zero or could not be started
    #[error("Stage '{stage}' failed at '{step}': {error}")]
    StageFailed {
        stage: Stage,
        step: String,
        error: String,
    },

    /// The stage's build directory could not be prepared
    #[error("Stage '{stage}' could not prepare its build directory: {source}")]
    Workspace {
        stage: Stage,
        source: FilesystemError,
    },
}

/// Library-path normalization errors
#[derive(Error, Debug)]
pub enum LibraryPathError {
    /// Any step of the relinking sequence failed
    #[error("Library path normalization failed at '{path}': {error}")]
    NormalizationFailed { path: PathBuf, error: String },
}

/// Top-level toolchainbot error type
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// Usage error
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Profile resolution error
    #[error("Target error: {0}")]
    Profile(#[from] ProfileError),

    /// Source acquisition error
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Directory creation error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Stage failure
    #[error("Build error: {0}")]
    Stage(#[from] StageError),

    /// Library-path normalization error
    #[error("Install tree error: {0}")]
    LibraryPath(#[from] LibraryPathError),
}

impl ToolchainError {
    /// Process exit status for this error class
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 2,
            Self::Config(_) => 3,
            Self::Profile(_) => 4,
            Self::Source(_) => 5,
            Self::Filesystem(_) => 6,
            Self::Stage(_) => 7,
            Self::LibraryPath(_) => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            ToolchainError::from(UsageError::MissingTool {
                tool: "make".to_string(),
            }),
            ToolchainError::from(ConfigError::MissingWorkDir {
                path: PathBuf::from("/nope"),
            }),
            ToolchainError::from(ProfileError::UnknownTarget {
                name: "mips".to_string(),
                supported: vec![],
            }),
            ToolchainError::from(SourceError::SourceNotFound {
                name: "gcc".to_string(),
                version: "4.8.1".to_string(),
                dir: PathBuf::from("/dl"),
            }),
            ToolchainError::from(FilesystemError::CreateDir {
                path: PathBuf::from("/dl"),
                error: "denied".to_string(),
            }),
            ToolchainError::from(StageError::StageFailed {
                stage: Stage::Gcc1,
                step: "configure".to_string(),
                error: "exit status 1".to_string(),
            }),
            ToolchainError::from(LibraryPathError::NormalizationFailed {
                path: PathBuf::from("/opt/x"),
                error: "missing".to_string(),
            }),
        ];

        let mut codes: Vec<i32> = errors.iter().map(ToolchainError::exit_code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_stage_failure_message_names_step() {
        let err = StageError::StageFailed {
            stage: Stage::Glibc,
            step: "make".to_string(),
            error: "exit status 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Stage 'glibc' failed at 'make': exit status 2"
        );
    }
}
