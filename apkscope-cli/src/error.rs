//! CLI-specific error types and exit code mapping

use apkscope_core::error::ApkscopeError;
use apkscope_store::StoreError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Requested project or output file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// At least one analysis job failed before analysis could start.
    #[error("{0}")]
    JobFailed(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from apkscope-core.
    #[error("{0}")]
    Core(#[from] ApkscopeError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration error                       |
    /// | 3    | Project or file not found                 |
    /// | 5    | A job failed (decompile or project error) |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(ApkscopeError::Config(_)) => 2,
            Self::NotFound(_) => 3,
            Self::JobFailed(_) => 5,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::PathTraversal(_)
            | StoreError::InvalidFilename(_)
            | StoreError::AlreadyStaged(_) => {
                Self::Command(e.to_string())
            }
            other => Self::Core(other.into()),
        }
    }
}
