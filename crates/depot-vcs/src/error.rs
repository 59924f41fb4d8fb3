//! VCS error types.

/// Errors that can occur while driving the external `git` tool.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The `git` executable is not on the PATH.
    #[error("git was not found on PATH")]
    GitUnavailable,

    /// A git invocation exited non-zero.
    #[error("git {action} failed ({status}): {stderr}")]
    CommandFailed {
        action: String,
        status: String,
        stderr: String,
    },

    /// A git invocation exceeded its time budget and was killed.
    #[error("git {action} timed out after {seconds}s")]
    Timeout { action: String, seconds: u64 },

    /// Git produced output that is not UTF-8.
    #[error("git {action} produced non-UTF-8 output")]
    NonUtf8Output { action: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for VCS operations.
pub type Result<T> = std::result::Result<T, VcsError>;
