//! Error types for screen-rotator
//!
//! Tool failures always carry the raw diagnostic text so it can be shown
//! to the user as-is.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid degree of rotation, 0/90/180/270 only, got {0}")]
    InvalidDegrees(isize),

    #[error("No target display selected")]
    NoTarget,

    #[error("Display {0} not found")]
    DisplayNotFound(String),

    #[error(
        "displayplacer not found. Please install via: brew install jakehilborn/jakehilborn/displayplacer"
    )]
    ToolNotFound,

    #[error("Failed to run `{command}`: {source}")]
    ToolInvocationFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` did not finish within {secs}s")]
    ToolTimedOut { command: String, secs: u64 },

    #[error("displayplacer reported an error: {0}")]
    ToolReportedError(String),

    #[error("Invalid shortcut: {0}")]
    InvalidShortcut(String),

    #[error("Underlying I/O error")]
    IOError(#[from] std::io::Error),

    #[error("Malformed config")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
