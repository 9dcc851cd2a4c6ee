use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A git command or subprocess step exited nonzero. The message carries
    /// the tool's diagnostic text (stderr, falling back to stdout).
    #[error("{0}")]
    CommandFailed(String),

    /// The working tree is clean: a recognized "nothing to do" outcome,
    /// not a failure.
    #[error("No changes to commit")]
    NoChanges,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::CommandFailed(_) => "COMMAND_FAILED",
            Error::NoChanges => "NO_CHANGES",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Unexpected(_) => "UNEXPECTED",
        }
    }

    /// True for outcomes that end a workflow without signaling failure.
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::NoChanges)
    }
}
