/// Error types for toolkit operations
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("Toolkit command failed: {0}")]
    CommandFailed(String),

    #[error("Toolkit output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Incompatible toolkit: {0}")]
    Incompatible(String),

    #[error("Process control failed: {0}")]
    ProcessControl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ToolkitError>;
