//! Error types shared by every command.

use std::path::PathBuf;

use thiserror::Error;

pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Missing {} environment variable(s). Check your .env file.", .missing.join(", "))]
    Config { missing: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Usage(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Remote service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VisionError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Process exit code for this error. Only a missing input file is distinguished.
    pub fn exit_code(&self) -> i32 {
        match self {
            VisionError::NotFound(_) => 2,
            _ => 1,
        }
    }
}
