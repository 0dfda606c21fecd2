// src/error.rs
// Error type shared by every stage of a conversion job

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before synthesis begins.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("sample count mismatch: header announced {expected}, wrote {actual}")]
    SampleCount { expected: u64, actual: u64 },

    #[error("rendering too long for a WAV container ({bytes} data bytes)")]
    TooLong { bytes: u64 },

    #[error("MP3 encoder not found; install `lame` or set LAME_PATH")]
    EncoderNotFound,

    #[error("MP3 encoder exited with status {status}: {stderr}")]
    EncoderFailed { status: String, stderr: String },
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }
}
