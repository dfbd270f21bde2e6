//! The failure taxonomy of the request pipeline. Every failure is terminal
//! for its request: nothing here is retried, and workspace cleanup happens
//! regardless of which variant is returned.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed base64 or unparseable image bytes, for either the image or
    /// the mask. The only caller-side error; everything else is ours.
    #[error("{0}")]
    Decode(String),

    /// The weights directory is missing. A deployment problem, not a
    /// per-request one.
    #[error("model weights not found at {}; they should be downloaded at startup", .0.display())]
    ModelNotFound(PathBuf),

    /// The predictor exited nonzero (or was killed on timeout). Carries its
    /// stderr, truncated to the configured bound.
    #[error("inference failed: {stderr}")]
    Inference {
        status: Option<i32>,
        stderr: String,
    },

    /// The predictor exited zero but left no discoverable image behind.
    #[error("result image not found in output directory {}", .0.display())]
    ResultNotFound(PathBuf),

    /// Unexpected filesystem fault while staging inputs or reading output.
    #[error("workspace io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller sent us something bad, as opposed to the service
    /// or its predictor misbehaving.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}
