//! Error types for the langid-onnx runtime

use thiserror::Error;

/// Result type for langid-onnx operations
pub type DetectResult<T> = Result<T, DetectError>;

/// Main error type for langid-onnx operations
#[derive(Error, Debug)]
pub enum DetectError {
    /// A model supplier rejected, or supplied structurally invalid data.
    /// Nothing is cached on failure; the next call retries.
    #[error("Load error: {0}")]
    Load(String),

    /// The compute backend could not be initialized. Fatal for the call;
    /// no fallback backend is attempted (CPU is the only backend ever
    /// requested).
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::Error),
}

impl DetectError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }
}
