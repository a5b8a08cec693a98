//! Editor error types

use pr_core::PianoRollError;
use pr_spectrogram::SpectrogramError;
use thiserror::Error;

/// Editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Note model, import or export failure
    #[error(transparent)]
    Core(#[from] PianoRollError),

    /// Spectrogram analysis failure
    #[error(transparent)]
    Spectrogram(#[from] SpectrogramError),

    /// JSON error (options or note export)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation on an editor that has been destroyed
    #[error("Editor has been destroyed")]
    Destroyed,
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
