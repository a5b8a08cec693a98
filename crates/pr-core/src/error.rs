//! Error types for the piano roll core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum PianoRollError {
    #[error("Invalid pitch range: {min} - {max}")]
    InvalidPitchRange { min: u8, max: u8 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MIDI error: {0}")]
    Midi(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<midly::Error> for PianoRollError {
    fn from(err: midly::Error) -> Self {
        PianoRollError::Midi(err.to_string())
    }
}

/// Result type alias
pub type PrResult<T> = Result<T, PianoRollError>;
