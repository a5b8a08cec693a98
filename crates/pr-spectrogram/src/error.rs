//! Error types for spectrogram analysis

use thiserror::Error;

/// Spectrogram errors
#[derive(Debug, Error)]
pub enum SpectrogramError {
    /// FFT size outside the supported power-of-two set
    #[error("Invalid FFT size: {0} (expected one of 256, 512, 1024, 2048, 4096, 8192)")]
    InvalidFftSize(usize),

    /// Invalid sample rate
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// Analysis worker is gone
    #[error("Analysis worker disconnected")]
    WorkerDisconnected,
}

/// Result type for spectrogram operations
pub type SpectrogramResult<T> = Result<T, SpectrogramError>;
