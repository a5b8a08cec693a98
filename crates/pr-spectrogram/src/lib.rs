//! pr-spectrogram: Audio analysis behind the piano roll
//!
//! - Hann-windowed radix-2 FFT over mono audio ([`compute_frames`])
//! - [`FrameMatrix`] of per-frame magnitudes, shared as `Arc`
//! - Background recompute on an [`AnalysisWorker`]
//! - Rasterization onto the piano-roll pitch axis ([`render_image`])
//! - Note detection for snapping created notes ([`detect_note`])

mod analysis;
mod colormap;
mod detect;
mod engine;
mod error;
mod fft;
mod render;
mod window;
mod worker;

pub use analysis::*;
pub use colormap::*;
pub use detect::*;
pub use engine::*;
pub use error::*;
pub use fft::*;
pub use render::*;
pub use window::*;
pub use worker::*;
