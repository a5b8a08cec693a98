//! Frame analysis
//!
//! Turns mono samples into a [`FrameMatrix`]: one magnitude vector per
//! hop, each `fft_size / 2` bins long. Frames are independent, so they are
//! transformed in parallel and collected in one step.

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{SpectrogramError, SpectrogramResult};
use crate::fft::{FftSize, Radix2Fft, magnitude};
use crate::window::hann_window;

/// Largest overlap ratio accepted
pub const MAX_OVERLAP: f32 = 0.95;

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

/// Analysis configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramConfig {
    /// FFT size
    pub fft_size: FftSize,
    /// Fraction of each frame shared with the next, clamped to [0, 0.95]
    pub overlap: f32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            fft_size: FftSize::S4096,
            overlap: 0.75,
        }
    }
}

impl SpectrogramConfig {
    pub fn new(fft_size: FftSize, overlap: f32) -> Self {
        Self {
            fft_size,
            overlap: clamp_overlap(overlap),
        }
    }

    /// Samples between frame starts, at least 1
    pub fn hop_size(&self) -> usize {
        let n = self.fft_size.samples() as f32;
        ((n * (1.0 - clamp_overlap(self.overlap))).floor() as usize).max(1)
    }
}

/// Clamp an overlap ratio to [0, 0.95]; NaN becomes 0
pub fn clamp_overlap(overlap: f32) -> f32 {
    if overlap.is_nan() {
        0.0
    } else {
        overlap.clamp(0.0, MAX_OVERLAP)
    }
}

/// Number of full frames that fit in `num_samples`
pub fn frame_count(num_samples: usize, fft_size: usize, hop_size: usize) -> usize {
    if num_samples < fft_size || hop_size == 0 {
        0
    } else {
        (num_samples - fft_size) / hop_size + 1
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUDIO INPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Decoded audio as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: f32,
    /// One sample vector per channel
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn mono(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    /// Duration in seconds of the longest channel
    pub fn duration(&self) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        let len = self.channels.iter().map(Vec::len).max().unwrap_or(0);
        len as f64 / self.sample_rate as f64
    }

    pub fn to_mono(&self) -> Vec<f32> {
        mix_to_mono(&self.channels)
    }
}

/// Average all channels into one. The result is as long as the shortest
/// channel; a single channel is returned unchanged.
pub fn mix_to_mono(channels: &[Vec<f32>]) -> Vec<f32> {
    match channels {
        [] => Vec::new(),
        [only] => only.clone(),
        _ => {
            let len = channels.iter().map(Vec::len).min().unwrap_or(0);
            let scale = 1.0 / channels.len() as f32;
            (0..len)
                .map(|i| channels.iter().map(|c| c[i]).sum::<f32>() * scale)
                .collect()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FRAME MATRIX
// ═══════════════════════════════════════════════════════════════════════════════

/// Magnitude spectra for a whole audio source
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatrix {
    frames: Vec<Vec<f32>>,
    fft_size: usize,
    hop_size: usize,
    sample_rate: f32,
    num_samples: usize,
}

impl FrameMatrix {
    /// Matrix with no frames
    pub fn empty(fft_size: FftSize, sample_rate: f32) -> Self {
        Self {
            frames: Vec::new(),
            fft_size: fft_size.samples(),
            hop_size: fft_size.samples(),
            sample_rate,
            num_samples: 0,
        }
    }

    /// Build a matrix from precomputed frames. Every frame must hold
    /// `fft_size / 2` bins.
    pub fn from_frames(
        frames: Vec<Vec<f32>>,
        fft_size: usize,
        hop_size: usize,
        sample_rate: f32,
        num_samples: usize,
    ) -> Self {
        debug_assert!(frames.iter().all(|f| f.len() == fft_size / 2));
        Self {
            frames,
            fft_size,
            hop_size,
            sample_rate,
            num_samples,
        }
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// Magnitude at (frame, bin), 0 when out of range
    #[inline]
    pub fn magnitude(&self, frame: usize, bin: usize) -> f32 {
        self.frames
            .get(frame)
            .and_then(|f| f.get(bin))
            .copied()
            .unwrap_or(0.0)
    }

    /// Nearest bin for a frequency, clamped to `[0, bins - 1]`
    pub fn frequency_to_bin(&self, freq: f64) -> usize {
        let last = self.bin_count().saturating_sub(1);
        if self.sample_rate <= 0.0 || !freq.is_finite() || freq <= 0.0 {
            return 0;
        }
        let bin = (freq / self.sample_rate as f64 * self.fft_size as f64).round();
        (bin as usize).min(last)
    }

    /// Center frequency of a bin
    pub fn bin_to_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate as f64 / self.fft_size as f64
    }

    /// Largest magnitude over all frames within bins `[lo, hi]`
    pub fn max_in_bins(&self, lo: usize, hi: usize) -> f32 {
        let hi = hi.min(self.bin_count().saturating_sub(1));
        if lo > hi {
            return 0.0;
        }
        self.frames
            .iter()
            .flat_map(|frame| frame[lo..=hi].iter().copied())
            .fold(0.0, f32::max)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPUTE
// ═══════════════════════════════════════════════════════════════════════════════

/// Reject sample rates that cannot drive a frequency axis
pub(crate) fn check_sample_rate(sample_rate: f32) -> SpectrogramResult<()> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(SpectrogramError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

/// Analyze mono samples
pub fn compute_frames(
    samples: &[f32],
    sample_rate: f32,
    config: &SpectrogramConfig,
) -> SpectrogramResult<FrameMatrix> {
    check_sample_rate(sample_rate)?;

    let fft_size = config.fft_size.samples();
    let hop_size = config.hop_size();
    let count = frame_count(samples.len(), fft_size, hop_size);
    let bins = config.fft_size.bins();

    let fft = Radix2Fft::for_size(config.fft_size);
    let window = hann_window(fft_size);

    let frames: Vec<Vec<f32>> = (0..count)
        .into_par_iter()
        .map_init(
            || vec![Complex::new(0.0f32, 0.0); fft_size],
            |buffer, index| {
                let start = index * hop_size;
                let input = &samples[start..start + fft_size];
                for ((slot, &sample), &w) in buffer.iter_mut().zip(input).zip(&window) {
                    *slot = Complex::new(sample * w, 0.0);
                }
                fft.process(buffer);
                buffer[..bins].iter().copied().map(magnitude).collect()
            },
        )
        .collect();

    log::debug!(
        "Spectrogram analysis: {} samples, fft {}, hop {}, {} frames",
        samples.len(),
        fft_size,
        hop_size,
        frames.len()
    );

    Ok(FrameMatrix::from_frames(
        frames,
        fft_size,
        hop_size,
        sample_rate,
        samples.len(),
    ))
}
