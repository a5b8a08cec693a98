//! Radix-2 FFT
//!
//! Iterative Cooley–Tukey transform: bit-reversal permutation followed by
//! log2(N) butterfly passes. The twiddle table is computed once per size so
//! each frame only does the butterflies.

use std::f32::consts::PI;

use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::error::{SpectrogramError, SpectrogramResult};

// ═══════════════════════════════════════════════════════════════════════════════
// FFT SIZE
// ═══════════════════════════════════════════════════════════════════════════════

/// Supported analysis sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum FftSize {
    S256,
    S512,
    S1024,
    S2048,
    #[default]
    S4096,
    S8192,
}

impl FftSize {
    pub const ALL: [FftSize; 6] = [
        FftSize::S256,
        FftSize::S512,
        FftSize::S1024,
        FftSize::S2048,
        FftSize::S4096,
        FftSize::S8192,
    ];

    /// Number of samples per frame
    pub fn samples(self) -> usize {
        match self {
            FftSize::S256 => 256,
            FftSize::S512 => 512,
            FftSize::S1024 => 1024,
            FftSize::S2048 => 2048,
            FftSize::S4096 => 4096,
            FftSize::S8192 => 8192,
        }
    }

    /// Number of magnitude bins kept per frame
    pub fn bins(self) -> usize {
        self.samples() / 2
    }
}

impl TryFrom<usize> for FftSize {
    type Error = SpectrogramError;

    fn try_from(size: usize) -> SpectrogramResult<Self> {
        FftSize::ALL
            .into_iter()
            .find(|s| s.samples() == size)
            .ok_or(SpectrogramError::InvalidFftSize(size))
    }
}

impl From<FftSize> for usize {
    fn from(size: FftSize) -> usize {
        size.samples()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM
// ═══════════════════════════════════════════════════════════════════════════════

/// Forward FFT for one fixed power-of-two size
#[derive(Debug, Clone)]
pub struct Radix2Fft {
    size: usize,
    /// exp(-2πik/N) for k in [0, N/2)
    twiddles: Vec<Complex<f32>>,
}

impl Radix2Fft {
    /// Create a transform for `size` points. `size` must be a power of two.
    pub fn new(size: usize) -> SpectrogramResult<Self> {
        if size == 0 || !size.is_power_of_two() {
            return Err(SpectrogramError::InvalidFftSize(size));
        }
        Ok(Self::build(size))
    }

    pub fn for_size(size: FftSize) -> Self {
        Self::build(size.samples())
    }

    fn build(size: usize) -> Self {
        let twiddles = (0..size / 2)
            .map(|k| {
                let angle = -2.0 * PI * k as f32 / size as f32;
                Complex::new(angle.cos(), angle.sin())
            })
            .collect();
        Self { size, twiddles }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Transform `buffer` in place. The buffer length must equal `len()`.
    pub fn process(&self, buffer: &mut [Complex<f32>]) {
        let n = self.size;
        debug_assert_eq!(buffer.len(), n);
        if n <= 1 {
            return;
        }

        // Bit-reversal permutation
        let shift = usize::BITS - n.trailing_zeros();
        for i in 0..n {
            let j = i.reverse_bits() >> shift;
            if j > i {
                buffer.swap(i, j);
            }
        }

        // Butterfly passes
        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let stride = n / len;
            for start in (0..n).step_by(len) {
                for k in 0..half {
                    let w = self.twiddles[k * stride];
                    let even = buffer[start + k];
                    let odd = buffer[start + k + half] * w;
                    buffer[start + k] = even + odd;
                    buffer[start + k + half] = even - odd;
                }
            }
            len <<= 1;
        }
    }
}

/// Magnitude `sqrt(re² + im²)`
#[inline]
pub fn magnitude(c: Complex<f32>) -> f32 {
    (c.re * c.re + c.im * c.im).sqrt()
}
