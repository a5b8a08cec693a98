//! Spectrogram rasterization
//!
//! Maps every output pixel to a (frame, bin) pair: x picks the frame by
//! time, y picks a pitch on the piano-roll axis which is converted to the
//! nearest FFT bin. Magnitudes are shown in dB relative to the loudest bin
//! inside the displayed pitch band.

use pr_core::{CoordinateParams, pitch_to_hz};

use crate::analysis::FrameMatrix;
use crate::colormap::{ColorMap, LUT_SIZE};

/// Lowest level shown, in dB below the band maximum
pub const DB_FLOOR: f32 = -80.0;

/// RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramImage {
    pub width: usize,
    pub height: usize,
    /// Row-major RGBA, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl SpectrogramImage {
    /// Image filled with one color
    pub fn filled(width: usize, height: usize, color: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Color at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

/// Magnitude → [0, 1] on a dB scale relative to `max_mag`
#[inline]
pub fn normalize_db(mag: f32, max_mag: f32) -> f32 {
    if max_mag <= 0.0 || mag <= 0.0 {
        return 0.0;
    }
    let db = (20.0 * (mag / max_mag).log10()).max(DB_FLOOR);
    ((db - DB_FLOOR) / -DB_FLOOR).clamp(0.0, 1.0)
}

/// Continuous pitch shown at pixel row `y`
fn pitch_at_row(params: &CoordinateParams, y: usize) -> f64 {
    let center = y as f64 + 0.5;
    if params.is_folded && !params.used_pitches.is_empty() {
        params.px_to_pitch(center) as f64
    } else {
        // Linear across the range; row centers land on whole pitches
        let span = params.max_pitch as f64 - params.min_pitch as f64 + 1.0;
        params.max_pitch as f64 + 0.5 - center / params.height * span
    }
}

/// Render the matrix for the given view. An empty matrix or empty view
/// yields a solid `background` image.
pub fn render_image(
    matrix: &FrameMatrix,
    params: &CoordinateParams,
    color_map: ColorMap,
    background: [u8; 4],
) -> SpectrogramImage {
    let width = params.width.max(0.0).round() as usize;
    let height = params.height.max(0.0).round() as usize;

    if matrix.is_empty() || width == 0 || height == 0 || params.row_count() == 0 {
        return SpectrogramImage::filled(width, height, background);
    }

    let frames = matrix.frame_count();
    let row_bins: Vec<usize> = (0..height)
        .map(|y| matrix.frequency_to_bin(pitch_to_hz(pitch_at_row(params, y))))
        .collect();
    let col_frames: Vec<usize> = (0..width)
        .map(|x| ((x as f64 / width as f64 * frames as f64).floor() as usize).min(frames - 1))
        .collect();

    let lo = row_bins.iter().copied().min().unwrap_or(0);
    let hi = row_bins.iter().copied().max().unwrap_or(0);
    let max_mag = matrix.max_in_bins(lo, hi);

    let lut = color_map.lut();
    let mut pixels = Vec::with_capacity(width * height * 4);
    for &bin in &row_bins {
        for &frame in &col_frames {
            let level = normalize_db(matrix.magnitude(frame, bin), max_mag);
            let index = (level * (LUT_SIZE - 1) as f32).round() as usize;
            pixels.extend_from_slice(&lut[index.min(LUT_SIZE - 1)]);
        }
    }

    log::trace!(
        "Rendered spectrogram {}x{} from {} frames, bins {}..={}",
        width,
        height,
        frames,
        lo,
        hi
    );

    SpectrogramImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::FftSize;
    use approx::assert_relative_eq;

    fn params(width: f64, height: f64) -> CoordinateParams {
        CoordinateParams {
            width,
            height,
            duration: 1.0,
            min_pitch: 60,
            max_pitch: 71,
            is_folded: false,
            used_pitches: vec![],
        }
    }

    #[test]
    fn test_normalize_db() {
        assert_relative_eq!(normalize_db(1.0, 1.0), 1.0);
        assert_relative_eq!(normalize_db(0.1, 1.0), 0.75, epsilon = 1e-5);
        assert_relative_eq!(normalize_db(1e-6, 1.0), 0.0);
        assert_relative_eq!(normalize_db(0.5, 0.0), 0.0);
    }

    #[test]
    fn test_empty_matrix_fills_background() {
        let matrix = FrameMatrix::empty(FftSize::S1024, 44100.0);
        let image = render_image(&matrix, &params(4.0, 3.0), ColorMap::Default, [1, 2, 3, 4]);
        assert_eq!(image.pixels.len(), 4 * 3 * 4);
        assert!(image.pixels.chunks(4).all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn test_silence_renders_floor_color() {
        let matrix = FrameMatrix::from_frames(vec![vec![0.0; 512]; 4], 1024, 512, 44100.0, 2560);
        let image = render_image(&matrix, &params(8.0, 12.0), ColorMap::Grayscale, [9, 9, 9, 9]);
        assert!(image.pixels.chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_loudest_bin_is_brightest() {
        // Energy only at the bin nearest A4 (pitch 69), only in frame 1
        let mut frames = vec![vec![0.0f32; 512]; 2];
        let matrix_probe = FrameMatrix::from_frames(frames.clone(), 1024, 512, 8000.0, 1536);
        let bin = matrix_probe.frequency_to_bin(440.0);
        frames[1][bin] = 2.0;
        let matrix = FrameMatrix::from_frames(frames, 1024, 512, 8000.0, 1536);

        // 12 rows, 10px each; pitch 69 is the third row from the top
        let image = render_image(&matrix, &params(2.0, 120.0), ColorMap::Grayscale, [0; 4]);
        assert_eq!(image.pixel(1, 25), Some([255, 255, 255, 255]));
        assert_eq!(image.pixel(0, 25), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_folded_rows_follow_used_pitches() {
        let mut p = params(1.0, 20.0);
        p.is_folded = true;
        p.used_pitches = vec![45, 81];

        let mut frames = vec![vec![0.0f32; 512]];
        let probe = FrameMatrix::from_frames(frames.clone(), 1024, 1024, 8000.0, 1024);
        frames[0][probe.frequency_to_bin(pitch_to_hz(81.0))] = 1.0;
        let matrix = FrameMatrix::from_frames(frames, 1024, 1024, 8000.0, 1024);

        let image = render_image(&matrix, &p, ColorMap::Grayscale, [0; 4]);
        // Top half shows pitch 81, bottom half pitch 45
        assert_eq!(image.pixel(0, 5), Some([255, 255, 255, 255]));
        assert_eq!(image.pixel(0, 15), Some([0, 0, 0, 255]));
    }
}
