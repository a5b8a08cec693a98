//! Spectrogram color ramps

use serde::{Deserialize, Serialize};

/// Number of entries in a lookup table
pub const LUT_SIZE: usize = 256;

/// Spectrogram color map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    /// Black → purple → blue → orange → yellow
    #[default]
    Default,
    /// Viridis (perceptually uniform, colorblind-friendly)
    Viridis,
    /// Grayscale
    Grayscale,
}

/// Stops of the default ramp, evenly spaced
const DEFAULT_STOPS: [[f32; 3]; 5] = [
    [0.0, 0.0, 0.0],
    [75.0 / 255.0, 0.0, 130.0 / 255.0],
    [0.0, 90.0 / 255.0, 1.0],
    [1.0, 140.0 / 255.0, 0.0],
    [1.0, 1.0, 0.0],
];

impl ColorMap {
    /// Sample the color map at position t (0.0-1.0)
    /// Returns (r, g, b, a) in 0.0-1.0 range
    pub fn sample(&self, t: f32) -> [f32; 4] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            ColorMap::Default => Self::ramp(t),
            ColorMap::Viridis => Self::viridis(t),
            ColorMap::Grayscale => [t, t, t, 1.0],
        }
    }

    fn ramp(t: f32) -> [f32; 4] {
        let segments = (DEFAULT_STOPS.len() - 1) as f32;
        let pos = t * segments;
        let index = (pos.floor() as usize).min(DEFAULT_STOPS.len() - 2);
        let s = pos - index as f32;
        let [r0, g0, b0] = DEFAULT_STOPS[index];
        let [r1, g1, b1] = DEFAULT_STOPS[index + 1];
        [
            r0 + (r1 - r0) * s,
            g0 + (g1 - g0) * s,
            b0 + (b1 - b0) * s,
            1.0,
        ]
    }

    fn viridis(t: f32) -> [f32; 4] {
        // Simplified viridis approximation
        let r = 0.267 + t * (0.993 - 0.267);
        let g = if t < 0.5 {
            0.004 + t * 2.0 * (0.507 - 0.004)
        } else {
            0.507 + (t - 0.5) * 2.0 * (0.906 - 0.507)
        };
        let b = 0.329 + t * 0.1 * (1.0 - t) * 4.0;
        [r, g, b, 1.0]
    }

    /// 8-bit RGBA color at position t, alpha always 255
    pub fn rgba8(&self, t: f32) -> [u8; 4] {
        let [r, g, b, _] = self.sample(t);
        [to_u8(r), to_u8(g), to_u8(b), 255]
    }

    /// Lookup table of `LUT_SIZE` RGBA colors spanning 0.0-1.0
    pub fn lut(&self) -> Vec<[u8; 4]> {
        (0..LUT_SIZE)
            .map(|i| self.rgba8(i as f32 / (LUT_SIZE - 1) as f32))
            .collect()
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
