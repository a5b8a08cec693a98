//! Editor configuration

use pr_spectrogram::{ColorMap, SpectrogramConfig};
use serde::{Deserialize, Serialize};

use crate::error::EditorResult;

/// RGBA color
pub type Color = [u8; 4];

/// Display colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    /// Row shading for black keys
    pub black_key_row: Color,
    /// Line under every C
    pub octave_line: Color,
    pub note: Color,
    pub note_hovered: Color,
    pub note_active: Color,
    /// Outline of selected notes
    pub note_selected: Color,
    pub selection_fill: Color,
    pub selection_stroke: Color,
    pub playhead: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: [16, 16, 24, 255],
            black_key_row: [255, 255, 255, 10],
            octave_line: [255, 255, 255, 40],
            note: [74, 158, 255, 255],
            note_hovered: [120, 186, 255, 255],
            note_active: [255, 170, 64, 255],
            note_selected: [255, 255, 255, 255],
            selection_fill: [74, 158, 255, 40],
            selection_stroke: [74, 158, 255, 200],
            playhead: [255, 64, 64, 255],
        }
    }
}

/// Editor options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Height of the piano roll in pixels
    pub height: f64,
    /// Fixed lowest pitch; automatic when unset
    pub min_pitch: Option<u8>,
    /// Fixed highest pitch; automatic when unset
    pub max_pitch: Option<u8>,
    /// Only show rows for pitches that have notes
    pub folded: bool,
    pub show_spectrogram: bool,
    pub spectrogram: SpectrogramConfig,
    pub color_map: ColorMap,
    /// Snap double-click creation to notes found in the spectrogram
    pub snap_to_spectrogram: bool,
    /// Run FFT analysis on a worker thread
    pub background_analysis: bool,
    pub show_tooltip: bool,
    pub theme: Theme,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            height: 300.0,
            min_pitch: None,
            max_pitch: None,
            folded: false,
            show_spectrogram: false,
            spectrogram: SpectrogramConfig::default(),
            color_map: ColorMap::Default,
            snap_to_spectrogram: false,
            background_analysis: false,
            show_tooltip: true,
            theme: Theme::default(),
        }
    }
}

impl EditorOptions {
    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Explicit pitch range, if either bound is configured
    pub fn pitch_range(&self) -> Option<(u8, u8)> {
        match (self.min_pitch, self.max_pitch) {
            (None, None) => None,
            (min, max) => {
                let (default_min, default_max) = pr_core::DEFAULT_PITCH_RANGE;
                Some((min.unwrap_or(default_min), max.unwrap_or(default_max)))
            }
        }
    }
}
