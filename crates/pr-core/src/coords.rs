//! Coordinate mapping between time/pitch and canvas pixels
//!
//! Pitches are laid out high-to-low from the top of the canvas. In folded mode
//! only the pitches that actually occur in the note list get a row.
//! None of these functions fail: zero-sized inputs map to 0 and pitches that
//! have no row map to [`OFFSCREEN_Y`].

use std::borrow::Cow;

use crate::note::Note;
use crate::pitch::{MAX_PITCH, MIN_PITCH};

/// Y position for pitches that have no row in the current layout
pub const OFFSCREEN_Y: f64 = -100.0;

/// Minimum rendered/hit-testable note width in pixels
pub const MIN_NOTE_WIDTH_PX: f64 = 2.0;

const ROW_EPSILON: f64 = 1e-7;

// ═══════════════════════════════════════════════════════════════════════════════
// RECTANGLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build from two arbitrary corners
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Inclusive overlap test
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COORDINATE PARAMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-render snapshot of everything the coordinate functions depend on
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateParams {
    /// Canvas width (pixels)
    pub width: f64,
    /// Canvas height (pixels)
    pub height: f64,
    /// Total timeline duration (seconds)
    pub duration: f64,
    pub min_pitch: u8,
    pub max_pitch: u8,
    pub is_folded: bool,
    /// Sorted ascending, unique
    pub used_pitches: Vec<u8>,
}

impl Default for CoordinateParams {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            duration: 0.0,
            min_pitch: 21,
            max_pitch: 108,
            is_folded: false,
            used_pitches: Vec::new(),
        }
    }
}

impl CoordinateParams {
    #[inline]
    fn uses_folded_rows(&self) -> bool {
        self.is_folded && !self.used_pitches.is_empty()
    }

    /// Pitches that get a row, ascending
    pub fn display_pitches(&self) -> Cow<'_, [u8]> {
        if self.uses_folded_rows() {
            Cow::Borrowed(&self.used_pitches)
        } else if self.min_pitch <= self.max_pitch {
            Cow::Owned((self.min_pitch..=self.max_pitch).collect())
        } else {
            Cow::Owned(Vec::new())
        }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        if self.uses_folded_rows() {
            self.used_pitches.len()
        } else if self.min_pitch <= self.max_pitch {
            (self.max_pitch - self.min_pitch) as usize + 1
        } else {
            0
        }
    }

    /// Height of one pitch row
    pub fn row_height(&self) -> f64 {
        match self.row_count() {
            0 => 0.0,
            n => self.height / n as f64,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Time axis
    // ─────────────────────────────────────────────────────────────────────────────

    /// Convert seconds to x pixel position
    pub fn time_to_px(&self, time: f64) -> f64 {
        if self.duration > 0.0 {
            time / self.duration * self.width
        } else {
            0.0
        }
    }

    /// Convert x pixel to seconds
    pub fn px_to_time(&self, x: f64) -> f64 {
        if self.width > 0.0 {
            x / self.width * self.duration
        } else {
            0.0
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Pitch axis
    // ─────────────────────────────────────────────────────────────────────────────

    /// Does this pitch have a row under the current range and fold state?
    pub fn is_pitch_visible(&self, pitch: u8) -> bool {
        if self.uses_folded_rows() {
            self.used_pitches.binary_search(&pitch).is_ok()
        } else {
            (self.min_pitch..=self.max_pitch).contains(&pitch)
        }
    }

    /// Convert pitch to the y position of the top of its row
    pub fn pitch_to_px(&self, pitch: u8) -> f64 {
        let row_height = self.row_height();
        if self.uses_folded_rows() {
            match self.used_pitches.binary_search(&pitch) {
                Ok(index) => self.height - (index as f64 + 1.0) * row_height,
                Err(_) => OFFSCREEN_Y,
            }
        } else {
            self.height - (pitch as f64 - self.min_pitch as f64 + 1.0) * row_height
        }
    }

    /// Convert y pixel to the pitch of the row containing it
    pub fn px_to_pitch(&self, y: f64) -> u8 {
        let row_height = self.row_height();
        if row_height <= 0.0 {
            return self.min_pitch.min(MAX_PITCH);
        }

        // Row index counted from the bottom; a row spans [top, top + row_height)
        let row = ((self.height - y) / row_height - ROW_EPSILON).ceil() - 1.0;

        if self.uses_folded_rows() {
            let last = self.used_pitches.len() as f64 - 1.0;
            let index = row.clamp(0.0, last) as usize;
            self.used_pitches[index]
        } else {
            (self.min_pitch as f64 + row).clamp(MIN_PITCH as f64, MAX_PITCH as f64) as u8
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Notes
    // ─────────────────────────────────────────────────────────────────────────────

    /// Drawn rectangle of a note
    pub fn note_rect(&self, note: &Note) -> Rect {
        let x = self.time_to_px(note.onset());
        let width = self.time_to_px(note.offset()) - x;
        Rect::new(x, self.pitch_to_px(note.pitch()), width, self.row_height())
    }

    /// Rectangle used for pointer hit-testing: at least 2px wide and one
    /// pixel shorter than the row so adjacent rows never both match.
    pub fn note_hit_rect(&self, note: &Note) -> Rect {
        let rect = self.note_rect(note);
        Rect::new(
            rect.x,
            rect.y,
            rect.width.max(MIN_NOTE_WIDTH_PX),
            (rect.height - 1.0).max(0.0),
        )
    }
}
