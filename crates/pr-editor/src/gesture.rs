//! Pointer gesture state
//!
//! At most one gesture is active at a time. A drag owns snapshots of the
//! notes it started from; every move is computed from those snapshots and
//! the total pointer displacement, never incrementally.

use pr_core::{Note, NoteId, Rect};

/// What a drag does to its notes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Move in time and pitch
    Move,
    /// Move the start, keep the end
    ResizeLeft,
    /// Move the end, keep the start
    ResizeRight,
}

/// An in-progress drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub mode: DragMode,
    /// Note the pointer went down on
    pub anchor: NoteId,
    pub start_x: f64,
    pub start_y: f64,
    /// Every dragged note as it was when the drag began
    pub originals: Vec<Note>,
    /// Anchor pitch at the last preview decision
    pub preview_pitch: u8,
    /// Note currently sounding as drag preview
    pub previewing: Option<Note>,
}

impl DragState {
    pub fn new(mode: DragMode, anchor: &Note, originals: Vec<Note>, x: f64, y: f64) -> Self {
        Self {
            mode,
            anchor: anchor.id(),
            start_x: x,
            start_y: y,
            originals,
            preview_pitch: anchor.pitch(),
            previewing: None,
        }
    }
}

/// An in-progress rubber-band selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSelection {
    pub start_x: f64,
    pub start_y: f64,
    pub current_x: f64,
    pub current_y: f64,
}

impl BoxSelection {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            start_x: x,
            start_y: y,
            current_x: x,
            current_y: y,
        }
    }

    /// Normalized rectangle, valid whichever way the pointer moved
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start_x, self.start_y, self.current_x, self.current_y)
    }
}

/// Active gesture
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragState),
    BoxSelecting(BoxSelection),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Gesture::Dragging(_))
    }

    pub fn selection_box(&self) -> Option<Rect> {
        match self {
            Gesture::BoxSelecting(b) => Some(b.rect()),
            _ => None,
        }
    }
}
