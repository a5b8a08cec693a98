//! Hover tooltip

use pr_core::Note;

/// Gap between pointer and tooltip (px)
pub const TOOLTIP_OFFSET: f64 = 12.0;

/// Assumed tooltip box size (px)
pub const TOOLTIP_WIDTH: f64 = 88.0;
pub const TOOLTIP_HEIGHT: f64 = 52.0;

/// Tooltip text for a note: name, onset in seconds, duration in ms
pub fn tooltip_text(note: &Note) -> String {
    format!(
        "{}\n{:.2}s\n{}ms",
        note.name(),
        note.onset(),
        (note.duration() * 1000.0).round() as i64
    )
}

/// Tooltip state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    /// Show text near the pointer, kept inside a `width` x `height` container
    pub fn show(&mut self, text: String, pointer_x: f64, pointer_y: f64, width: f64, height: f64) {
        let (x, y) = place(pointer_x, pointer_y, width, height);
        self.visible = true;
        self.text = text;
        self.x = x;
        self.y = y;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

/// Position for the tooltip's top-left corner. Above and right of the
/// pointer when there is room, flipped below when there is not, clamped to
/// the container.
pub fn place(pointer_x: f64, pointer_y: f64, width: f64, height: f64) -> (f64, f64) {
    let mut x = pointer_x + TOOLTIP_OFFSET;
    if x + TOOLTIP_WIDTH > width {
        x = width - TOOLTIP_WIDTH;
    }

    let mut y = pointer_y - TOOLTIP_OFFSET - TOOLTIP_HEIGHT;
    if y < 0.0 {
        y = pointer_y + TOOLTIP_OFFSET;
    }
    if y + TOOLTIP_HEIGHT > height {
        y = height - TOOLTIP_HEIGHT;
    }

    (x.max(0.0), y.max(0.0))
}
