//! Hit-testing

use pr_core::{CoordinateParams, Note, NoteId, Rect};

use crate::gesture::DragMode;

/// Distance from a note edge (px) that starts a resize instead of a move
pub const EDGE_THRESHOLD_PX: f64 = 8.0;

/// Is a note with this pitch drawn under the current range and fold state?
pub fn is_displayed(params: &CoordinateParams, pitch: u8) -> bool {
    pitch >= params.min_pitch && pitch <= params.max_pitch && params.is_pitch_visible(pitch)
}

/// First note (in store order) under the point
pub fn hit_test(notes: &[Note], params: &CoordinateParams, x: f64, y: f64) -> Option<NoteId> {
    notes
        .iter()
        .filter(|n| is_displayed(params, n.pitch()))
        .find(|n| params.note_hit_rect(n).contains(x, y))
        .map(Note::id)
}

/// Classify a pointer-down inside a note's hit rectangle
pub fn drag_mode(hit_rect: &Rect, x: f64) -> DragMode {
    if x - hit_rect.x <= EDGE_THRESHOLD_PX {
        DragMode::ResizeLeft
    } else if hit_rect.right() - x <= EDGE_THRESHOLD_PX {
        DragMode::ResizeRight
    } else {
        DragMode::Move
    }
}

/// Notes whose drawn rectangle intersects `area`, in store order
pub fn notes_in_rect(notes: &[Note], params: &CoordinateParams, area: &Rect) -> Vec<NoteId> {
    notes
        .iter()
        .filter(|n| is_displayed(params, n.pitch()))
        .filter(|n| params.note_rect(n).intersects(area))
        .map(Note::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pr_core::{NoteDraft, NoteStore};

    fn setup() -> (NoteStore, CoordinateParams) {
        let mut store = NoteStore::new();
        store.replace_all(vec![
            NoteDraft::new(60, 1.0, 1.0),
            NoteDraft::new(62, 1.0, 1.0),
            NoteDraft::new(60, 5.0, 0.001),
        ]);
        let params = CoordinateParams {
            width: 1000.0,
            height: 120.0,
            duration: 10.0,
            min_pitch: 60,
            max_pitch: 71,
            is_folded: false,
            used_pitches: store.used_pitches().to_vec(),
        };
        (store, params)
    }

    #[test]
    fn test_hit_inside_note() {
        let (store, params) = setup();
        // Pitch 60 is the bottom row: y 110..119
        let id = hit_test(store.notes(), &params, 150.0, 115.0).unwrap();
        assert_eq!(store.get(id).unwrap().pitch(), 60);
        // Pitch 62 row: y 90..99
        let id = hit_test(store.notes(), &params, 150.0, 95.0).unwrap();
        assert_eq!(store.get(id).unwrap().pitch(), 62);
        // Row of pitch 61 is empty
        assert!(hit_test(store.notes(), &params, 150.0, 105.0).is_none());
    }

    #[test]
    fn test_hit_rect_bottom_pixel_excluded() {
        let (store, params) = setup();
        // Pitch 62's row is 90..100, hit area ends at 99
        assert!(hit_test(store.notes(), &params, 150.0, 99.5).is_none());
    }

    #[test]
    fn test_tiny_note_has_minimum_width() {
        let (store, params) = setup();
        // 0.001s = 0.1px wide, hit area widened to 2px
        assert!(hit_test(store.notes(), &params, 501.5, 115.0).is_some());
        assert!(hit_test(store.notes(), &params, 502.5, 115.0).is_none());
    }

    #[test]
    fn test_out_of_range_not_hit() {
        let (store, mut params) = setup();
        params.min_pitch = 61;
        assert!(hit_test(store.notes(), &params, 150.0, 115.0).is_none());
    }

    #[test]
    fn test_drag_mode() {
        let rect = Rect::new(100.0, 0.0, 100.0, 10.0);
        assert_eq!(drag_mode(&rect, 104.0), DragMode::ResizeLeft);
        assert_eq!(drag_mode(&rect, 108.0), DragMode::ResizeLeft);
        assert_eq!(drag_mode(&rect, 150.0), DragMode::Move);
        assert_eq!(drag_mode(&rect, 195.0), DragMode::ResizeRight);
    }

    #[test]
    fn test_notes_in_rect() {
        let (store, params) = setup();
        // Covers the start of both notes at t=1s
        let area = Rect::from_corners(90.0, 85.0, 120.0, 119.0);
        assert_eq!(notes_in_rect(store.notes(), &params, &area).len(), 2);
        // Only the low row
        let area = Rect::from_corners(90.0, 112.0, 120.0, 119.0);
        let ids = notes_in_rect(store.notes(), &params, &area);
        assert_eq!(ids.len(), 1);
        assert_eq!(store.get(ids[0]).unwrap().pitch(), 60);
    }
}
