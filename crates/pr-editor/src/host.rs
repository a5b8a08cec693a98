//! Collaborators supplied by the embedding application

use pr_core::Note;
use pr_spectrogram::AudioBuffer;

/// Timeline/waveform view the piano roll is synchronized to
pub trait TimelineHost {
    /// Total duration in seconds
    fn duration(&self) -> f64;
    /// Current display width in pixels
    fn width(&self) -> f64;
}

/// Audio preview of notes
pub trait NotePreview {
    /// Preview is switched on
    fn enabled(&self) -> bool;
    fn trigger_note(&mut self, note: &Note);
    fn release_note(&mut self, note: &Note);
    fn stop_all(&mut self);
}

/// Notifications from the timeline host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Zoom,
    Scroll,
    Redraw,
    /// Playback position advanced (seconds)
    TimeUpdate(f64),
    /// Playback position jumped (seconds)
    Seek(f64),
    Pause,
    /// New audio is available
    AudioDecoded(AudioBuffer),
}

/// Host with fixed dimensions, for headless use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticTimeline {
    pub duration: f64,
    pub width: f64,
}

impl StaticTimeline {
    pub fn new(duration: f64, width: f64) -> Self {
        Self { duration, width }
    }
}

impl TimelineHost for StaticTimeline {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn width(&self) -> f64 {
        self.width
    }
}

/// Preview that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPreview;

impl NotePreview for SilentPreview {
    fn enabled(&self) -> bool {
        false
    }

    fn trigger_note(&mut self, _note: &Note) {}

    fn release_note(&mut self, _note: &Note) {}

    fn stop_all(&mut self) {}
}
