//! pr-editor: Interactive piano roll editor
//!
//! Ties the note model and the spectrogram together into one editor
//! session driven by pointer, keyboard and timeline events.
//!
//! ## Structure
//!
//! - [`Editor`]: session state and every public operation
//! - [`EditorEvent`] / [`EventBus`]: typed listener registry
//! - [`Gesture`]: drag and box-selection state machine
//! - [`TimelineHost`] / [`NotePreview`]: traits the embedding app implements
//! - [`compose`]: layered draw commands for any [`Canvas`]

mod editor;
mod error;
mod events;
mod gesture;
mod hit;
mod host;
mod options;
mod playback;
mod render;
mod tooltip;

pub use editor::*;
pub use error::*;
pub use events::*;
pub use gesture::*;
pub use hit::*;
pub use host::*;
pub use options::*;
pub use playback::*;
pub use render::*;
pub use tooltip::*;
