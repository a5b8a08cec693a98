//! pr-core: Note model and geometry for the piano roll editor
//!
//! This crate provides the parts of the editor that do not depend on audio
//! analysis or pointer input:
//! - [`Note`] records with stable [`NoteId`]s
//! - Pitch naming and Hz conversion
//! - [`CoordinateParams`]: time/pitch ↔ pixel mapping with folding
//! - [`NoteStore`]: ordered storage, queries, used pitches, pitch range
//! - Input normalization from JSON, CSV and Standard MIDI Files

mod error;
mod note;
mod pitch;
mod coords;
mod store;
mod input;
mod delimited;
mod smf;

pub use error::*;
pub use note::*;
pub use pitch::*;
pub use coords::*;
pub use store::*;
pub use input::*;
pub use delimited::*;
pub use smf::*;
