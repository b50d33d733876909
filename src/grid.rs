mod editor;
mod engine;

pub use editor::{NoteEditor, commit_note, strip_markup};
pub use engine::{CellState, GridCell, GridEngine};
