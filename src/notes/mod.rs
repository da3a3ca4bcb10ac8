pub mod search;
pub mod store;
pub mod types;

pub use search::filter_notes;
pub use store::NoteStore;
pub use types::{Note, NoteDraft};
