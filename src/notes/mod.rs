//! Sticky notes: the persisted record and the JSON-backed note store

mod models;
mod storage;

pub use models::*;
pub use storage::NoteStore;
