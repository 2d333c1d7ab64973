//! Tauri commands for the note collection

use tauri::{State, WebviewWindow};

use super::CommandResult;
use crate::notes::{Note, NoteUpdate};
use crate::AppState;

/// All notes, most recent first
#[tauri::command]
pub fn get_notes(state: State<AppState>) -> Vec<Note> {
    state.app.get_notes()
}

/// Save a (partial) note from the calling window
#[tauri::command]
pub fn save_note(state: State<AppState>, window: WebviewWindow, note: NoteUpdate) -> Note {
    state.app.save_note(Some(window.label()), note)
}

/// Delete a note everywhere and close its editors
#[tauri::command]
pub async fn delete_note(state: State<'_, AppState>, id: String) -> CommandResult<bool> {
    Ok(state.app.delete_note(&id))
}
