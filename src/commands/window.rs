//! Tauri commands for opening windows and the list role
//!
//! Window-creating commands are async: building a webview from a
//! synchronous command blocks the event loop on Windows.

use tauri::{State, WebviewWindow};

use super::CommandResult;
use crate::windows::{Opened, WindowError};
use crate::AppState;

fn label_of(result: Result<Opened, WindowError>) -> CommandResult<String> {
    result
        .map(|opened| opened.label().to_string())
        .map_err(|e| e.to_string())
}

/// Claim the list role for the calling window
///
/// Returns false (and focuses the holder) if another window has it.
#[tauri::command]
pub fn request_list_role(state: State<AppState>, window: WebviewWindow) -> bool {
    state.app.request_list_role(window.label())
}

#[tauri::command]
pub fn release_list_role(state: State<AppState>, window: WebviewWindow) -> bool {
    state.app.release_list_role(window.label())
}

/// Open (or focus) the editor for a note
#[tauri::command]
pub async fn open_note(state: State<'_, AppState>, id: String) -> CommandResult<String> {
    label_of(state.app.open_note(&id))
}

#[tauri::command]
pub async fn open_list(state: State<'_, AppState>) -> CommandResult<String> {
    label_of(state.app.open_list())
}

#[tauri::command]
pub async fn open_settings(state: State<'_, AppState>) -> CommandResult<String> {
    label_of(state.app.open_settings())
}

#[tauri::command]
pub async fn open_onboarding(state: State<'_, AppState>) -> CommandResult<String> {
    label_of(state.app.open_onboarding())
}

/// Open a blank editor; the note id is assigned by the window on first save
#[tauri::command]
pub async fn create_editor_window(state: State<'_, AppState>) -> CommandResult<String> {
    label_of(state.app.create_editor_window())
}
