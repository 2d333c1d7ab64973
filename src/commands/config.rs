use tauri::State;

use super::CommandResult;
use crate::config::{AppConfig, ConfigUpdate};
use crate::AppState;

#[tauri::command]
pub fn get_config(state: State<AppState>) -> AppConfig {
    state.app.get_config()
}

/// Partial update; `null` clears `user` / `authToken` (sign out)
#[tauri::command]
pub fn save_config(state: State<AppState>, update: ConfigUpdate) -> AppConfig {
    state.app.save_config(update)
}

#[tauri::command]
pub async fn complete_onboarding(state: State<'_, AppState>) -> CommandResult<String> {
    state
        .app
        .complete_onboarding()
        .map(|opened| opened.label().to_string())
        .map_err(|e| e.to_string())
}
