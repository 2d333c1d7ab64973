use tauri::State;

use super::CommandResult;
use crate::config::AppConfig;
use crate::AppState;

/// Browser sign-in; resolves with the new (redacted) config
#[tauri::command]
pub async fn login(state: State<'_, AppState>) -> CommandResult<AppConfig> {
    state.app.login().await.map_err(|e| e.to_string())
}
