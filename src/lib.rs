pub mod app;
pub mod auth;
pub mod broadcast;
#[cfg(feature = "desktop")]
mod commands;
pub mod config;
pub mod notes;
pub mod storage;
pub mod sync;
#[cfg(test)]
mod testing;
pub mod windows;

pub use app::App;

#[cfg(feature = "desktop")]
pub struct AppState {
    pub app: std::sync::Arc<App>,
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;

    use tauri::{Manager, WindowEvent};

    use config::CloudSettings;
    use windows::TauriHost;

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::default()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .setup(|app| {
            let data_dir = storage::default_data_dir()?;
            let settings = CloudSettings::load(&data_dir);
            log::info!("App: data directory {:?}", data_dir);

            let host = Arc::new(TauriHost::new(app.handle().clone()));
            let runtime = tauri::async_runtime::handle().inner().clone();
            let core = Arc::new(App::new(data_dir, settings, host, runtime)?);
            app.manage(AppState {
                app: Arc::clone(&core),
            });

            core.restore_windows();
            tauri::async_runtime::spawn(async move {
                core.pull_on_start().await;
            });

            Ok(())
        })
        .on_window_event(|window, event| {
            let Some(state) = window.try_state::<AppState>() else {
                return;
            };
            match event {
                WindowEvent::Moved(_) | WindowEvent::Resized(_) => {
                    state.app.handle_window_moved(window.label());
                }
                WindowEvent::CloseRequested { .. } | WindowEvent::Destroyed => {
                    state.app.handle_window_closed(window.label());
                }
                _ => {}
            }
        })
        .invoke_handler(tauri::generate_handler![
            // Notes
            commands::get_notes,
            commands::save_note,
            commands::delete_note,
            // Config and onboarding
            commands::get_config,
            commands::save_config,
            commands::complete_onboarding,
            // Windows
            commands::request_list_role,
            commands::release_list_role,
            commands::open_note,
            commands::open_list,
            commands::open_settings,
            commands::open_onboarding,
            commands::create_editor_window,
            // Auth
            commands::login,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
