use serde_json::Value;
use tauri::window::Color;
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use super::host::{WindowError, WindowHost};
use super::role::WindowSpec;
use crate::notes::Bounds;

/// [`WindowHost`] over Tauri webview windows
#[derive(Clone)]
pub struct TauriHost {
    app: AppHandle,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn window(&self, label: &str) -> Result<WebviewWindow, WindowError> {
        self.app
            .get_webview_window(label)
            .ok_or_else(|| WindowError::NotFound(label.to_string()))
    }
}

fn host_err(e: tauri::Error) -> WindowError {
    WindowError::Host(e.to_string())
}

/// `#rrggbb` to an opaque color
fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color(channel(0)?, channel(2)?, channel(4)?, 255))
}

impl WindowHost for TauriHost {
    fn create(&self, spec: &WindowSpec) -> Result<(), WindowError> {
        let preset = &spec.preset;
        let (width, height) = spec.size();

        let mut builder =
            WebviewWindowBuilder::new(&self.app, &spec.label, WebviewUrl::App(spec.route.clone().into()))
                .title(preset.title)
                .inner_size(width, height)
                .min_inner_size(preset.min_width, preset.min_height)
                .decorations(preset.decorations)
                .transparent(preset.transparent)
                .always_on_top(preset.always_on_top)
                .resizable(preset.resizable)
                .skip_taskbar(preset.skip_taskbar);

        builder = match spec.bounds {
            Some(bounds) => builder.position(bounds.x, bounds.y),
            None => builder.center(),
        };
        if let Some(color) = spec.background.and_then(parse_hex) {
            builder = builder.background_color(color);
        }

        builder.build().map_err(host_err)?;
        Ok(())
    }

    fn focus(&self, label: &str) -> Result<(), WindowError> {
        let window = self.window(label)?;
        window.unminimize().map_err(host_err)?;
        window.show().map_err(host_err)?;
        window.set_focus().map_err(host_err)
    }

    fn close(&self, label: &str) -> Result<(), WindowError> {
        match self.app.get_webview_window(label) {
            Some(window) => window.close().map_err(host_err),
            None => Ok(()),
        }
    }

    fn is_alive(&self, label: &str) -> bool {
        self.app.get_webview_window(label).is_some()
    }

    fn bounds(&self, label: &str) -> Option<Bounds> {
        let window = self.app.get_webview_window(label)?;
        let scale = window.scale_factor().ok()?;
        let position = window.outer_position().ok()?.to_logical::<f64>(scale);
        let size = window.inner_size().ok()?.to_logical::<f64>(scale);
        Some(Bounds {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn exclude_from_capture(&self, label: &str) -> Result<(), WindowError> {
        self.window(label)?
            .set_content_protected(true)
            .map_err(host_err)
    }

    fn live_labels(&self) -> Vec<String> {
        self.app.webview_windows().into_keys().collect()
    }

    fn emit_to(&self, label: &str, event: &str, payload: Value) -> Result<(), WindowError> {
        // Emitting to a missing label succeeds silently in Tauri
        self.window(label)?;
        self.app.emit_to(label, event, payload).map_err(host_err)
    }

    fn open_external(&self, url: &str) -> Result<(), WindowError> {
        open::that(url).map_err(|e| WindowError::Host(e.to_string()))
    }
}
