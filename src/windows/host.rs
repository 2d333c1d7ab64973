use serde_json::Value;
use thiserror::Error;

use super::role::WindowSpec;
use crate::notes::Bounds;

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Window not found: {0}")]
    NotFound(String),

    #[error("Window host error: {0}")]
    Host(String),

    #[error("Not supported by this host: {0}")]
    Unsupported(&'static str),
}

/// The windowing toolkit as seen by the orchestrator
///
/// All calls are synchronous and cheap; implementations must tolerate
/// labels of windows that are already gone.
pub trait WindowHost: Send + Sync + 'static {
    /// Build and show a window
    fn create(&self, spec: &WindowSpec) -> Result<(), WindowError>;

    fn focus(&self, label: &str) -> Result<(), WindowError>;

    fn close(&self, label: &str) -> Result<(), WindowError>;

    /// True while the window exists and is not being torn down
    fn is_alive(&self, label: &str) -> bool;

    /// Current outer position and inner size in logical pixels
    fn bounds(&self, label: &str) -> Option<Bounds>;

    /// Hide the window from screen capture and screen sharing
    fn exclude_from_capture(&self, label: &str) -> Result<(), WindowError>;

    /// Labels of every live window
    fn live_labels(&self) -> Vec<String>;

    /// Deliver an event to one window
    fn emit_to(&self, label: &str, event: &str, payload: Value) -> Result<(), WindowError>;

    /// Open a URL in the system browser
    fn open_external(&self, url: &str) -> Result<(), WindowError>;
}

/// Host with no windows, for headless use (CLI)
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

impl WindowHost for HeadlessHost {
    fn create(&self, _spec: &WindowSpec) -> Result<(), WindowError> {
        Err(WindowError::Unsupported("create"))
    }

    fn focus(&self, label: &str) -> Result<(), WindowError> {
        Err(WindowError::NotFound(label.to_string()))
    }

    fn close(&self, _label: &str) -> Result<(), WindowError> {
        Ok(())
    }

    fn is_alive(&self, _label: &str) -> bool {
        false
    }

    fn bounds(&self, _label: &str) -> Option<Bounds> {
        None
    }

    fn exclude_from_capture(&self, _label: &str) -> Result<(), WindowError> {
        Err(WindowError::Unsupported("exclude_from_capture"))
    }

    fn live_labels(&self) -> Vec<String> {
        Vec::new()
    }

    fn emit_to(&self, label: &str, _event: &str, _payload: Value) -> Result<(), WindowError> {
        Err(WindowError::NotFound(label.to_string()))
    }

    fn open_external(&self, url: &str) -> Result<(), WindowError> {
        open::that(url).map_err(|e| WindowError::Host(e.to_string()))
    }
}
