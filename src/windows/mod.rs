//! Window roles, the window registry and the lifecycle manager.
//!
//! The orchestrator never touches the windowing toolkit directly; it goes
//! through [`WindowHost`], implemented over Tauri in the desktop build.

mod host;
mod manager;
mod registry;
mod role;
#[cfg(feature = "desktop")]
mod tauri_host;

pub use host::{HeadlessHost, WindowError, WindowHost};
pub use manager::{Opened, WindowManager};
pub use registry::{Claim, Unregistered, WindowEntry, WindowRegistry};
pub use role::{WindowPreset, WindowRole, WindowSpec};
#[cfg(feature = "desktop")]
pub use tauri_host::TauriHost;
