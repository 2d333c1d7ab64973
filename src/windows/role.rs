use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notes::Bounds;

/// Functional kind of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowRole {
    Editor,
    List,
    Settings,
    Onboarding,
}

impl WindowRole {
    /// Roles allowed at most one live window at a time
    pub fn is_singleton(&self) -> bool {
        matches!(self, Self::List | Self::Settings)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::List => "list",
            Self::Settings => "settings",
            Self::Onboarding => "onboarding",
        }
    }

    /// Label for a new window of this role. Singletons use a fixed label.
    pub fn new_label(&self) -> String {
        if self.is_singleton() {
            self.as_str().to_string()
        } else {
            format!("{}-{}", self.as_str(), Uuid::new_v4())
        }
    }

    /// Infer the role from a window label
    pub fn from_label(label: &str) -> Option<Self> {
        let prefix = label.split('-').next().unwrap_or(label);
        match prefix {
            "editor" => Some(Self::Editor),
            "list" => Some(Self::List),
            "settings" => Some(Self::Settings),
            "onboarding" => Some(Self::Onboarding),
            _ => None,
        }
    }

    /// Fixed chrome and size preset for the role
    pub fn preset(&self) -> WindowPreset {
        match self {
            Self::Editor => WindowPreset {
                title: "Ghost Notes",
                width: 300.0,
                height: 300.0,
                min_width: 100.0,
                min_height: 100.0,
                decorations: false,
                transparent: true,
                always_on_top: true,
                resizable: true,
                skip_taskbar: false,
            },
            Self::List => WindowPreset {
                title: "Ghost Notes",
                width: 340.0,
                height: 520.0,
                min_width: 260.0,
                min_height: 320.0,
                decorations: false,
                transparent: true,
                always_on_top: true,
                resizable: true,
                skip_taskbar: false,
            },
            Self::Settings => WindowPreset {
                title: "Settings",
                width: 380.0,
                height: 520.0,
                min_width: 380.0,
                min_height: 520.0,
                decorations: false,
                transparent: true,
                always_on_top: true,
                resizable: false,
                skip_taskbar: true,
            },
            Self::Onboarding => WindowPreset {
                title: "Welcome to Ghost Notes",
                width: 420.0,
                height: 600.0,
                min_width: 420.0,
                min_height: 600.0,
                decorations: true,
                transparent: false,
                always_on_top: false,
                resizable: false,
                skip_taskbar: false,
            },
        }
    }
}

impl fmt::Display for WindowRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window chrome flags and default geometry for a role
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPreset {
    pub title: &'static str,
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    pub decorations: bool,
    pub transparent: bool,
    pub always_on_top: bool,
    pub resizable: bool,
    pub skip_taskbar: bool,
}

/// Everything a host needs to build one window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub label: String,
    pub role: WindowRole,
    pub preset: WindowPreset,
    /// Frontend route, relative to the app's index page
    pub route: String,
    /// Restored position and size; `None` means default placement
    pub bounds: Option<Bounds>,
    pub background: Option<&'static str>,
}

impl WindowSpec {
    pub fn new(role: WindowRole) -> Self {
        let label = role.new_label();
        Self {
            route: format!("index.html?view={}&window={}", role.as_str(), label),
            label,
            role,
            preset: role.preset(),
            bounds: None,
            background: None,
        }
    }

    /// Editor spec, optionally bound to an existing note
    pub fn editor(note_id: Option<&str>) -> Self {
        let mut spec = Self::new(WindowRole::Editor);
        if let Some(id) = note_id {
            spec.route = format!("{}&noteId={}", spec.route, urlencoding::encode(id));
        }
        spec
    }

    pub fn with_bounds(mut self, bounds: Option<Bounds>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_background(mut self, background: &'static str) -> Self {
        self.background = Some(background);
        self
    }

    /// Size to build with: restored bounds or the role default
    pub fn size(&self) -> (f64, f64) {
        match self.bounds {
            Some(b) => (
                b.width.max(self.preset.min_width),
                b.height.max(self.preset.min_height),
            ),
            None => (self.preset.width, self.preset.height),
        }
    }
}
