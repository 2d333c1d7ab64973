use std::sync::{Arc, Mutex, MutexGuard};

use super::host::{WindowError, WindowHost};
use super::registry::{Claim, WindowRegistry};
use super::role::{WindowRole, WindowSpec};
use crate::notes::{Bounds, Note, NoteStore};

/// Result of an open request
#[derive(Debug, Clone, PartialEq)]
pub enum Opened {
    Created(String),
    /// An existing window was focused instead
    Focused(String),
}

impl Opened {
    pub fn label(&self) -> &str {
        match self {
            Self::Created(label) | Self::Focused(label) => label,
        }
    }
}

/// Opens, tracks and closes windows
///
/// Owns the window registry. Editor windows restore their note's last
/// geometry on open and write it back on close.
pub struct WindowManager {
    host: Arc<dyn WindowHost>,
    notes: Arc<NoteStore>,
    registry: Mutex<WindowRegistry>,
}

impl WindowManager {
    pub fn new(host: Arc<dyn WindowHost>, notes: Arc<NoteStore>) -> Self {
        Self {
            host,
            notes,
            registry: Mutex::new(WindowRegistry::new()),
        }
    }

    fn registry(&self) -> MutexGuard<'_, WindowRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a window for a role. Singleton roles focus their live window.
    pub fn open(&self, role: WindowRole) -> Result<Opened, WindowError> {
        if role == WindowRole::Editor {
            return self.open_editor(None);
        }

        let spec = WindowSpec::new(role);
        if role.is_singleton() {
            // Check and reserve under one lock so concurrent opens see the holder
            let mut registry = self.registry();
            if let Some(label) = registry.singleton(role).map(str::to_string) {
                if registry.is_pending(&label) {
                    log::debug!("Windows: {} window {} is still being built", role, label);
                    return Ok(Opened::Focused(label));
                }
                if self.host.is_alive(&label) {
                    drop(registry);
                    log::debug!("Windows: {} already open, focusing {}", role, label);
                    self.focus(&label);
                    return Ok(Opened::Focused(label));
                }
                log::info!("Windows: dropping stale {} window {}", role, label);
                registry.forget_singleton(role);
            }
            registry.reserve(&spec.label, role, None);
        } else {
            self.registry().reserve(&spec.label, role, None);
        }

        self.build(spec).map(Opened::Created)
    }

    /// Open an editor, restoring the note's stored geometry
    ///
    /// A live editor already bound to the note is focused instead.
    pub fn open_editor(&self, note_id: Option<&str>) -> Result<Opened, WindowError> {
        let Some(note_id) = note_id else {
            return self.create(WindowSpec::editor(None), None).map(Opened::Created);
        };

        let bound = self.registry().windows_for_note(note_id);
        if let Some(label) = bound.into_iter().find(|l| self.host.is_alive(l)) {
            self.focus(&label);
            return Ok(Opened::Focused(label));
        }

        let note = self.notes.get(note_id);
        let mut spec = WindowSpec::editor(Some(note_id));
        if let Some(note) = &note {
            spec = spec
                .with_bounds(note.bounds())
                .with_background(note.color.background());
        }

        let label = self.create(spec, Some(note_id.to_string()))?;

        if note.is_some_and(|n| !n.is_open) {
            self.notes.modify(|notes| set_open(notes, note_id, true, None));
        }

        Ok(Opened::Created(label))
    }

    fn create(&self, spec: WindowSpec, note_id: Option<String>) -> Result<String, WindowError> {
        self.registry().reserve(&spec.label, spec.role, note_id);
        self.build(spec)
    }

    /// Build a reserved window; the reservation is dropped if the host fails
    fn build(&self, spec: WindowSpec) -> Result<String, WindowError> {
        if let Err(e) = self.host.create(&spec) {
            self.registry().unregister(&spec.label);
            return Err(e);
        }
        let bounds = self.host.bounds(&spec.label);
        self.registry().confirm(&spec.label, bounds);
        log::info!("Windows: opened {} window {}", spec.role, spec.label);

        // One attempt per window; the window works without it
        if let Err(e) = self.host.exclude_from_capture(&spec.label) {
            log::warn!(
                "Windows: capture exclusion unavailable for {}: {}",
                spec.label,
                e
            );
        }

        Ok(spec.label)
    }

    fn focus(&self, label: &str) {
        if let Err(e) = self.host.focus(label) {
            log::warn!("Windows: failed to focus {}: {}", label, e);
        }
    }

    /// Let an existing window take a singleton role in place
    ///
    /// Returns false, focusing the holder, if another live window has it.
    pub fn request_role(&self, role: WindowRole, label: &str) -> bool {
        let claim = self.registry().claim(role, label);
        match claim {
            Claim::Granted => true,
            Claim::HeldBy(holder) if self.host.is_alive(&holder) => {
                self.focus(&holder);
                false
            }
            Claim::HeldBy(holder) => {
                log::info!("Windows: {} holder {} is gone, reassigning", role, holder);
                let mut registry = self.registry();
                registry.forget_singleton(role);
                registry.claim(role, label) == Claim::Granted
            }
        }
    }

    pub fn release_role(&self, role: WindowRole, label: &str) -> bool {
        self.registry().release(role, label)
    }

    /// Bind a window to a note on its first save
    pub fn bind_note(&self, label: &str, note_id: &str) -> bool {
        let bound = self.registry().bind_note(label, note_id);
        if bound {
            log::debug!("Windows: {} now shows note {}", label, note_id);
        }
        bound
    }

    pub fn note_for(&self, label: &str) -> Option<String> {
        self.registry().note_for(label).map(str::to_string)
    }

    /// Current bounds of a window, or the last ones seen if the host lost it
    pub fn bounds_of(&self, label: &str) -> Option<Bounds> {
        self.host
            .bounds(label)
            .or_else(|| self.registry().last_bounds(label))
    }

    /// Remember a window's current geometry (after a move, resize or save)
    pub fn record_bounds(&self, label: &str) -> Option<Bounds> {
        let bounds = self.host.bounds(label)?;
        self.registry().record_bounds(label, bounds);
        Some(bounds)
    }

    /// Whether `label` currently holds a singleton role
    pub fn holds_role(&self, role: WindowRole, label: &str) -> bool {
        self.registry().singleton(role) == Some(label)
    }

    pub fn role_of(&self, label: &str) -> Option<WindowRole> {
        self.registry()
            .get(label)
            .map(|e| e.role)
            .or_else(|| WindowRole::from_label(label))
    }

    /// Handle a window closing
    ///
    /// A bound note is marked closed and gets the window's final bounds,
    /// falling back to the last recorded ones once the host has dropped the
    /// window. Held roles are released. Returns true if a note was updated.
    pub fn handle_closed(&self, label: &str) -> bool {
        let live = self.host.bounds(label);
        let Some(closed) = self.registry().unregister(label) else {
            return false;
        };
        let bounds = live.or(closed.last_bounds);

        for role in &closed.released_roles {
            log::info!("Windows: {} role released by {}", role, label);
        }

        let Some(note_id) = closed.note_id else {
            return false;
        };

        let updated = self
            .notes
            .modify(|notes| set_open(notes, &note_id, false, bounds));
        if updated {
            log::info!("Windows: saved geometry of note {} from {}", note_id, label);
        }
        updated
    }

    /// Close every editor showing a note (the note was deleted)
    pub fn close_note_windows(&self, note_id: &str) {
        let labels = {
            let mut registry = self.registry();
            let labels = registry.windows_for_note(note_id);
            // Unregister first so the close event does not write the note back
            for label in &labels {
                registry.unregister(label);
            }
            labels
        };
        for label in labels {
            if let Err(e) = self.host.close(&label) {
                log::warn!("Windows: failed to close {}: {}", label, e);
            }
        }
    }

    /// Close every window of a role
    pub fn close_role(&self, role: WindowRole) {
        let labels = self.registry().labels_with_role(role);
        for label in labels {
            if let Err(e) = self.host.close(&label) {
                log::warn!("Windows: failed to close {}: {}", label, e);
            }
            self.registry().unregister(&label);
        }
    }

    /// Number of tracked windows
    pub fn count(&self) -> usize {
        self.registry().len()
    }
}

fn set_open(notes: &mut [Note], note_id: &str, open: bool, bounds: Option<Bounds>) -> bool {
    let Some(note) = notes.iter_mut().find(|n| n.id == note_id) else {
        return false;
    };
    note.is_open = open;
    if let Some(bounds) = bounds {
        note.set_bounds(bounds);
    }
    true
}
