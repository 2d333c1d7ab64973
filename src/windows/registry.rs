use std::collections::HashMap;

use super::role::WindowRole;
use crate::notes::Bounds;

/// A tracked window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry {
    pub role: WindowRole,
    /// Note shown by an editor window, bound at open or on first save
    pub note_id: Option<String>,
    /// Last geometry seen for the window, kept for when the host has dropped it
    pub last_bounds: Option<Bounds>,
    /// Reserved while the host is still building the window
    pub pending: bool,
}

impl WindowEntry {
    fn new(role: WindowRole, note_id: Option<String>) -> Self {
        Self {
            role,
            note_id,
            last_bounds: None,
            pending: false,
        }
    }
}

/// What a window held when it was unregistered
#[derive(Debug, Clone, PartialEq)]
pub struct Unregistered {
    pub role: WindowRole,
    pub note_id: Option<String>,
    pub last_bounds: Option<Bounds>,
    pub released_roles: Vec<WindowRole>,
}

/// Outcome of claiming a singleton role
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    Granted,
    /// Another window already holds the role
    HeldBy(String),
}

/// Live windows by label, singleton role holders, and note bindings
///
/// Owned by the window manager; every open, save and close goes through it.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<String, WindowEntry>,
    singletons: HashMap<WindowRole, String>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly created window. Singleton roles are claimed for it.
    pub fn register(&mut self, label: &str, role: WindowRole, note_id: Option<String>) {
        self.windows
            .insert(label.to_string(), WindowEntry::new(role, note_id));
        if role.is_singleton() {
            self.singletons.insert(role, label.to_string());
        }
    }

    /// Track a window the host has not built yet
    ///
    /// Singleton roles are claimed immediately so a concurrent open finds
    /// the holder. Follow with `confirm`, or `unregister` if creation fails.
    pub fn reserve(&mut self, label: &str, role: WindowRole, note_id: Option<String>) {
        self.register(label, role, note_id);
        if let Some(entry) = self.windows.get_mut(label) {
            entry.pending = true;
        }
    }

    /// Mark a reserved window as built, with its initial geometry
    pub fn confirm(&mut self, label: &str, bounds: Option<Bounds>) {
        if let Some(entry) = self.windows.get_mut(label) {
            entry.pending = false;
            if bounds.is_some() {
                entry.last_bounds = bounds;
            }
        }
    }

    pub fn is_pending(&self, label: &str) -> bool {
        self.windows.get(label).is_some_and(|e| e.pending)
    }

    /// Remember a window's latest geometry. Unknown labels are adopted as editors.
    pub fn record_bounds(&mut self, label: &str, bounds: Bounds) {
        self.windows
            .entry(label.to_string())
            .or_insert_with(|| WindowEntry::new(WindowRole::Editor, None))
            .last_bounds = Some(bounds);
    }

    pub fn last_bounds(&self, label: &str) -> Option<Bounds> {
        self.windows.get(label).and_then(|e| e.last_bounds)
    }

    pub fn get(&self, label: &str) -> Option<&WindowEntry> {
        self.windows.get(label)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Label of the window holding a singleton role
    pub fn singleton(&self, role: WindowRole) -> Option<&str> {
        self.singletons.get(&role).map(String::as_str)
    }

    /// Claim a singleton role for an existing window (in-place navigation)
    pub fn claim(&mut self, role: WindowRole, label: &str) -> Claim {
        match self.singletons.get(&role) {
            Some(holder) if holder != label => Claim::HeldBy(holder.clone()),
            _ => {
                self.singletons.insert(role, label.to_string());
                Claim::Granted
            }
        }
    }

    /// Release a singleton role, only if `label` holds it
    pub fn release(&mut self, role: WindowRole, label: &str) -> bool {
        if self.singleton(role) == Some(label) {
            self.singletons.remove(&role);
            true
        } else {
            false
        }
    }

    /// Drop a stale holder whose window no longer exists
    pub fn forget_singleton(&mut self, role: WindowRole) {
        if let Some(label) = self.singletons.remove(&role) {
            if self.windows.get(&label).is_some_and(|e| e.role == role) {
                self.windows.remove(&label);
            }
        }
    }

    /// Bind an editor window to a note if it has no note yet
    ///
    /// Windows the registry has not seen (e.g. opened by the frontend
    /// itself) are adopted as editors. Returns true when a binding was made.
    pub fn bind_note(&mut self, label: &str, note_id: &str) -> bool {
        let entry = self
            .windows
            .entry(label.to_string())
            .or_insert_with(|| WindowEntry::new(WindowRole::Editor, None));
        if entry.note_id.is_some() {
            return false;
        }
        entry.note_id = Some(note_id.to_string());
        true
    }

    pub fn note_for(&self, label: &str) -> Option<&str> {
        self.windows.get(label).and_then(|e| e.note_id.as_deref())
    }

    /// Labels of windows bound to a note
    pub fn windows_for_note(&self, note_id: &str) -> Vec<String> {
        self.windows
            .iter()
            .filter(|(_, e)| e.note_id.as_deref() == Some(note_id))
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Labels of every tracked window of a role
    pub fn labels_with_role(&self, role: WindowRole) -> Vec<String> {
        self.windows
            .iter()
            .filter(|(_, e)| e.role == role)
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Forget a window, its note binding and any roles it held
    pub fn unregister(&mut self, label: &str) -> Option<Unregistered> {
        let mut released_roles: Vec<WindowRole> = self
            .singletons
            .iter()
            .filter(|(_, holder)| holder.as_str() == label)
            .map(|(role, _)| *role)
            .collect();
        released_roles.sort_by_key(|r| r.as_str());
        for role in &released_roles {
            self.singletons.remove(role);
        }

        match self.windows.remove(label) {
            Some(entry) => Some(Unregistered {
                role: entry.role,
                note_id: entry.note_id,
                last_bounds: entry.last_bounds,
                released_roles,
            }),
            // Not tracked as a window, but it may have claimed a role in place
            None if !released_roles.is_empty() => Some(Unregistered {
                role: released_roles[0],
                note_id: None,
                last_bounds: None,
                released_roles,
            }),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_register_and_unregister() {
        let mut registry = WindowRegistry::new();
        registry.register("settings", WindowRole::Settings, None);
        assert_eq!(registry.singleton(WindowRole::Settings), Some("settings"));

        let closed = registry.unregister("settings").unwrap();
        assert_eq!(closed.released_roles, vec![WindowRole::Settings]);
        assert!(registry.singleton(WindowRole::Settings).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_claim_and_release_list_role() {
        let mut registry = WindowRegistry::new();
        registry.register("editor-1", WindowRole::Editor, None);
        registry.register("editor-2", WindowRole::Editor, None);

        assert_eq!(registry.claim(WindowRole::List, "editor-1"), Claim::Granted);
        // Re-claiming by the holder is fine
        assert_eq!(registry.claim(WindowRole::List, "editor-1"), Claim::Granted);
        assert_eq!(
            registry.claim(WindowRole::List, "editor-2"),
            Claim::HeldBy("editor-1".to_string())
        );

        // Only the holder can release
        assert!(!registry.release(WindowRole::List, "editor-2"));
        assert!(registry.release(WindowRole::List, "editor-1"));
        assert_eq!(registry.claim(WindowRole::List, "editor-2"), Claim::Granted);
    }

    #[test]
    fn test_lazy_note_binding() {
        let mut registry = WindowRegistry::new();
        registry.register("editor-1", WindowRole::Editor, None);

        assert!(registry.bind_note("editor-1", "n1"));
        // Binding happens once
        assert!(!registry.bind_note("editor-1", "n2"));
        assert_eq!(registry.note_for("editor-1"), Some("n1"));
        assert_eq!(registry.windows_for_note("n1"), vec!["editor-1".to_string()]);

        let closed = registry.unregister("editor-1").unwrap();
        assert_eq!(closed.note_id.as_deref(), Some("n1"));
        assert!(registry.windows_for_note("n1").is_empty());
    }

    #[test]
    fn test_unknown_window_adopted_on_bind() {
        let mut registry = WindowRegistry::new();
        assert!(registry.bind_note("editor-x", "n1"));
        assert_eq!(registry.get("editor-x").unwrap().role, WindowRole::Editor);
    }

    #[test]
    fn test_unregister_releases_in_place_claim() {
        let mut registry = WindowRegistry::new();
        registry.register("editor-1", WindowRole::Editor, Some("n1".to_string()));
        registry.claim(WindowRole::List, "editor-1");

        let closed = registry.unregister("editor-1").unwrap();
        assert_eq!(closed.role, WindowRole::Editor);
        assert_eq!(closed.released_roles, vec![WindowRole::List]);
        assert!(registry.unregister("editor-1").is_none());
    }

    #[test]
    fn test_last_bounds_survive_until_unregister() {
        let mut registry = WindowRegistry::new();
        registry.register("editor-1", WindowRole::Editor, Some("n1".to_string()));
        let first = Bounds {
            x: 10.0,
            y: 20.0,
            width: 300.0,
            height: 300.0,
        };
        let moved = Bounds { x: 640.0, ..first };
        registry.record_bounds("editor-1", first);
        registry.record_bounds("editor-1", moved);
        assert_eq!(registry.last_bounds("editor-1"), Some(moved));

        let closed = registry.unregister("editor-1").unwrap();
        assert_eq!(closed.last_bounds, Some(moved));
        assert!(registry.last_bounds("editor-1").is_none());
    }

    #[test]
    fn test_reserved_singleton_visible_until_confirmed() {
        let mut registry = WindowRegistry::new();
        registry.reserve("settings", WindowRole::Settings, None);
        assert_eq!(registry.singleton(WindowRole::Settings), Some("settings"));
        assert!(registry.is_pending("settings"));

        registry.confirm("settings", None);
        assert!(!registry.is_pending("settings"));

        // A failed build rolls the reservation back entirely
        registry.reserve("list", WindowRole::List, None);
        registry.unregister("list");
        assert!(registry.singleton(WindowRole::List).is_none());
        assert!(registry.get("list").is_none());
    }
}
