//! In-memory window host and remote used by unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::notes::Bounds;
use crate::sync::{PushNote, RemoteNote, RemoteNotes, SyncError};
use crate::windows::{WindowError, WindowHost, WindowSpec};

#[derive(Default)]
struct HostState {
    windows: HashMap<String, Bounds>,
    created: Vec<WindowSpec>,
    focused: Vec<String>,
    closed: Vec<String>,
    capture_excluded: Vec<String>,
    events: Vec<(String, String, Value)>,
    rejecting: HashSet<String>,
    fail_capture: bool,
    fail_create: bool,
    create_delay: Option<Duration>,
}

/// Records every call; windows live until closed or killed
#[derive(Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    pub fn created(&self) -> Vec<WindowSpec> {
        self.state().created.clone()
    }

    pub fn focused(&self) -> Vec<String> {
        self.state().focused.clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.state().closed.clone()
    }

    pub fn capture_excluded(&self) -> Vec<String> {
        self.state().capture_excluded.clone()
    }

    /// Events with the given name as (label, payload)
    pub fn events_named(&self, event: &str) -> Vec<(String, Value)> {
        self.state()
            .events
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(label, _, payload)| (label.clone(), payload.clone()))
            .collect()
    }

    pub fn set_bounds(&self, label: &str, bounds: Bounds) {
        self.state().windows.insert(label.to_string(), bounds);
    }

    /// Make a window disappear without any close event
    pub fn kill(&self, label: &str) {
        self.state().windows.remove(label);
    }

    /// Simulate a window mid-teardown that no longer accepts events
    pub fn reject_events_for(&self, label: &str) {
        self.state().rejecting.insert(label.to_string());
    }

    pub fn fail_capture_exclusion(&self) {
        self.state().fail_capture = true;
    }

    pub fn fail_next_create(&self) {
        self.state().fail_create = true;
    }

    /// Window creation takes this long, like a real webview being built
    pub fn delay_create(&self, delay: Duration) {
        self.state().create_delay = Some(delay);
    }
}

impl WindowHost for FakeHost {
    fn create(&self, spec: &WindowSpec) -> Result<(), WindowError> {
        let delay = self.state().create_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let mut state = self.state();
        if std::mem::take(&mut state.fail_create) {
            return Err(WindowError::Host("webview failed".to_string()));
        }
        if state.windows.contains_key(&spec.label) {
            return Err(WindowError::Host(format!("label {} in use", spec.label)));
        }
        let (width, height) = spec.size();
        let bounds = spec.bounds.unwrap_or(Bounds {
            x: 100.0,
            y: 100.0,
            width,
            height,
        });
        state.windows.insert(spec.label.clone(), bounds);
        state.created.push(spec.clone());
        Ok(())
    }

    fn focus(&self, label: &str) -> Result<(), WindowError> {
        let mut state = self.state();
        if !state.windows.contains_key(label) {
            return Err(WindowError::NotFound(label.to_string()));
        }
        state.focused.push(label.to_string());
        Ok(())
    }

    fn close(&self, label: &str) -> Result<(), WindowError> {
        let mut state = self.state();
        state.windows.remove(label);
        state.closed.push(label.to_string());
        Ok(())
    }

    fn is_alive(&self, label: &str) -> bool {
        self.state().windows.contains_key(label)
    }

    fn bounds(&self, label: &str) -> Option<Bounds> {
        self.state().windows.get(label).copied()
    }

    fn exclude_from_capture(&self, label: &str) -> Result<(), WindowError> {
        let mut state = self.state();
        if state.fail_capture {
            return Err(WindowError::Unsupported("exclude_from_capture"));
        }
        state.capture_excluded.push(label.to_string());
        Ok(())
    }

    fn live_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.state().windows.keys().cloned().collect();
        labels.sort();
        labels
    }

    fn emit_to(&self, label: &str, event: &str, payload: Value) -> Result<(), WindowError> {
        let mut state = self.state();
        if !state.windows.contains_key(label) || state.rejecting.contains(label) {
            return Err(WindowError::NotFound(label.to_string()));
        }
        state
            .events
            .push((label.to_string(), event.to_string(), payload));
        Ok(())
    }

    fn open_external(&self, _url: &str) -> Result<(), WindowError> {
        Ok(())
    }
}

/// Remote that records pushes and serves a fixed fetch set
#[derive(Default)]
pub struct FakeRemote {
    pushes: Mutex<Vec<(String, Vec<PushNote>)>>,
    remote_notes: Mutex<Vec<RemoteNote>>,
    offline: AtomicBool,
}

impl FakeRemote {
    pub fn with_notes(notes: Vec<RemoteNote>) -> Self {
        let remote = Self::default();
        *remote.remote_notes.lock().unwrap() = notes;
        remote
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Pushes as (token, notes)
    pub fn pushes(&self) -> Vec<(String, Vec<PushNote>)> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteNotes for FakeRemote {
    async fn push(&self, token: &str, notes: Vec<PushNote>) -> Result<(), SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Server {
                status: 503,
                message: "offline".to_string(),
            });
        }
        self.pushes.lock().unwrap().push((token.to_string(), notes));
        Ok(())
    }

    async fn fetch(&self, _token: &str) -> Result<Vec<RemoteNote>, SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::Server {
                status: 503,
                message: "offline".to_string(),
            });
        }
        Ok(self.remote_notes.lock().unwrap().clone())
    }
}
