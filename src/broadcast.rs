//! Fan-out of "notes changed" and "config changed" events to every window.
//!
//! Delivery is fire-and-forget: a window that is closing simply misses
//! the message and reloads on its next open.

use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::notes::NoteStore;
use crate::windows::WindowHost;

pub const NOTES_UPDATED: &str = "notes-updated";
pub const CONFIG_UPDATED: &str = "config-updated";

pub struct UpdateBroadcaster {
    host: Arc<dyn WindowHost>,
    notes: Arc<NoteStore>,
}

impl UpdateBroadcaster {
    pub fn new(host: Arc<dyn WindowHost>, notes: Arc<NoteStore>) -> Self {
        Self { host, notes }
    }

    /// Re-read the note collection and push it to every live window
    pub fn notify_notes_changed(&self) -> usize {
        let notes = self.notes.load();
        self.broadcast(NOTES_UPDATED, &notes)
    }

    /// Push the (redacted) config to every live window
    pub fn notify_config_changed(&self, config: &AppConfig) -> usize {
        self.broadcast(CONFIG_UPDATED, &config.redacted())
    }

    /// Returns the number of windows the event was handed to
    fn broadcast<T: Serialize + ?Sized>(&self, event: &str, payload: &T) -> usize {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Broadcast: failed to serialize {}: {}", event, e);
                return 0;
            }
        };

        let mut delivered = 0;
        for label in self.host.live_labels() {
            match self.host.emit_to(&label, event, payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => log::debug!("Broadcast: {} dropped for {}: {}", event, label, e),
            }
        }
        delivered
    }
}
