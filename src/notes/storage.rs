use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::models::{Note, NoteUpdate};
use crate::config::ConfigStore;
use crate::storage::{backup_corrupt, read_json, write_json_atomic, Result, StorageError};

/// Storage for the note collection (one JSON array per user)
///
/// The target file follows the signed-in user, so it is resolved from the
/// config on every operation rather than cached.
pub struct NoteStore {
    data_dir: PathBuf,
    config: Arc<ConfigStore>,
    /// Serializes read-modify-write cycles across windows
    write_lock: Mutex<()>,
}

impl NoteStore {
    pub fn new(data_dir: PathBuf, config: Arc<ConfigStore>) -> Self {
        Self {
            data_dir,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the notes file for the currently configured user
    pub fn notes_path(&self) -> PathBuf {
        match self.config.load().user_id() {
            Some(user_id) => self
                .data_dir
                .join(format!("notes_{}.json", sanitize_file_component(user_id))),
            None => self.data_dir.join("notes.json"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn try_load(&self) -> Result<Vec<Note>> {
        Ok(read_json(&self.notes_path())?.unwrap_or_default())
    }

    pub fn try_save(&self, notes: &[Note]) -> Result<()> {
        write_json_atomic(&self.notes_path(), notes)
    }

    /// Load all notes; a missing or unreadable file counts as no notes
    pub fn load(&self) -> Vec<Note> {
        match self.try_load() {
            Ok(notes) => notes,
            Err(e) => {
                log::error!("Notes: failed to read {:?}: {}", self.notes_path(), e);
                Vec::new()
            }
        }
    }

    /// Overwrite the whole collection (best effort)
    pub fn save(&self, notes: &[Note]) {
        if let Err(e) = self.try_save(notes) {
            log::error!("Notes: failed to write {:?}: {}", self.notes_path(), e);
        }
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.load().into_iter().find(|n| n.id == id)
    }

    /// Load for a read-modify-write
    ///
    /// An unparseable file is backed up first so the rewrite cannot destroy
    /// it. `None` means the file must not be written (read failed, or the
    /// backup did).
    fn load_for_update(&self) -> Option<Vec<Note>> {
        let path = self.notes_path();
        match self.try_load() {
            Ok(notes) => Some(notes),
            Err(StorageError::Json(e)) => match backup_corrupt(&path) {
                Ok(backup) => {
                    log::error!(
                        "Notes: {:?} is unreadable ({}), moved a copy to {:?}",
                        path,
                        e,
                        backup
                    );
                    Some(Vec::new())
                }
                Err(backup_err) => {
                    log::error!(
                        "Notes: {:?} is unreadable ({}) and could not be backed up ({}), not writing",
                        path,
                        e,
                        backup_err
                    );
                    None
                }
            },
            Err(e) => {
                log::error!("Notes: failed to read {:?}, not writing: {}", path, e);
                None
            }
        }
    }

    /// Insert or merge a note and mark it open
    ///
    /// New notes go to the front of the collection. `updatedAt` never moves
    /// backwards, even if the clock does.
    pub fn upsert(&self, update: NoteUpdate) -> Note {
        let _guard = self.lock();
        let now = Utc::now();
        let Some(mut notes) = self.load_for_update() else {
            return Note::from_update(update, now);
        };

        let stored = match notes.iter_mut().find(|n| n.id == update.id) {
            Some(existing) => {
                existing.apply(update);
                existing.updated_at = now.max(existing.updated_at);
                existing.is_open = true;
                existing.clone()
            }
            None => {
                let note = Note::from_update(update, now);
                notes.insert(0, note.clone());
                note
            }
        };

        self.save(&notes);
        stored
    }

    /// Remove a note by id. Returns true if a note was removed.
    pub fn remove(&self, id: &str) -> bool {
        let _guard = self.lock();
        let Some(mut notes) = self.load_for_update() else {
            return false;
        };
        let before = notes.len();
        notes.retain(|n| n.id != id);
        let removed = notes.len() != before;
        self.save(&notes);
        removed
    }

    /// Read-modify-write under the store lock
    ///
    /// The closure returns whether it changed anything; the file is only
    /// rewritten when it did.
    pub fn modify<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Vec<Note>) -> bool,
    {
        let _guard = self.lock();
        let Some(mut notes) = self.load_for_update() else {
            return false;
        };
        let changed = f(&mut notes);
        if changed {
            self.save(&notes);
        }
        changed
    }
}

/// Keep user ids from escaping the data directory
fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
