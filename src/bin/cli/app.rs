use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use ghost_notes_lib::config::{CloudSettings, ConfigStore};
use ghost_notes_lib::notes::{Note, NoteStore};
use ghost_notes_lib::storage::default_data_dir;

/// Shared state for CLI commands
pub struct App {
    pub data_dir: PathBuf,
    pub config: Arc<ConfigStore>,
    pub notes: NoteStore,
}

impl App {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir().context("Failed to get data directory")?,
        };

        let config = Arc::new(ConfigStore::new(data_dir.clone()));
        let notes = NoteStore::new(data_dir.clone(), Arc::clone(&config));

        Ok(Self {
            data_dir,
            config,
            notes,
        })
    }

    pub fn cloud_settings(&self) -> CloudSettings {
        CloudSettings::load(&self.data_dir)
    }

    pub fn load_notes(&self) -> Result<Vec<Note>> {
        self.notes
            .try_load()
            .with_context(|| format!("Failed to read {}", self.notes.notes_path().display()))
    }

    /// Find a note by id, or by a unique id prefix
    pub fn find_note(&self, id: &str) -> Result<Note> {
        let notes = self.load_notes()?;

        if let Some(note) = notes.iter().find(|n| n.id == id) {
            return Ok(note.clone());
        }

        let matches: Vec<&Note> = notes.iter().filter(|n| n.id.starts_with(id)).collect();
        match matches.len() {
            0 => bail!("No note with id '{}'", id),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous id '{}'. Matches:\n{}",
                id,
                matches
                    .iter()
                    .map(|n| format!("  - {}", n.id))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }
}
