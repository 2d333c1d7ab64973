use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use super::client::{RemoteNotes, SyncError};
use super::debounce::Debouncer;
use super::merge::{merge_remote, MergeReport};
use super::models::PushNote;
use crate::broadcast::UpdateBroadcaster;
use crate::config::ConfigStore;
use crate::notes::{Note, NoteStore};

/// Quiet period before a note's changes are pushed
pub const SYNC_QUIET_PERIOD: Duration = Duration::from_millis(2000);

/// Best-effort mirroring of the local notes to the backend
///
/// Pushes and tombstones are log-and-drop: nothing is retried, the next
/// save of the same note reschedules naturally.
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteNotes>,
    config: Arc<ConfigStore>,
    notes: Arc<NoteStore>,
    broadcaster: Arc<UpdateBroadcaster>,
    debouncer: Debouncer,
    runtime: Handle,
}

impl SyncCoordinator {
    pub fn new(
        remote: Arc<dyn RemoteNotes>,
        config: Arc<ConfigStore>,
        notes: Arc<NoteStore>,
        broadcaster: Arc<UpdateBroadcaster>,
        runtime: Handle,
    ) -> Self {
        Self {
            remote,
            config,
            notes,
            broadcaster,
            debouncer: Debouncer::new(SYNC_QUIET_PERIOD, runtime.clone()),
            runtime,
        }
    }

    /// Push `note` once it has been quiet for [`SYNC_QUIET_PERIOD`]
    ///
    /// Does nothing when signed out. A later call for the same id replaces
    /// the pending push, so only the last state goes out.
    pub fn schedule_sync(&self, note: &Note) {
        if !self.config.load().is_authenticated() {
            return;
        }

        let remote = Arc::clone(&self.remote);
        let config = Arc::clone(&self.config);
        let payload = PushNote::from(note);
        let note_id = note.id.clone();

        self.debouncer.schedule(&note.id, async move {
            // The user may have signed out while the timer was running
            let Some(token) = config.load().auth_token else {
                log::debug!("Sync: signed out, dropping push of {}", note_id);
                return;
            };
            match remote.push(&token, vec![payload]).await {
                Ok(()) => log::debug!("Sync: pushed note {}", note_id),
                Err(e) => log::warn!("Sync: push of note {} failed: {}", note_id, e),
            }
        });
    }

    /// Tell the backend a note is gone, right away
    pub fn delete_remote(&self, note_id: &str) {
        if self.debouncer.cancel(note_id) {
            log::debug!("Sync: dropped pending push of deleted note {}", note_id);
        }
        if !self.config.load().is_authenticated() {
            return;
        }

        let remote = Arc::clone(&self.remote);
        let config = Arc::clone(&self.config);
        let note_id = note_id.to_string();
        self.runtime.spawn(async move {
            if let Err(e) = push_tombstone(remote.as_ref(), &config, &note_id).await {
                log::warn!("Sync: tombstone for {} failed: {}", note_id, e);
            }
        });
    }

    pub fn has_pending(&self, note_id: &str) -> bool {
        self.debouncer.is_pending(note_id)
    }

    /// Fetch every remote note and merge it into the local store
    ///
    /// Broadcasts `notes-updated` if anything changed. The merge is dropped
    /// if the signed-in user changed while the fetch was in flight.
    pub async fn pull_and_merge(&self) -> Result<MergeReport, SyncError> {
        let config = self.config.load();
        let (Some(token), Some(user_id)) = (config.auth_token.clone(), config.user_id()) else {
            return Err(SyncError::NotAuthenticated);
        };
        let user_id = user_id.to_string();

        let remote_notes = self.remote.fetch(&token).await?;
        log::info!("Sync: fetched {} remote notes", remote_notes.len());

        if self.config.load().user_id() != Some(user_id.as_str()) {
            log::info!("Sync: user changed during pull, discarding result");
            return Ok(MergeReport::default());
        }

        let mut report = MergeReport::default();
        self.notes.modify(|local| {
            report = merge_remote(local, remote_notes);
            report.changed()
        });

        if report.changed() {
            log::info!(
                "Sync: merged ({} inserted, {} updated, {} removed)",
                report.inserted,
                report.updated,
                report.removed
            );
            self.broadcaster.notify_notes_changed();
        }
        Ok(report)
    }
}

/// Push a tombstone for `note_id` with the current token
pub async fn push_tombstone(
    remote: &dyn RemoteNotes,
    config: &ConfigStore,
    note_id: &str,
) -> Result<(), SyncError> {
    let token = config.load().auth_token.ok_or(SyncError::NotAuthenticated)?;
    remote
        .push(&token, vec![PushNote::tombstone(note_id)])
        .await?;
    log::debug!("Sync: pushed tombstone for {}", note_id);
    Ok(())
}
