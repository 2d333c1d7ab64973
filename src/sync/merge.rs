use chrono::Utc;

use super::models::RemoteNote;
use crate::notes::Note;

/// What a pull changed locally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.inserted + self.updated + self.removed > 0
    }
}

/// Reconcile remote records into the local collection, last write wins
///
/// - unknown and live: inserted at the front
/// - unknown and tombstoned: ignored
/// - known and strictly newer: removed if tombstoned, otherwise overwritten
/// - known and not newer: local copy kept
pub fn merge_remote(local: &mut Vec<Note>, remote: Vec<RemoteNote>) -> MergeReport {
    let now = Utc::now();
    let mut report = MergeReport::default();

    for record in remote {
        match local.iter().position(|n| n.id == record.id) {
            None if record.is_deleted() => {}
            None => {
                local.insert(0, record.to_note(now));
                report.inserted += 1;
            }
            Some(index) => {
                if !record.is_newer_than(&local[index]) {
                    continue;
                }
                if record.is_deleted() {
                    local.remove(index);
                    report.removed += 1;
                } else {
                    record.overwrite(&mut local[index]);
                    report.updated += 1;
                }
            }
        }
    }

    report
}
