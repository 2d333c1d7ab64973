mod client;
mod coordinator;
mod debounce;
mod merge;
mod models;

pub use client::{CloudClient, DisabledRemote, RemoteNotes, SyncError};
pub use coordinator::{push_tombstone, SyncCoordinator, SYNC_QUIET_PERIOD};
pub use debounce::Debouncer;
pub use merge::{merge_remote, MergeReport};
pub use models::*;
