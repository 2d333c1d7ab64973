//! The orchestrator behind every inter-window channel.
//!
//! Windows never touch the stores directly; each request lands on one of
//! the methods here, which mutate through the stores, kick the sync
//! coordinator and fan the result out to every window.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Handle;

use crate::auth::{AuthError, LoginFlow};
use crate::broadcast::UpdateBroadcaster;
use crate::config::{AppConfig, CloudSettings, ConfigStore, ConfigUpdate};
use crate::notes::{Note, NoteStore, NoteUpdate};
use crate::sync::{CloudClient, DisabledRemote, MergeReport, RemoteNotes, SyncCoordinator};
use crate::windows::{Opened, WindowError, WindowHost, WindowManager, WindowRole};

#[derive(Error, Debug)]
pub enum InitError {
    #[error("Sign-in client: {0}")]
    Auth(#[from] AuthError),
}

pub struct App {
    config: Arc<ConfigStore>,
    notes: Arc<NoteStore>,
    windows: WindowManager,
    broadcaster: Arc<UpdateBroadcaster>,
    sync: SyncCoordinator,
    login: LoginFlow,
    host: Arc<dyn WindowHost>,
    login_in_progress: AtomicBool,
}

impl App {
    /// Build the app against the configured backend
    ///
    /// An unusable backend URL leaves sync disabled rather than failing startup.
    pub fn new(
        data_dir: PathBuf,
        settings: CloudSettings,
        host: Arc<dyn WindowHost>,
        runtime: Handle,
    ) -> Result<Self, InitError> {
        let remote: Arc<dyn RemoteNotes> = match CloudClient::new(&settings.api_base) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                log::error!(
                    "Sync: disabled, cannot use backend {:?}: {}",
                    settings.api_base,
                    e
                );
                Arc::new(DisabledRemote::new(settings.api_base.clone()))
            }
        };
        Self::with_remote(data_dir, settings, host, remote, runtime)
    }

    pub fn with_remote(
        data_dir: PathBuf,
        settings: CloudSettings,
        host: Arc<dyn WindowHost>,
        remote: Arc<dyn RemoteNotes>,
        runtime: Handle,
    ) -> Result<Self, InitError> {
        let config = Arc::new(ConfigStore::new(data_dir.clone()));
        let notes = Arc::new(NoteStore::new(data_dir, Arc::clone(&config)));
        let broadcaster = Arc::new(UpdateBroadcaster::new(
            Arc::clone(&host),
            Arc::clone(&notes),
        ));
        let sync = SyncCoordinator::new(
            remote,
            Arc::clone(&config),
            Arc::clone(&notes),
            Arc::clone(&broadcaster),
            runtime,
        );

        Ok(Self {
            windows: WindowManager::new(Arc::clone(&host), Arc::clone(&notes)),
            login: LoginFlow::new(settings)?,
            config,
            notes,
            broadcaster,
            sync,
            host,
            login_in_progress: AtomicBool::new(false),
        })
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.load().is_authenticated()
    }

    /// Open the startup windows
    ///
    /// Onboarding until it has been completed, then one editor per note
    /// that was open at shutdown (or a blank one).
    pub fn restore_windows(&self) {
        if !self.config.load().onboarding_complete {
            log_open(self.windows.open(WindowRole::Onboarding));
            return;
        }

        let open_ids: Vec<String> = self
            .notes
            .load()
            .into_iter()
            .filter(|n| n.is_open)
            .map(|n| n.id)
            .collect();

        if open_ids.is_empty() {
            log_open(self.windows.open_editor(None));
            return;
        }

        log::info!("App: restoring {} note windows", open_ids.len());
        for id in open_ids {
            log_open(self.windows.open_editor(Some(&id)));
        }
    }

    /// Pull once at startup if signed in
    pub async fn pull_on_start(&self) -> Option<MergeReport> {
        if !self.is_authenticated() {
            return None;
        }
        match self.sync.pull_and_merge().await {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("Sync: startup pull failed: {}", e);
                None
            }
        }
    }

    // ===== Channels =====

    pub fn get_notes(&self) -> Vec<Note> {
        self.notes.load()
    }

    /// Save from a window
    ///
    /// The first save from an editor binds it to the note; the editor's
    /// current bounds ride along unless the update carries geometry.
    /// An editor showing the list in place is not bound.
    pub fn save_note(&self, label: Option<&str>, mut update: NoteUpdate) -> Note {
        if let Some(label) = label {
            let is_editor =
                self.windows.role_of(label).unwrap_or(WindowRole::Editor) == WindowRole::Editor;
            if is_editor && !self.windows.holds_role(WindowRole::List, label) {
                self.windows.bind_note(label, &update.id);
            }
            if self.windows.note_for(label).as_deref() == Some(update.id.as_str()) {
                let bounds = self
                    .windows
                    .record_bounds(label)
                    .or_else(|| self.windows.bounds_of(label));
                if let (Some(bounds), None) = (bounds, update.x) {
                    update = update.with_bounds(bounds);
                }
            }
        }

        let note = self.notes.upsert(update);
        self.sync.schedule_sync(&note);
        self.broadcaster.notify_notes_changed();
        note
    }

    /// Delete locally and remotely, and close its editors
    pub fn delete_note(&self, id: &str) -> bool {
        let removed = self.notes.remove(id);
        self.sync.delete_remote(id);
        self.windows.close_note_windows(id);
        self.broadcaster.notify_notes_changed();
        if removed {
            log::info!("App: deleted note {}", id);
        }
        removed
    }

    pub fn request_list_role(&self, label: &str) -> bool {
        self.windows.request_role(WindowRole::List, label)
    }

    pub fn release_list_role(&self, label: &str) -> bool {
        self.windows.release_role(WindowRole::List, label)
    }

    /// Config as windows see it (no token)
    pub fn get_config(&self) -> AppConfig {
        self.config.load().redacted()
    }

    /// Apply a partial config update and tell every window
    ///
    /// A change of user switches the notes file, so notes are re-broadcast.
    pub fn save_config(&self, update: ConfigUpdate) -> AppConfig {
        let previous_user = self.config.load().user_id().map(str::to_string);
        let config = self.config.update(update);
        self.broadcaster.notify_config_changed(&config);
        if config.user_id() != previous_user.as_deref() {
            log::info!("App: user changed, reloading notes");
            self.broadcaster.notify_notes_changed();
        }
        config.redacted()
    }

    pub fn open_note(&self, id: &str) -> Result<Opened, WindowError> {
        self.windows.open_editor(Some(id))
    }

    pub fn open_list(&self) -> Result<Opened, WindowError> {
        self.windows.open(WindowRole::List)
    }

    pub fn open_settings(&self) -> Result<Opened, WindowError> {
        self.windows.open(WindowRole::Settings)
    }

    pub fn open_onboarding(&self) -> Result<Opened, WindowError> {
        self.windows.open(WindowRole::Onboarding)
    }

    pub fn create_editor_window(&self) -> Result<Opened, WindowError> {
        self.windows.open_editor(None)
    }

    /// Finish onboarding: close its windows and start with a blank note
    pub fn complete_onboarding(&self) -> Result<Opened, WindowError> {
        let config = self.config.update(ConfigUpdate {
            onboarding_complete: Some(true),
            ..Default::default()
        });
        self.broadcaster.notify_config_changed(&config);
        self.windows.close_role(WindowRole::Onboarding);
        self.windows.open_editor(None)
    }

    /// Interactive sign-in; the only channel that reports failure
    pub async fn login(&self) -> Result<AppConfig, AuthError> {
        let _guard = LoginGuard::acquire(&self.login_in_progress)?;

        let host = Arc::clone(&self.host);
        let session = self
            .login
            .run(move |url: &str| host.open_external(url))
            .await
            .inspect_err(|e| log::warn!("Auth: sign-in failed: {}", e))?;

        let config = self
            .config
            .update(ConfigUpdate::sign_in(session.user, session.token));
        self.broadcaster.notify_config_changed(&config);
        self.broadcaster.notify_notes_changed();

        if let Err(e) = self.sync.pull_and_merge().await {
            log::warn!("Sync: pull after sign-in failed: {}", e);
        }
        Ok(config.redacted())
    }

    /// A window moved or was resized; keep its geometry for the close path
    pub fn handle_window_moved(&self, label: &str) {
        self.windows.record_bounds(label);
    }

    /// A window is closing or was destroyed
    pub fn handle_window_closed(&self, label: &str) {
        if self.windows.handle_closed(label) {
            self.broadcaster.notify_notes_changed();
        }
    }
}

struct LoginGuard<'a>(&'a AtomicBool);

impl<'a> LoginGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AuthError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AuthError::InProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn log_open(result: Result<Opened, WindowError>) {
    if let Err(e) = result {
        log::error!("Windows: failed to open window: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{CONFIG_UPDATED, NOTES_UPDATED};
    use crate::config::UserProfile;
    use crate::notes::{Bounds, NoteColor};
    use crate::sync::{PushNote, RemoteNote, SyncError, SYNC_QUIET_PERIOD};
    use crate::testing::{FakeHost, FakeRemote};
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        app: App,
        host: Arc<FakeHost>,
        remote: Arc<FakeRemote>,
        _temp: TempDir,
    }

    fn fixture(remote: FakeRemote) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let host = Arc::new(FakeHost::default());
        let remote = Arc::new(remote);
        let app = App::with_remote(
            temp_dir.path().to_path_buf(),
            CloudSettings::default(),
            host.clone(),
            remote.clone(),
            Handle::current(),
        )
        .unwrap();
        Fixture {
            app,
            host,
            remote,
            _temp: temp_dir,
        }
    }

    fn user(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            email: None,
            name: None,
            picture: None,
        }
    }

    #[tokio::test]
    async fn test_create_save_delete_round() {
        let f = fixture(FakeRemote::default());

        let saved = f.app.save_note(
            None,
            NoteUpdate::new("abc")
                .with_content("hello")
                .with_color(NoteColor::Green),
        );
        assert_eq!(saved.created_at, saved.updated_at);

        let notes = f.app.get_notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "hello");
        assert_eq!(notes[0].color, NoteColor::Green);
        assert!(notes[0].is_open);
        assert_eq!(notes[0].created_at, notes[0].updated_at);

        assert!(f.app.delete_note("abc"));
        assert!(f.app.get_notes().is_empty());
    }

    #[tokio::test]
    async fn test_first_save_binds_editor_and_captures_bounds() {
        let f = fixture(FakeRemote::default());
        let label = f.app.create_editor_window().unwrap().label().to_string();
        let bounds = Bounds {
            x: 10.0,
            y: 20.0,
            width: 320.0,
            height: 240.0,
        };
        f.host.set_bounds(&label, bounds);

        f.app
            .save_note(Some(&label), NoteUpdate::new("n1").with_content("draft"));

        assert_eq!(f.app.windows().note_for(&label).as_deref(), Some("n1"));
        assert_eq!(f.app.notes().get("n1").unwrap().bounds(), Some(bounds));
        assert_eq!(f.host.events_named(NOTES_UPDATED).len(), 1);
    }

    #[tokio::test]
    async fn test_save_from_list_does_not_bind() {
        let f = fixture(FakeRemote::default());
        f.app.open_list().unwrap();

        f.app.save_note(Some("list"), NoteUpdate::new("n1"));
        assert!(f.app.windows().note_for("list").is_none());
        assert!(f.app.notes().get("n1").unwrap().bounds().is_none());
    }

    #[tokio::test]
    async fn test_close_after_save_persists_geometry() {
        let f = fixture(FakeRemote::default());
        let label = f.app.create_editor_window().unwrap().label().to_string();
        f.app.save_note(Some(&label), NoteUpdate::new("n1"));

        let moved = Bounds {
            x: 300.0,
            y: 40.0,
            width: 280.0,
            height: 200.0,
        };
        f.host.set_bounds(&label, moved);
        f.app.handle_window_moved(&label);
        // The host drops the window before the close notification arrives
        f.host.close(&label).unwrap();
        f.app.handle_window_closed(&label);

        let note = f.app.notes().get("n1").unwrap();
        assert!(!note.is_open);
        assert_eq!(note.bounds(), Some(moved));
    }

    #[tokio::test]
    async fn test_save_from_editor_showing_list_does_not_bind() {
        let f = fixture(FakeRemote::default());
        f.app.save_note(None, NoteUpdate::new("n1"));
        let label = f.app.create_editor_window().unwrap().label().to_string();
        assert!(f.app.request_list_role(&label));

        f.app
            .save_note(Some(&label), NoteUpdate::new("n1").with_content("from list"));
        assert!(f.app.windows().note_for(&label).is_none());

        f.host.close(&label).unwrap();
        f.app.handle_window_closed(&label);
        let note = f.app.notes().get("n1").unwrap();
        assert!(note.is_open);
        assert!(note.bounds().is_none());
    }

    #[tokio::test]
    async fn test_invalid_api_base_disables_sync() {
        let temp_dir = TempDir::new().unwrap();
        let settings = CloudSettings {
            api_base: "notes.example.com/api".to_string(),
            ..CloudSettings::default()
        };
        let app = App::new(
            temp_dir.path().to_path_buf(),
            settings,
            Arc::new(FakeHost::default()),
            Handle::current(),
        )
        .unwrap();

        app.save_config(ConfigUpdate::sign_in(user("u1"), "tok".to_string()));
        assert!(matches!(
            app.sync().pull_and_merge().await,
            Err(SyncError::InvalidUrl(_))
        ));
        // Local notes keep working
        app.save_note(None, NoteUpdate::new("local"));
        assert_eq!(app.get_notes().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_closes_bound_editors() {
        let f = fixture(FakeRemote::default());
        f.app.save_note(None, NoteUpdate::new("n1"));
        let label = f.app.open_note("n1").unwrap().label().to_string();

        f.app.delete_note("n1");

        assert!(f.host.closed().contains(&label));
        f.app.handle_window_closed(&label);
        assert!(f.app.notes().get("n1").is_none());
    }

    #[tokio::test]
    async fn test_restore_opens_onboarding_first() {
        let f = fixture(FakeRemote::default());
        f.app.restore_windows();

        let created = f.host.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].role, WindowRole::Onboarding);
    }

    #[tokio::test]
    async fn test_restore_reopens_open_notes() {
        let f = fixture(FakeRemote::default());
        f.app.save_config(ConfigUpdate {
            onboarding_complete: Some(true),
            ..Default::default()
        });
        f.app.save_note(None, NoteUpdate::new("a"));
        f.app.save_note(None, NoteUpdate::new("b"));
        f.app.notes().modify(|notes| {
            notes.iter_mut().filter(|n| n.id == "b").for_each(|n| n.is_open = false);
            true
        });

        f.app.restore_windows();

        let created = f.host.created();
        assert_eq!(created.len(), 1);
        assert!(created[0].route.contains("noteId=a"));
    }

    #[tokio::test]
    async fn test_restore_with_no_open_notes_opens_blank_editor() {
        let f = fixture(FakeRemote::default());
        f.app.complete_onboarding().unwrap();
        let before = f.host.created().len();

        f.app.restore_windows();
        let created = f.host.created();
        assert_eq!(created.len(), before + 1);
        assert_eq!(created[before].role, WindowRole::Editor);
    }

    #[tokio::test]
    async fn test_complete_onboarding_swaps_windows() {
        let f = fixture(FakeRemote::default());
        let onboarding = f.app.open_onboarding().unwrap().label().to_string();

        let editor = f.app.complete_onboarding().unwrap();

        assert!(f.app.get_config().onboarding_complete);
        assert!(f.host.closed().contains(&onboarding));
        assert!(f.host.is_alive(editor.label()));
    }

    #[tokio::test]
    async fn test_config_broadcast_is_redacted() {
        let f = fixture(FakeRemote::default());
        f.app.create_editor_window().unwrap();

        let returned = f.app.save_config(ConfigUpdate::sign_in(user("u1"), "secret".to_string()));

        assert!(returned.auth_token.is_none());
        let events = f.host.events_named(CONFIG_UPDATED);
        assert_eq!(events.len(), 1);
        assert!(events[0].1["authToken"].is_null());
        // New user, new notes file
        assert_eq!(f.host.events_named(NOTES_UPDATED).len(), 1);
        assert!(f.app.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_switches_notes_file() {
        let f = fixture(FakeRemote::default());
        f.app.save_note(None, NoteUpdate::new("anon"));

        f.app.save_config(ConfigUpdate::sign_in(user("u1"), "tok".to_string()));
        assert!(f.app.get_notes().is_empty());

        f.app.save_config(ConfigUpdate::sign_out());
        assert_eq!(f.app.get_notes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signed_in_save_and_delete_reach_remote() {
        let f = fixture(FakeRemote::default());
        f.app.save_config(ConfigUpdate::sign_in(user("u1"), "tok".to_string()));

        f.app.save_note(None, NoteUpdate::new("keep").with_content("v1"));
        f.app.save_note(None, NoteUpdate::new("keep").with_content("v2"));
        tokio::time::sleep(SYNC_QUIET_PERIOD + Duration::from_millis(100)).await;

        f.app.save_note(None, NoteUpdate::new("drop"));
        f.app.delete_note("drop");
        tokio::time::sleep(SYNC_QUIET_PERIOD + Duration::from_millis(100)).await;

        let pushes = f.remote.pushes();
        assert_eq!(pushes.len(), 2);
        assert_eq!(pushes[0].1[0].content.as_deref(), Some("v2"));
        assert_eq!(pushes[1].1, vec![PushNote::tombstone("drop")]);
    }

    #[tokio::test]
    async fn test_pull_on_start_only_when_signed_in() {
        let remote = FakeRemote::with_notes(vec![RemoteNote {
            id: "cloud".to_string(),
            content: Some("hi".to_string()),
            color: None,
            created_at: None,
            updated_at: Some(Utc::now()),
            is_deleted: None,
        }]);
        let f = fixture(remote);
        assert!(f.app.pull_on_start().await.is_none());

        f.app.save_config(ConfigUpdate::sign_in(user("u1"), "tok".to_string()));
        let report = f.app.pull_on_start().await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(f.app.get_notes()[0].id, "cloud");
    }

    #[tokio::test]
    async fn test_login_unconfigured_reports_error() {
        let f = fixture(FakeRemote::default());
        let result = f.app.login().await;
        assert!(matches!(result, Err(AuthError::NotConfigured)));
        // The guard was released
        assert!(matches!(f.app.login().await, Err(AuthError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_list_role_round_trip() {
        let f = fixture(FakeRemote::default());
        let a = f.app.create_editor_window().unwrap().label().to_string();
        let b = f.app.create_editor_window().unwrap().label().to_string();

        assert!(f.app.request_list_role(&a));
        assert!(!f.app.request_list_role(&b));
        assert!(f.app.release_list_role(&a));
        assert!(f.app.request_list_role(&b));
    }
}
