use notevault_core::{
    AudioCapture, AudioRecorder, FolderDeleteMode, InMemoryStore, KeyValueStore, RecorderError,
    SaveStatus, Session, SessionError, StoreError, StoreResult,
};

/// Recorder with a scripted outcome per call.
struct ScriptedRecorder {
    deny_start: bool,
    capture_url: &'static str,
    started: bool,
}

impl ScriptedRecorder {
    fn granting(capture_url: &'static str) -> Self {
        Self {
            deny_start: false,
            capture_url,
            started: false,
        }
    }

    fn denying() -> Self {
        Self {
            deny_start: true,
            capture_url: "",
            started: false,
        }
    }
}

impl AudioRecorder for ScriptedRecorder {
    fn start(&mut self) -> Result<(), RecorderError> {
        if self.deny_start {
            return Err(RecorderError::DeviceDenied);
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<AudioCapture, RecorderError> {
        if !self.started {
            return Err(RecorderError::CaptureFailed("never started".to_string()));
        }
        self.started = false;
        Ok(AudioCapture {
            url: self.capture_url.to_string(),
        })
    }
}

/// Store whose writes fail while reads keep working.
struct ReadOnlyStore {
    inner: InMemoryStore,
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str, scoped: bool) -> StoreResult<Option<String>> {
        self.inner.get(key, scoped)
    }

    fn set(&self, _key: &str, _value: &str, _scoped: bool) -> StoreResult<()> {
        Err(StoreError::Unavailable("write path down".to_string()))
    }
}

#[test]
fn login_requires_non_blank_credentials() {
    assert!(matches!(
        Session::login(InMemoryStore::new(), "  ", "team"),
        Err(SessionError::MissingCredentials)
    ));
    assert!(matches!(
        Session::login(InMemoryStore::new(), "ann", ""),
        Err(SessionError::MissingCredentials)
    ));

    let session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    assert!(session.is_logged_in());
    assert_eq!(session.username(), "ann");
    assert_eq!(session.vault_id(), "team");
    assert_eq!(session.save_status(), SaveStatus::Idle);
}

#[test]
fn create_note_selects_it_and_projection_tracks_mutations() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();

    let note_id = session.create_note("Plan", None).unwrap();
    assert_eq!(session.selected_note().unwrap().id, note_id);

    session.update_note_content(&note_id, "updated body").unwrap();
    // The projection is re-derived from the vault, never a stale copy.
    assert_eq!(session.selected_note().unwrap().content, "updated body");

    session.add_comment("first!").unwrap();
    let selected = session.selected_note().unwrap();
    assert_eq!(selected.comments.len(), 1);
    assert_eq!(selected.comments[0].author, "ann");
}

#[test]
fn deleting_selected_note_clears_selection() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    let keep = session.create_note("Keep", None).unwrap();
    let doomed = session.create_note("Doomed", None).unwrap();

    session.delete_note(&doomed).unwrap();
    assert!(session.selected_note().is_none());

    session.select_note(&keep).unwrap();
    session.delete_note(&keep).unwrap();
    assert!(session.selected_note().is_none());
}

#[test]
fn select_note_rejects_unknown_id() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    assert!(matches!(
        session.select_note("missing"),
        Err(SessionError::UnknownNote(_))
    ));
}

#[test]
fn attachment_intents_require_a_selection() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    assert!(matches!(
        session.add_comment("hello"),
        Err(SessionError::NoSelection)
    ));
    assert!(matches!(
        session.add_image("https://e.com/a.png"),
        Err(SessionError::NoSelection)
    ));
    assert!(matches!(
        session.add_link("https://e.com", None),
        Err(SessionError::NoSelection)
    ));
}

#[test]
fn save_and_relogin_roundtrips_the_vault() {
    let store = InMemoryStore::new();

    let mut session = Session::login(&store, "ann", "team").unwrap();
    session.create_folder("Research").unwrap();
    let folder_id = session.vault().folders[0].id.clone();
    session.create_note("Plan", Some(&folder_id)).unwrap();
    session.save().unwrap();
    assert_eq!(session.save_status(), SaveStatus::Succeeded);

    let second = Session::login(&store, "bob", "team").unwrap();
    assert_eq!(second.vault(), session.vault());
}

#[test]
fn failed_save_reports_failure_and_keeps_vault() {
    let store = ReadOnlyStore {
        inner: InMemoryStore::new(),
    };
    let mut session = Session::login(store, "ann", "team").unwrap();
    session.create_note("Unsaved", None).unwrap();
    let before = session.vault().clone();

    let err = session.save().unwrap_err();

    assert!(matches!(err, SessionError::Repo(_)));
    assert_eq!(session.save_status(), SaveStatus::Failed);
    assert_eq!(session.vault(), &before);
}

#[test]
fn refresh_discards_unsaved_changes_and_prunes_selection() {
    let store = InMemoryStore::new();
    let mut session = Session::login(&store, "ann", "team").unwrap();
    session.create_note("Saved", None).unwrap();
    session.save().unwrap();

    // Unsaved local addition; the refreshed vault no longer has it.
    let unsaved = session.create_note("Unsaved", None).unwrap();
    session.refresh().unwrap();

    assert_eq!(session.vault().notes.len(), 1);
    assert!(session.vault().note(&unsaved).is_none());
    assert!(session.selected_note().is_none());
    assert_eq!(session.save_status(), SaveStatus::Idle);
}

#[test]
fn refresh_picks_up_another_collaborators_save() {
    let store = InMemoryStore::new();
    let mut ann = Session::login(&store, "ann", "team").unwrap();
    let mut bob = Session::login(&store, "bob", "team").unwrap();

    ann.create_folder("From Ann").unwrap();
    ann.save().unwrap();

    bob.refresh().unwrap();
    assert_eq!(bob.vault().folders.len(), 1);
    assert_eq!(bob.vault().folders[0].name, "From Ann");
}

#[test]
fn folder_delete_prunes_expansion_state() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    session.create_folder("Open").unwrap();
    let folder_id = session.vault().folders[0].id.clone();

    session.toggle_folder(&folder_id);
    assert!(session.is_expanded(&folder_id));

    session
        .delete_folder(&folder_id, FolderDeleteMode::KeepNotes)
        .unwrap();
    assert!(!session.is_expanded(&folder_id));
}

#[test]
fn folder_delete_cascade_clears_selection_of_member_note() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    session.create_folder("Doomed").unwrap();
    let folder_id = session.vault().folders[0].id.clone();
    session.create_note("Member", Some(&folder_id)).unwrap();
    assert!(session.selected_note().is_some());

    session
        .delete_folder(&folder_id, FolderDeleteMode::Cascade)
        .unwrap();

    assert!(session.selected_note().is_none());
    assert!(session.vault().notes.is_empty());
}

#[test]
fn recording_attaches_capture_to_selected_note() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    session.create_note("Voice memo", None).unwrap();
    let mut recorder = ScriptedRecorder::granting("blob:capture-7");

    session.start_recording(&mut recorder).unwrap();
    assert!(session.is_recording());
    assert!(matches!(
        session.start_recording(&mut recorder),
        Err(SessionError::AlreadyRecording)
    ));

    session.stop_recording(&mut recorder).unwrap();
    assert!(!session.is_recording());
    let audio = &session.selected_note().unwrap().audio_notes;
    assert_eq!(audio.len(), 1);
    assert_eq!(audio[0].url, "blob:capture-7");
}

#[test]
fn denied_device_surfaces_error_without_partial_state() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    session.create_note("Voice memo", None).unwrap();
    let mut recorder = ScriptedRecorder::denying();

    let err = session.start_recording(&mut recorder).unwrap_err();

    assert!(matches!(
        err,
        SessionError::Recorder(RecorderError::DeviceDenied)
    ));
    assert!(!session.is_recording());
    assert!(session.selected_note().unwrap().audio_notes.is_empty());
}

#[test]
fn stopping_after_selected_note_vanishes_still_stops_the_device() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    let note_id = session.create_note("Voice memo", None).unwrap();
    let mut recorder = ScriptedRecorder::granting("blob:capture-9");

    session.start_recording(&mut recorder).unwrap();
    session.delete_note(&note_id).unwrap();

    let err = session.stop_recording(&mut recorder).unwrap_err();

    // The capture is discarded, but the device must not be left running.
    assert!(matches!(err, SessionError::NoSelection));
    assert!(!recorder.started);
    assert!(!session.is_recording());
    assert!(session.vault().notes.is_empty());
}

#[test]
fn stop_without_start_is_rejected() {
    let mut session = Session::login(InMemoryStore::new(), "ann", "team").unwrap();
    session.create_note("Voice memo", None).unwrap();
    let mut recorder = ScriptedRecorder::granting("blob:capture-1");

    assert!(matches!(
        session.stop_recording(&mut recorder),
        Err(SessionError::NotRecording)
    ));
}
