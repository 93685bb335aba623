//! Session and selection state for one open vault.
//!
//! # Responsibility
//! - Sequence load at login, manual refresh, and explicit save.
//! - Route user intents through the mutation engine and install the new
//!   vault value on success only.
//! - Keep the selected-note projection derived from the vault by id, so
//!   it can never go stale relative to the underlying state.
//!
//! # Invariants
//! - The in-memory vault is exclusively owned by this session; failures
//!   leave the last good state in place.
//! - `save` reflects every mutation applied before it was invoked; across
//!   clients the store's last-write-wins semantics apply unchanged.
//! - Selection and expansion state reference entities by id and are pruned
//!   whenever the referenced entity disappears.

pub mod recorder;

use crate::engine::{EngineError, VaultEngine};
use crate::model::vault::{Note, Vault};
use crate::repo::vault_repo::{VaultRepoError, VaultRepository};
use crate::session::recorder::{AudioRecorder, RecorderError};
use crate::store::KeyValueStore;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome of the most recent explicit save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// No save attempted yet (or state was reset by a reload).
    #[default]
    Idle,
    /// A save call is underway.
    InProgress,
    Succeeded,
    Failed,
}

/// Failure from a session intent.
#[derive(Debug)]
pub enum SessionError {
    /// Login requires a non-blank username and vault id.
    MissingCredentials,
    /// The intent targets the current selection, but nothing is selected.
    NoSelection,
    /// The intent names a note id that does not resolve.
    UnknownNote(String),
    /// Stop requested while no recording is active.
    NotRecording,
    /// Start requested while a recording is already active.
    AlreadyRecording,
    Engine(EngineError),
    Repo(VaultRepoError),
    Recorder(RecorderError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => {
                write!(f, "login requires a non-blank username and vault id")
            }
            Self::NoSelection => write!(f, "no note is selected"),
            Self::UnknownNote(id) => write!(f, "note not found: {id}"),
            Self::NotRecording => write!(f, "no recording in progress"),
            Self::AlreadyRecording => write!(f, "a recording is already in progress"),
            Self::Engine(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Recorder(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Recorder(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EngineError> for SessionError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<VaultRepoError> for SessionError {
    fn from(value: VaultRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RecorderError> for SessionError {
    fn from(value: RecorderError) -> Self {
        Self::Recorder(value)
    }
}

/// Folder delete mode chosen by the caller.
///
/// Both behaviors are explicit because "delete a folder that still owns
/// notes" has no single obvious answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderDeleteMode {
    /// Delete the folder and every note it owns.
    Cascade,
    /// Delete the folder only; owned notes become root-level.
    KeepNotes,
}

/// One collaborator's open vault: state plus intent methods.
pub struct Session<S: KeyValueStore> {
    repo: VaultRepository<S>,
    engine: VaultEngine,
    username: String,
    vault_id: String,
    vault: Vault,
    selected: Option<String>,
    expanded_folders: HashSet<String>,
    save_status: SaveStatus,
    recording: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Opens a session: validates credentials and performs the initial load.
    ///
    /// # Errors
    /// - `MissingCredentials` when username or vault id is blank.
    /// - `Repo` when the initial load fails (corrupt data, store down).
    pub fn login(
        store: S,
        username: impl Into<String>,
        vault_id: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let username = username.into();
        let vault_id = vault_id.into();
        if username.trim().is_empty() || vault_id.trim().is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        let repo = VaultRepository::new(store);
        let vault = repo.load(&vault_id)?;
        info!(
            "event=session_login module=session status=ok vault_id={vault_id} folders={} notes={}",
            vault.folders.len(),
            vault.notes.len()
        );

        Ok(Self {
            repo,
            engine: VaultEngine::new(),
            username,
            vault_id,
            vault,
            selected: None,
            expanded_folders: HashSet::new(),
            save_status: SaveStatus::Idle,
            recording: false,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn vault_id(&self) -> &str {
        &self.vault_id
    }

    /// Login gate: non-blank username and vault id.
    pub fn is_logged_in(&self) -> bool {
        !self.username.trim().is_empty() && !self.vault_id.trim().is_empty()
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Re-loads the vault from the store, discarding local changes.
    ///
    /// Selection survives only when the selected id still resolves in the
    /// refreshed vault.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        let vault = self.repo.load(&self.vault_id)?;
        self.vault = vault;
        self.save_status = SaveStatus::Idle;
        self.prune_stale_references();
        Ok(())
    }

    /// Persists the current vault on explicit user request.
    ///
    /// A failed save keeps the in-memory vault untouched and leaves
    /// `save_status` at `Failed`; the caller may re-trigger manually.
    pub fn save(&mut self) -> Result<(), SessionError> {
        self.save_status = SaveStatus::InProgress;
        match self.repo.save(&self.vault_id, &self.vault) {
            Ok(()) => {
                self.save_status = SaveStatus::Succeeded;
                Ok(())
            }
            Err(err) => {
                self.save_status = SaveStatus::Failed;
                warn!(
                    "event=session_save module=session status=error vault_id={} error={err}",
                    self.vault_id
                );
                Err(err.into())
            }
        }
    }

    /// Derives the selected-note projection from the current vault.
    ///
    /// Resolved by id on every call, so a mutation to the underlying note
    /// is visible immediately and the projection cannot go stale.
    pub fn selected_note(&self) -> Option<&Note> {
        self.selected.as_deref().and_then(|id| self.vault.note(id))
    }

    /// Selects one note by id.
    pub fn select_note(&mut self, note_id: &str) -> Result<(), SessionError> {
        if self.vault.note(note_id).is_none() {
            return Err(SessionError::UnknownNote(note_id.to_string()));
        }
        self.selected = Some(note_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Flips sidebar expansion for one folder.
    pub fn toggle_folder(&mut self, folder_id: &str) {
        if !self.expanded_folders.remove(folder_id) {
            self.expanded_folders.insert(folder_id.to_string());
        }
    }

    pub fn is_expanded(&self, folder_id: &str) -> bool {
        self.expanded_folders.contains(folder_id)
    }

    /// Creates one folder.
    pub fn create_folder(&mut self, name: &str) -> Result<(), SessionError> {
        let next = self.engine.create_folder(&self.vault, name)?;
        self.install(next);
        Ok(())
    }

    /// Creates one note and selects it, mirroring the editor flow.
    pub fn create_note(
        &mut self,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<String, SessionError> {
        let (next, note) = self.engine.create_note(&self.vault, title, folder_id)?;
        self.install(next);
        self.selected = Some(note.id.clone());
        Ok(note.id)
    }

    /// Replaces one note's content.
    pub fn update_note_content(
        &mut self,
        note_id: &str,
        content: &str,
    ) -> Result<(), SessionError> {
        let next = self.engine.update_note_content(&self.vault, note_id, content)?;
        self.install(next);
        Ok(())
    }

    /// Deletes one note; a selection pointing at it is cleared.
    pub fn delete_note(&mut self, note_id: &str) -> Result<(), SessionError> {
        let next = self.engine.delete_note(&self.vault, note_id)?;
        self.install(next);
        Ok(())
    }

    /// Deletes one folder with the chosen mode.
    pub fn delete_folder(
        &mut self,
        folder_id: &str,
        mode: FolderDeleteMode,
    ) -> Result<(), SessionError> {
        let next = match mode {
            FolderDeleteMode::Cascade => {
                self.engine.delete_folder_cascade(&self.vault, folder_id)?
            }
            FolderDeleteMode::KeepNotes => {
                self.engine.delete_folder_keep_notes(&self.vault, folder_id)?
            }
        };
        self.install(next);
        Ok(())
    }

    /// Appends a comment to the selected note, authored by the session user.
    pub fn add_comment(&mut self, text: &str) -> Result<(), SessionError> {
        let note_id = self.require_selection()?;
        let next = self
            .engine
            .append_comment(&self.vault, &note_id, text, &self.username)?;
        self.install(next);
        Ok(())
    }

    /// Appends an image reference to the selected note.
    pub fn add_image(&mut self, url: &str) -> Result<(), SessionError> {
        let note_id = self.require_selection()?;
        let next = self.engine.append_image(&self.vault, &note_id, url)?;
        self.install(next);
        Ok(())
    }

    /// Appends a link to the selected note.
    pub fn add_link(&mut self, url: &str, title: Option<&str>) -> Result<(), SessionError> {
        let note_id = self.require_selection()?;
        let next = self.engine.append_link(&self.vault, &note_id, url, title)?;
        self.install(next);
        Ok(())
    }

    /// Starts an audio capture for the selected note.
    ///
    /// Device denial surfaces as an error and creates no partial state:
    /// the recording flag stays false and the vault is untouched.
    pub fn start_recording(
        &mut self,
        recorder: &mut dyn AudioRecorder,
    ) -> Result<(), SessionError> {
        if self.recording {
            return Err(SessionError::AlreadyRecording);
        }
        self.require_selection()?;
        recorder.start()?;
        self.recording = true;
        Ok(())
    }

    /// Stops the active capture and attaches the assembled resource to the
    /// selected note.
    ///
    /// The device is stopped before anything else: the flag drops and
    /// `recorder.stop()` runs even when the attach step cannot proceed, so
    /// the device is never left capturing behind a false `is_recording`.
    pub fn stop_recording(
        &mut self,
        recorder: &mut dyn AudioRecorder,
    ) -> Result<(), SessionError> {
        if !self.recording {
            return Err(SessionError::NotRecording);
        }
        self.recording = false;
        let capture = recorder.stop()?;

        // The selection may have vanished mid-capture (note deleted); the
        // assembled capture is discarded rather than attached elsewhere.
        let note_id = self.require_selection()?;
        let next = self
            .engine
            .append_audio_note(&self.vault, &note_id, &capture.url)?;
        self.install(next);
        Ok(())
    }

    /// Installs a successfully produced vault version and prunes any
    /// by-id state whose target no longer exists.
    fn install(&mut self, next: Vault) {
        self.vault = next;
        self.prune_stale_references();
    }

    fn prune_stale_references(&mut self) {
        if let Some(selected) = self.selected.as_deref() {
            if self.vault.note(selected).is_none() {
                self.selected = None;
            }
        }
        let vault = &self.vault;
        self.expanded_folders
            .retain(|folder_id| vault.folder(folder_id).is_some());
    }

    fn require_selection(&self) -> Result<String, SessionError> {
        self.selected.clone().ok_or(SessionError::NoSelection)
    }
}
