//! Vault mutation engine.
//!
//! # Responsibility
//! - Provide the closed set of structural vault transitions: folder/note
//!   creation and deletion, content edits, and sub-entity appends.
//!
//! # Invariants
//! - Every operation is all-or-nothing: validation failures return the
//!   error before any state is touched, and each success produces a new
//!   `Vault` value (the input is never aliased across versions).
//! - Engine output always satisfies `Vault::verify_integrity`: a folder
//!   never lists a missing note and a note's `folder_id` always names a
//!   folder that lists it.
//! - Appends preserve insertion order; nothing is ever reordered.

use crate::model::id::{now_rfc3339, IdGenerator};
use crate::model::vault::{AudioNote, Comment, EntityId, Folder, Image, Link, Note, Vault};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Validation or resolution failure from a mutation operation.
#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    /// Folder name is blank after trim.
    EmptyFolderName,
    /// Note title is blank after trim.
    EmptyNoteTitle,
    /// Comment text is blank after trim.
    EmptyCommentText,
    /// Attachment url is blank after trim.
    EmptyUrl,
    /// Referenced folder id does not resolve.
    FolderNotFound(EntityId),
    /// Referenced note id does not resolve.
    NoteNotFound(EntityId),
    /// A freshly minted id already occurs in the vault.
    ///
    /// Practically unreachable with the sequence+random id scheme, but a
    /// collision must fail loudly rather than corrupt references.
    IdCollision(EntityId),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFolderName => write!(f, "folder name must not be blank"),
            Self::EmptyNoteTitle => write!(f, "note title must not be blank"),
            Self::EmptyCommentText => write!(f, "comment text must not be blank"),
            Self::EmptyUrl => write!(f, "url must not be blank"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::IdCollision(id) => write!(f, "generated id already in use: {id}"),
        }
    }
}

impl Error for EngineError {}

/// Pure state-transition engine owning the id source.
///
/// Every method takes the current vault by reference and returns a new
/// vault value; callers decide when the new value replaces the old one.
#[derive(Debug, Default)]
pub struct VaultEngine {
    ids: IdGenerator,
}

impl VaultEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one empty folder.
    pub fn create_folder(&self, vault: &Vault, name: &str) -> EngineResult<Vault> {
        let name = non_blank(name).ok_or(EngineError::EmptyFolderName)?;
        let id = self.fresh_id(vault)?;

        let mut next = vault.clone();
        next.folders.push(Folder {
            id,
            name,
            notes: Vec::new(),
        });
        Ok(next)
    }

    /// Appends one empty note, optionally filed under an existing folder.
    ///
    /// When `folder_id` is given, the folder's member list and the note's
    /// back-reference are written in the same transition. An unknown
    /// folder id fails before any mutation; a dangling reference is never
    /// created.
    pub fn create_note(
        &self,
        vault: &Vault,
        title: &str,
        folder_id: Option<&str>,
    ) -> EngineResult<(Vault, Note)> {
        let title = non_blank(title).ok_or(EngineError::EmptyNoteTitle)?;
        if let Some(folder_id) = folder_id {
            if vault.folder(folder_id).is_none() {
                return Err(EngineError::FolderNotFound(folder_id.to_string()));
            }
        }
        let id = self.fresh_id(vault)?;

        let note = Note {
            id: id.clone(),
            title,
            content: String::new(),
            folder_id: folder_id.map(str::to_string),
            created: now_rfc3339(),
            comments: Vec::new(),
            images: Vec::new(),
            links: Vec::new(),
            audio_notes: Vec::new(),
        };

        let mut next = vault.clone();
        if let Some(folder_id) = folder_id {
            // Resolution was checked above; the clone preserves the folder.
            if let Some(folder) = next.folder_mut(folder_id) {
                folder.notes.push(id);
            }
        }
        next.notes.push(note.clone());
        Ok((next, note))
    }

    /// Replaces the content of one note.
    pub fn update_note_content(
        &self,
        vault: &Vault,
        note_id: &str,
        content: &str,
    ) -> EngineResult<Vault> {
        let mut next = vault.clone();
        let note = next
            .note_mut(note_id)
            .ok_or_else(|| EngineError::NoteNotFound(note_id.to_string()))?;
        note.content = content.to_string();
        Ok(next)
    }

    /// Removes one note and strips its id from every folder.
    ///
    /// Single atomic transition: the note is never gone from `notes` while
    /// still referenced, or the reverse. Stripping scans all folders so a
    /// note that (incorrectly) ended up referenced twice loses every
    /// reference.
    pub fn delete_note(&self, vault: &Vault, note_id: &str) -> EngineResult<Vault> {
        if vault.note(note_id).is_none() {
            return Err(EngineError::NoteNotFound(note_id.to_string()));
        }

        let mut next = vault.clone();
        next.notes.retain(|note| note.id != note_id);
        for folder in &mut next.folders {
            folder.notes.retain(|member| member != note_id);
        }
        Ok(next)
    }

    /// Removes one folder together with every note it owns.
    ///
    /// Cascaded notes are also stripped from any other folder that lists
    /// them, so the result stays referentially consistent.
    pub fn delete_folder_cascade(&self, vault: &Vault, folder_id: &str) -> EngineResult<Vault> {
        let folder = vault
            .folder(folder_id)
            .ok_or_else(|| EngineError::FolderNotFound(folder_id.to_string()))?;
        let members: Vec<EntityId> = folder.notes.clone();

        let mut next = vault.clone();
        next.folders.retain(|f| f.id != folder_id);
        next.notes.retain(|note| !members.contains(&note.id));
        for folder in &mut next.folders {
            folder.notes.retain(|member| !members.contains(member));
        }
        Ok(next)
    }

    /// Removes one folder and re-roots its member notes.
    pub fn delete_folder_keep_notes(&self, vault: &Vault, folder_id: &str) -> EngineResult<Vault> {
        let folder = vault
            .folder(folder_id)
            .ok_or_else(|| EngineError::FolderNotFound(folder_id.to_string()))?;
        let members: Vec<EntityId> = folder.notes.clone();

        let mut next = vault.clone();
        next.folders.retain(|f| f.id != folder_id);
        for note in &mut next.notes {
            if members.contains(&note.id) || note.folder_id.as_deref() == Some(folder_id) {
                note.folder_id = None;
            }
        }
        Ok(next)
    }

    /// Appends one comment to a note.
    pub fn append_comment(
        &self,
        vault: &Vault,
        note_id: &str,
        text: &str,
        author: &str,
    ) -> EngineResult<Vault> {
        let text = non_blank(text).ok_or(EngineError::EmptyCommentText)?;
        let comment = Comment {
            id: self.fresh_id(vault)?,
            text,
            author: author.to_string(),
            timestamp: now_rfc3339(),
        };
        self.append_to_note(vault, note_id, |note| note.comments.push(comment))
    }

    /// Appends one image reference to a note.
    pub fn append_image(&self, vault: &Vault, note_id: &str, url: &str) -> EngineResult<Vault> {
        let url = non_blank(url).ok_or(EngineError::EmptyUrl)?;
        let image = Image {
            id: self.fresh_id(vault)?,
            url,
        };
        self.append_to_note(vault, note_id, |note| note.images.push(image))
    }

    /// Appends one link to a note. A missing title defaults to the url.
    pub fn append_link(
        &self,
        vault: &Vault,
        note_id: &str,
        url: &str,
        title: Option<&str>,
    ) -> EngineResult<Vault> {
        let url = non_blank(url).ok_or(EngineError::EmptyUrl)?;
        let title = title
            .and_then(non_blank)
            .unwrap_or_else(|| url.clone());
        let link = Link {
            id: self.fresh_id(vault)?,
            url,
            title,
        };
        self.append_to_note(vault, note_id, |note| note.links.push(link))
    }

    /// Appends one audio capture reference to a note.
    pub fn append_audio_note(
        &self,
        vault: &Vault,
        note_id: &str,
        url: &str,
    ) -> EngineResult<Vault> {
        let url = non_blank(url).ok_or(EngineError::EmptyUrl)?;
        let audio = AudioNote {
            id: self.fresh_id(vault)?,
            url,
            timestamp: now_rfc3339(),
        };
        self.append_to_note(vault, note_id, |note| note.audio_notes.push(audio))
    }

    fn append_to_note(
        &self,
        vault: &Vault,
        note_id: &str,
        append: impl FnOnce(&mut Note),
    ) -> EngineResult<Vault> {
        let mut next = vault.clone();
        let note = next
            .note_mut(note_id)
            .ok_or_else(|| EngineError::NoteNotFound(note_id.to_string()))?;
        append(note);
        Ok(next)
    }

    fn fresh_id(&self, vault: &Vault) -> EngineResult<EntityId> {
        ensure_fresh(vault, self.ids.mint())
    }
}

/// Rejects a minted id that already occurs anywhere in the vault.
fn ensure_fresh(vault: &Vault, id: EntityId) -> EngineResult<EntityId> {
    if vault.contains_id(&id) {
        return Err(EngineError::IdCollision(id));
    }
    Ok(id)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
