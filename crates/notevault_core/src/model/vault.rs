//! Vault aggregate and its entity types.
//!
//! # Responsibility
//! - Mirror the persisted vault document shape (`{ folders, notes }`).
//! - Resolve notes/folders by id and dereference folder membership.
//! - Verify referential integrity between folders and notes.
//!
//! # Invariants
//! - A note belongs to at most one folder; `Note.folder_id` and the owning
//!   folder's id list must agree.
//! - Dangling ids in `Folder.notes` are tolerated on read (skipped), never
//!   produced by mutation code.
//! - Unknown or missing sub-entity sequences deserialize as empty, not as
//!   an error (forward tolerance for documents written by older clients).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque stable identifier shared by all vault entities.
///
/// Ids are strings on the wire; see [`crate::model::id::IdGenerator`] for
/// the generation scheme.
pub type EntityId = String;

/// Root persisted aggregate: the full shared document for one vault id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Folders in creation order.
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// All notes in creation order, root-level and foldered alike.
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Named grouping referencing member notes by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: EntityId,
    /// User-facing label, non-blank.
    pub name: String,
    /// Member note ids in insertion order. Foreign keys into `Vault.notes`.
    #[serde(default)]
    pub notes: Vec<EntityId>,
}

/// Primary content unit owning comments, images, links and audio notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: EntityId,
    /// Non-blank at creation.
    pub title: String,
    /// Free text. Embedded markdown/video patterns are the rendering
    /// layer's concern, not this crate's.
    #[serde(default)]
    pub content: String,
    /// Owning folder id, or `None` for root-level notes.
    #[serde(default)]
    pub folder_id: Option<EntityId>,
    /// Immutable RFC 3339 creation timestamp.
    pub created: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub audio_notes: Vec<AudioNote>,
}

/// Collaborator comment attached to one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: EntityId,
    pub text: String,
    /// Acting username, trusted as supplied by the session.
    pub author: String,
    /// RFC 3339 append timestamp.
    pub timestamp: String,
}

/// Image attachment reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: EntityId,
    pub url: String,
}

/// External link attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: EntityId,
    pub url: String,
    /// Display title; defaults to the url when not supplied at append time.
    pub title: String,
}

/// Reference to a locally-produced audio capture.
///
/// Lifetime and validity of `url` belong to the recording subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioNote {
    pub id: EntityId,
    pub url: String,
    /// RFC 3339 capture timestamp.
    pub timestamp: String,
}

/// Referential-integrity violation found by [`Vault::verify_integrity`].
#[derive(Debug, PartialEq, Eq)]
pub enum IntegrityError {
    /// A folder lists a note id with no matching note.
    DanglingMemberId {
        folder_id: EntityId,
        note_id: EntityId,
    },
    /// A note names a folder id with no matching folder.
    MissingFolder {
        note_id: EntityId,
        folder_id: EntityId,
    },
    /// A note names an owning folder whose id list does not include it.
    UnlistedMember {
        note_id: EntityId,
        folder_id: EntityId,
    },
    /// The same id occurs on more than one folder or note.
    DuplicateId(EntityId),
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingMemberId { folder_id, note_id } => {
                write!(f, "folder {folder_id} lists missing note {note_id}")
            }
            Self::MissingFolder { note_id, folder_id } => {
                write!(f, "note {note_id} names missing folder {folder_id}")
            }
            Self::UnlistedMember { note_id, folder_id } => {
                write!(f, "note {note_id} is not listed by its folder {folder_id}")
            }
            Self::DuplicateId(id) => write!(f, "duplicate entity id: {id}"),
        }
    }
}

impl Error for IntegrityError {}

impl Vault {
    /// Resolves one note by id.
    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    /// Resolves one note by id for in-place mutation.
    pub(crate) fn note_mut(&mut self, note_id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == note_id)
    }

    /// Resolves one folder by id.
    pub fn folder(&self, folder_id: &str) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.id == folder_id)
    }

    /// Resolves one folder by id for in-place mutation.
    pub(crate) fn folder_mut(&mut self, folder_id: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|folder| folder.id == folder_id)
    }

    /// Notes with no owning folder, in insertion order.
    pub fn root_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|note| note.folder_id.is_none())
    }

    /// Dereferences a folder's member ids against `notes`.
    ///
    /// Dangling ids are skipped: a referenced note that no longer exists is
    /// rendered as absent rather than failing the whole listing.
    pub fn folder_notes(&self, folder_id: &str) -> Vec<&Note> {
        let Some(folder) = self.folder(folder_id) else {
            return Vec::new();
        };
        folder
            .notes
            .iter()
            .filter_map(|note_id| self.note(note_id))
            .collect()
    }

    /// Returns whether `id` occurs anywhere in the vault, including
    /// sub-entity ids. Used by the mutation engine's collision guard.
    pub fn contains_id(&self, id: &str) -> bool {
        if self.folders.iter().any(|folder| folder.id == id) {
            return true;
        }
        self.notes.iter().any(|note| {
            note.id == id
                || note.comments.iter().any(|c| c.id == id)
                || note.images.iter().any(|i| i.id == id)
                || note.links.iter().any(|l| l.id == id)
                || note.audio_notes.iter().any(|a| a.id == id)
        })
    }

    /// Verifies folder/note cross-references and id uniqueness.
    ///
    /// Returns the first violation found. Mutation engine output must
    /// always pass; stored documents from older clients may not.
    pub fn verify_integrity(&self) -> Result<(), IntegrityError> {
        let mut seen = std::collections::HashSet::new();
        for id in self
            .folders
            .iter()
            .map(|f| &f.id)
            .chain(self.notes.iter().map(|n| &n.id))
        {
            if !seen.insert(id.as_str()) {
                return Err(IntegrityError::DuplicateId(id.clone()));
            }
        }

        for folder in &self.folders {
            for note_id in &folder.notes {
                if self.note(note_id).is_none() {
                    return Err(IntegrityError::DanglingMemberId {
                        folder_id: folder.id.clone(),
                        note_id: note_id.clone(),
                    });
                }
            }
        }

        for note in &self.notes {
            if let Some(folder_id) = &note.folder_id {
                let Some(folder) = self.folder(folder_id) else {
                    return Err(IntegrityError::MissingFolder {
                        note_id: note.id.clone(),
                        folder_id: folder_id.clone(),
                    });
                };
                if !folder.notes.contains(&note.id) {
                    return Err(IntegrityError::UnlistedMember {
                        note_id: note.id.clone(),
                        folder_id: folder_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
