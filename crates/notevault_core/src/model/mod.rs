//! Domain model for the shared vault aggregate.
//!
//! # Responsibility
//! - Define the canonical folder/note/sub-entity shapes persisted as one
//!   vault document.
//! - Provide derived lookups and referential-integrity verification.
//!
//! # Invariants
//! - Every entity is identified by a stable, vault-unique string id.
//! - `Folder.notes` holds note ids (foreign keys), never embedded notes.
//! - Sub-entity sequences are append-only and insertion-ordered.

pub mod id;
pub mod vault;
