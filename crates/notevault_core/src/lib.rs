//! Core domain logic for the shared-vault collaboration app.
//! This crate is the single source of truth for the vault data model and
//! its load/mutate/save contract.

pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod session;
pub mod store;

pub use engine::{EngineError, EngineResult, VaultEngine};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::id::IdGenerator;
pub use model::vault::{
    AudioNote, Comment, EntityId, Folder, Image, IntegrityError, Link, Note, Vault,
};
pub use repo::vault_repo::{vault_key, VaultRepoError, VaultRepoResult, VaultRepository};
pub use session::recorder::{AudioCapture, AudioRecorder, RecorderError};
pub use session::{FolderDeleteMode, SaveStatus, Session, SessionError};
pub use store::{InMemoryStore, KeyValueStore, SqliteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
