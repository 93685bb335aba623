//! Vault load/save contract over a key-value store.
//!
//! # Responsibility
//! - Derive the storage key for one vault id.
//! - Serialize/deserialize the vault document (JSON).
//! - Keep not-found and corrupt-data outcomes distinct.
//!
//! # Invariants
//! - Key derivation is exactly `"vault_" + vault_id`, case-sensitive, no
//!   normalization.
//! - Saving the same vault value twice writes identical bytes (idempotent).
//! - All calls pass `scoped = true` to the store; the flag's meaning is
//!   the store's, not this layer's.

use crate::model::vault::Vault;
use crate::store::{KeyValueStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type VaultRepoResult<T> = Result<T, VaultRepoError>;

/// Failure from a vault load/save call.
#[derive(Debug)]
pub enum VaultRepoError {
    /// The key holds a value that is not a valid vault document.
    ///
    /// Kept distinct from not-found: substituting a fresh vault here would
    /// overwrite the collaborators' data on the next save.
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    /// The in-memory vault could not be serialized for writing.
    ///
    /// Practically unreachable for these types; kept distinct from
    /// `Corrupt`, which always means bad stored data read back.
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    /// Underlying get/set transport failure.
    Store(StoreError),
}

impl Display for VaultRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupt { key, source } => {
                write!(f, "corrupt vault document at `{key}`: {source}")
            }
            Self::Serialize { key, source } => {
                write!(f, "cannot serialize vault document for `{key}`: {source}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VaultRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Corrupt { source, .. } => Some(source),
            Self::Serialize { source, .. } => Some(source),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for VaultRepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Derives the storage key for one vault id.
pub fn vault_key(vault_id: &str) -> String {
    format!("vault_{vault_id}")
}

/// Typed load/save facade over one key-value backend.
pub struct VaultRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> VaultRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the vault for `vault_id`.
    ///
    /// A never-written key yields an empty vault: that is vault creation by
    /// convention, logged but not reported as an error.
    ///
    /// # Errors
    /// - `Corrupt` when a stored value exists but fails to deserialize.
    /// - `Store` when the backend call fails.
    pub fn load(&self, vault_id: &str) -> VaultRepoResult<Vault> {
        let key = vault_key(vault_id);
        let started_at = Instant::now();

        let raw = match self.store.get(&key, true) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=vault_load module=repo status=error key={key} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };

        match raw {
            None => {
                info!(
                    "event=vault_load module=repo status=ok key={key} outcome=fresh duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Vault::default())
            }
            Some(value) => match serde_json::from_str::<Vault>(&value) {
                Ok(vault) => {
                    info!(
                        "event=vault_load module=repo status=ok key={key} outcome=existing folders={} notes={} duration_ms={}",
                        vault.folders.len(),
                        vault.notes.len(),
                        started_at.elapsed().as_millis()
                    );
                    Ok(vault)
                }
                Err(source) => {
                    warn!(
                        "event=vault_load module=repo status=error key={key} outcome=corrupt duration_ms={}",
                        started_at.elapsed().as_millis()
                    );
                    Err(VaultRepoError::Corrupt { key, source })
                }
            },
        }
    }

    /// Serializes and fully replaces the stored document for `vault_id`.
    ///
    /// Raw read/replace: whichever client's save lands last wins at blob
    /// granularity. Reconciliation is the session's concern.
    pub fn save(&self, vault_id: &str, vault: &Vault) -> VaultRepoResult<()> {
        let key = vault_key(vault_id);
        let started_at = Instant::now();
        let value = serde_json::to_string(vault)
            .map_err(|source| VaultRepoError::Serialize { key: key.clone(), source })?;

        match self.store.set(&key, &value, true) {
            Ok(()) => {
                info!(
                    "event=vault_save module=repo status=ok key={key} bytes={} duration_ms={}",
                    value.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=vault_save module=repo status=error key={key} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }
}
