//! Repository layer mapping the vault aggregate onto raw key-value calls.
//!
//! # Responsibility
//! - Own the persisted document format and storage-key derivation.
//! - Translate store-level outcomes into vault-level semantics.
//!
//! # Invariants
//! - A never-written key loads as a fresh empty vault, not an error.
//! - A written value that fails to deserialize surfaces as `Corrupt`,
//!   never as a silently substituted fresh vault.
//! - No merge logic: read/replace only, last-write-wins at the store.

pub mod vault_repo;
