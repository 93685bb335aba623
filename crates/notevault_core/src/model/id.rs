//! Vault-unique id generation.
//!
//! # Responsibility
//! - Mint entity ids that stay unique across rapid successive creations.
//!
//! # Invariants
//! - Two mints from one generator never collide, even in the same instant.
//! - Minted ids are plain strings safe to embed in the persisted document.
//!
//! The naive scheme of using only a creation timestamp collides when two
//! entities are created in the same millisecond. Each id therefore combines
//! the timestamp with a monotonic per-generator sequence and a random
//! suffix, so ids minted by independent sessions stay distinct too.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

const RANDOM_SUFFIX_CHARS: usize = 8;

/// Monotonic id source owned by one mutation engine.
#[derive(Debug, Default)]
pub struct IdGenerator {
    sequence: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints one id of shape `"{epoch_ms}-{seq}-{rand}"`.
    pub fn mint(&self) -> String {
        let epoch_ms = Utc::now().timestamp_millis();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(RANDOM_SUFFIX_CHARS)
            .collect();
        format!("{epoch_ms}-{seq}-{suffix}")
    }
}

/// Returns the current instant as an RFC 3339 UTC string with millisecond
/// precision, the same shape the original document format carries.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
