//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notevault_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use notevault_core::{InMemoryStore, Session};

fn main() {
    println!("notevault_core version={}", notevault_core::core_version());

    // End-to-end probe against the in-memory backend: login, mutate, save,
    // reload in a second session.
    let store = InMemoryStore::new();
    let mut session = Session::login(&store, "probe", "smoke").expect("login");
    session.create_folder("Inbox").expect("create folder");
    session.create_note("Hello", None).expect("create note");
    session.save().expect("save");

    let second = Session::login(&store, "probe", "smoke").expect("re-login");
    println!(
        "notevault_core probe folders={} notes={}",
        second.vault().folders.len(),
        second.vault().notes.len()
    );
}
