use notevault_core::{
    vault_key, InMemoryStore, KeyValueStore, SqliteStore, StoreError, StoreResult, Vault,
    VaultEngine, VaultRepoError, VaultRepository,
};

/// Store that fails every call at the transport level.
struct DownStore;

impl KeyValueStore for DownStore {
    fn get(&self, _key: &str, _scoped: bool) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn set(&self, _key: &str, _value: &str, _scoped: bool) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn sample_vault() -> Vault {
    let engine = VaultEngine::new();
    let vault = engine.create_folder(&Vault::default(), "Research").unwrap();
    let folder_id = vault.folders[0].id.clone();
    let (vault, note) = engine.create_note(&vault, "Plan", Some(&folder_id)).unwrap();
    let vault = engine
        .update_note_content(&vault, &note.id, "agenda\nhttps://youtu.be/x?t=12")
        .unwrap();
    let vault = engine.append_comment(&vault, &note.id, "looks good", "bob").unwrap();
    let vault = engine
        .append_link(&vault, &note.id, "https://example.com", None)
        .unwrap();
    engine
        .append_audio_note(&vault, &note.id, "blob:capture-1")
        .unwrap()
}

#[test]
fn load_of_never_written_key_returns_empty_vault() {
    let repo = VaultRepository::new(InMemoryStore::new());
    let vault = repo.load("fresh").unwrap();
    assert_eq!(vault, Vault::default());
}

#[test]
fn save_then_load_roundtrips_equal_value() {
    let repo = VaultRepository::new(InMemoryStore::new());
    let vault = sample_vault();

    repo.save("team", &vault).unwrap();
    let loaded = repo.load("team").unwrap();

    assert_eq!(loaded, vault);
}

#[test]
fn repeated_saves_write_identical_bytes() {
    let store = InMemoryStore::new();
    let repo = VaultRepository::new(&store);
    let vault = sample_vault();

    repo.save("team", &vault).unwrap();
    let first = store.get(&vault_key("team"), true).unwrap().unwrap();
    repo.save("team", &vault).unwrap();
    let second = store.get(&vault_key("team"), true).unwrap().unwrap();

    assert_eq!(first, second);
}

#[test]
fn corrupt_value_surfaces_as_corrupt_not_fresh_vault() {
    let store = InMemoryStore::new();
    store.set(&vault_key("team"), "{not json", true).unwrap();

    let repo = VaultRepository::new(&store);
    let err = repo.load("team").unwrap_err();

    match err {
        VaultRepoError::Corrupt { key, .. } => assert_eq!(key, "vault_team"),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}

#[test]
fn transport_failure_surfaces_as_store_error() {
    let repo = VaultRepository::new(DownStore);

    assert!(matches!(
        repo.load("team").unwrap_err(),
        VaultRepoError::Store(StoreError::Unavailable(_))
    ));
    assert!(matches!(
        repo.save("team", &Vault::default()).unwrap_err(),
        VaultRepoError::Store(StoreError::Unavailable(_))
    ));
}

#[test]
fn later_save_fully_replaces_earlier_document() {
    // Last-write-wins at blob granularity: two repositories over one store
    // race, and the second save wins completely.
    let store = InMemoryStore::new();
    let engine = VaultEngine::new();

    let first_repo = VaultRepository::new(&store);
    let second_repo = VaultRepository::new(&store);
    let base = first_repo.load("team").unwrap();

    let first_version = engine.create_folder(&base, "From client one").unwrap();
    let second_version = engine.create_folder(&base, "From client two").unwrap();

    first_repo.save("team", &first_version).unwrap();
    second_repo.save("team", &second_version).unwrap();

    let settled = first_repo.load("team").unwrap();
    assert_eq!(settled, second_version);
    assert_eq!(settled.folders.len(), 1);
    assert_eq!(settled.folders[0].name, "From client two");
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vaults.db");
    let vault = sample_vault();

    {
        let repo = VaultRepository::new(SqliteStore::open(&path).unwrap());
        repo.save("team", &vault).unwrap();
    }

    let repo = VaultRepository::new(SqliteStore::open(&path).unwrap());
    assert_eq!(repo.load("team").unwrap(), vault);
}

#[test]
fn older_document_without_sub_entities_loads_with_empty_sequences() {
    let store = InMemoryStore::new();
    let legacy = r#"{
        "folders": [],
        "notes": [{
            "id": "1700000000000",
            "title": "Legacy",
            "content": "",
            "folderId": null,
            "created": "2023-11-14T22:13:20.000Z"
        }]
    }"#;
    store.set(&vault_key("old"), legacy, true).unwrap();

    let repo = VaultRepository::new(&store);
    let vault = repo.load("old").unwrap();
    let note = vault.note("1700000000000").unwrap();
    assert!(note.comments.is_empty());
    assert!(note.audio_notes.is_empty());
}
