//! Credential file tests
//!
//! Registration appends `username:hash` records to a plain text file. These
//! tests inspect the file directly to check what is and is not written.

use std::sync::Arc;

use folio::{
    constants::CREDENTIALS_FILE,
    credentials::{CredentialStore, crypto},
};

fn setup_store() -> (tempfile::TempDir, CredentialStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = CredentialStore::new(dir.path().join(CREDENTIALS_FILE));
    (dir, store)
}

fn records(store: &CredentialStore) -> Vec<String> {
    std::fs::read_to_string(store.path())
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_register_then_verify() {
    let (_dir, store) = setup_store();

    let username = store.register("alice", "wonderland").await.unwrap();
    assert_eq!(username, "alice");

    assert!(store.verify("alice", "wonderland").await.unwrap());
    assert!(!store.verify("alice", "Wonderland").await.unwrap());
    assert!(!store.verify("bob", "wonderland").await.unwrap());
}

#[tokio::test]
async fn test_password_is_never_stored_in_clear() {
    let (_dir, store) = setup_store();
    store.register("alice", "wonderland").await.unwrap();

    let lines = records(&store);
    assert_eq!(lines.len(), 1);
    let (username, hash) = lines[0].split_once(':').unwrap();
    assert_eq!(username, "alice");
    assert!(!hash.contains("wonderland"));
    assert!(hash.starts_with("$argon2id$"));
    assert!(!crypto::is_legacy_hash(hash));
}

#[tokio::test]
async fn test_same_password_gets_distinct_hashes() {
    let (_dir, store) = setup_store();
    store.register("alice", "same").await.unwrap();
    store.register("bob", "same").await.unwrap();

    let lines = records(&store);
    let alice = lines[0].split_once(':').unwrap().1;
    let bob = lines[1].split_once(':').unwrap().1;
    assert_ne!(alice, bob);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let (_dir, store) = setup_store();
    store.register("alice", "first").await.unwrap();

    let err = store.register("alice", "second").await.unwrap_err();
    assert!(err.is_conflict());

    // Whitespace is trimmed before the check
    let err = store.register("  alice ", "third").await.unwrap_err();
    assert!(err.is_conflict());

    assert_eq!(records(&store).len(), 1);
    assert!(store.verify("alice", "first").await.unwrap());
    assert!(!store.verify("alice", "second").await.unwrap());
}

#[tokio::test]
async fn test_invalid_input_writes_nothing() {
    let (_dir, store) = setup_store();

    for bad in ["", "   ", "a:b", "..", "a/b"] {
        let err = store.register(bad, "pw").await.unwrap_err();
        assert!(err.is_validation_error(), "{bad:?} should be rejected");
    }
    let err = store.register("alice", "").await.unwrap_err();
    assert!(err.is_validation_error());

    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_overlong_username_writes_nothing() {
    let (_dir, store) = setup_store();
    let username = "a".repeat(300);

    let err = store.register(&username, "secret123").await.unwrap_err();
    assert!(err.is_validation_error());
    assert!(!store.path().exists());
    assert!(!store.contains(&username).await.unwrap());
}

#[tokio::test]
async fn test_contains_trims_whitespace() {
    let (_dir, store) = setup_store();
    store.register("alice", "wonderland").await.unwrap();

    assert!(store.contains("alice").await.unwrap());
    assert!(store.contains(" alice\t").await.unwrap());
    assert!(!store.contains("bob").await.unwrap());
}

#[tokio::test]
async fn test_missing_file_means_no_users() {
    let (_dir, store) = setup_store();

    assert!(!store.verify("alice", "pw").await.unwrap());
    assert!(!store.contains("alice").await.unwrap());
    assert!(store.list_usernames().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_last_record_wins() {
    let (_dir, store) = setup_store();
    let old = crypto::hash_password("old").unwrap();
    let new = crypto::hash_password("new").unwrap();
    std::fs::write(store.path(), format!("alice:{old}\nalice:{new}\n")).unwrap();

    assert!(store.verify("alice", "new").await.unwrap());
    assert!(!store.verify("alice", "old").await.unwrap());
}

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let (_dir, store) = setup_store();
    let hash = crypto::hash_password("pw").unwrap();
    std::fs::write(
        store.path(),
        format!("garbage without delimiter\n\nalice:{hash}\n"),
    )
    .unwrap();

    assert_eq!(store.list_usernames().await.unwrap(), vec!["alice"]);
    assert!(store.verify("alice", "pw").await.unwrap());
}

#[tokio::test]
async fn test_legacy_sha256_records_still_verify() {
    let (_dir, store) = setup_store();
    // SHA-256 of "secret123"
    std::fs::write(
        store.path(),
        "legacy:fcf730b6d95236ecd3c9fc2d92d7b6b2bb061514961aec041d6c7a7192f592e4\n",
    )
    .unwrap();

    assert!(store.verify("legacy", "secret123").await.unwrap());
    assert!(!store.verify("legacy", "secret124").await.unwrap());
}

#[tokio::test]
async fn test_list_usernames_is_sorted() {
    let (_dir, store) = setup_store();
    for name in ["carol", "alice", "bob"] {
        store.register(name, "pw").await.unwrap();
    }

    assert_eq!(
        store.list_usernames().await.unwrap(),
        vec!["alice", "bob", "carol"]
    );
    assert!(store.contains("bob").await.unwrap());
    assert!(!store.contains("dave").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_registration_of_same_name() {
    let (_dir, store) = setup_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.register("alice", &format!("pw{i}")).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert!(err.is_conflict()),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(records(&store).len(), 1);
}
