//! Instance tests: registration, login and the session lifecycle

use folio::{
    Instance,
    constants::{CREDENTIALS_FILE, PUBLIC_DIR, USERS_DIR},
};

use crate::helpers::*;

#[tokio::test]
async fn test_open_creates_layout() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("data");

    let instance = Instance::open(&data_dir).await.unwrap();

    assert!(instance.data_dir().is_absolute());
    assert!(data_dir.join(USERS_DIR).is_dir());
    // The credential file only appears with the first registration
    assert!(!data_dir.join(CREDENTIALS_FILE).exists());
    assert_eq!(instance.sessions().count().await, 0);
}

#[tokio::test]
async fn test_open_existing_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("typo");

    let err = Instance::open_existing(&missing).await.err().unwrap();
    assert!(err.is_not_found());
    assert!(!missing.exists());

    // An empty directory opens without gaining a layout
    let instance = Instance::open_existing(dir.path()).await.unwrap();
    assert!(instance.credentials().list_usernames().await.unwrap().is_empty());
    assert!(instance.workspaces().list_publishable().await.unwrap().is_empty());
    assert!(!dir.path().join(USERS_DIR).exists());

    let file = dir.path().join("data.txt");
    std::fs::write(&file, "").unwrap();
    assert!(Instance::open_existing(&file).await.is_err());
}

#[tokio::test]
async fn test_open_existing_sees_registered_users() {
    let (_dir, instance) = setup_instance_with_user("alice", "wonderland").await;

    let reader = Instance::open_existing(instance.data_dir()).await.unwrap();
    assert_eq!(
        reader.credentials().list_usernames().await.unwrap(),
        vec!["alice".to_string()]
    );
}

#[tokio::test]
async fn test_register_creates_workspace() {
    let (_dir, instance) = setup_instance().await;

    let username = instance.register(" alice ", "pw").await.unwrap();
    assert_eq!(username, "alice");

    let public = instance
        .data_dir()
        .join(USERS_DIR)
        .join("alice")
        .join(PUBLIC_DIR);
    assert!(public.is_dir());
    assert!(instance.credentials().contains("alice").await.unwrap());
}

#[tokio::test]
async fn test_overlong_username_leaves_no_account() {
    let (_dir, instance) = setup_instance().await;
    let username = "a".repeat(300);

    let err = instance.register(&username, "secret123").await.unwrap_err();
    assert!(err.is_validation_error());
    assert!(!instance.data_dir().join(CREDENTIALS_FILE).exists());
    assert!(instance.login(&username, "secret123").await.is_err());

    // A rejected name does not block a later valid registration
    instance.register("alice", "secret123").await.unwrap();
    assert_eq!(
        instance.credentials().list_usernames().await.unwrap(),
        vec!["alice".to_string()]
    );
}

#[tokio::test]
async fn test_login_and_logout() {
    let (_dir, instance) = setup_instance_with_user("alice", "wonderland").await;

    let token = instance.login("alice", "wonderland").await.unwrap();
    assert_eq!(
        instance.session_user(&token).await.as_deref(),
        Some("alice")
    );
    assert_eq!(instance.sessions().count().await, 1);

    instance.logout(&token).await;
    assert_eq!(instance.session_user(&token).await, None);
    assert_eq!(instance.sessions().count().await, 0);

    // Logging out twice is harmless
    instance.logout(&token).await;
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (_dir, instance) = setup_instance_with_user("alice", "wonderland").await;

    let cases = [
        ("alice", "wrong"),
        ("bob", "wonderland"),
        ("", "wonderland"),
        ("alice", ""),
    ];
    let mut messages = Vec::new();
    for (username, password) in cases {
        let err = instance.login(username, password).await.unwrap_err();
        assert!(err.is_authentication_error(), "{username:?}/{password:?}");
        messages.push(err.to_string());
    }
    messages.dedup();
    assert_eq!(messages.len(), 1);

    assert_eq!(instance.sessions().count().await, 0);
}

#[tokio::test]
async fn test_each_login_gets_a_fresh_token() {
    let (_dir, instance) = setup_instance_with_user("alice", "wonderland").await;

    let first = instance.login("alice", "wonderland").await.unwrap();
    let second = instance.login("alice", "wonderland").await.unwrap();
    assert_ne!(first, second);
    assert_eq!(first.len(), 32);
    assert!(first.bytes().all(|b| b.is_ascii_hexdigit()));

    instance.logout(&first).await;
    assert_eq!(
        instance.session_user(&second).await.as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn test_clones_share_state() {
    let (_dir, instance) = setup_instance_with_user("alice", "pw").await;
    let clone = instance.clone();

    let token = instance.login("alice", "pw").await.unwrap();
    assert_eq!(clone.session_user(&token).await.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_sessions_do_not_survive_reopen() {
    let (dir, instance) = setup_instance_with_user("alice", "pw").await;
    let token = instance.login("alice", "pw").await.unwrap();
    drop(instance);

    let reopened = Instance::open(dir.path()).await.unwrap();
    assert_eq!(reopened.session_user(&token).await, None);
    // Credentials do
    assert!(reopened.login("alice", "pw").await.is_ok());
}
