//! Workspace creation and listing tests

use folio::{
    constants::{PUBLIC_DIR, USERS_DIR},
    workspace,
};

use crate::helpers::*;

#[tokio::test]
async fn test_workspace_is_created_lazily() {
    let (_dir, instance) = setup_instance().await;
    let manager = instance.workspaces();
    let expected = manager.users_base().join("alice");

    assert!(!expected.exists());
    assert_eq!(manager.public_root("alice").await.unwrap(), None);

    let root = manager.workspace_root("alice").await.unwrap();
    assert_eq!(root, expected);
    assert!(root.join(PUBLIC_DIR).is_dir());

    // Idempotent, and existing content is left alone
    write_file(&root, "htdocs/index.html", "hi");
    manager.workspace_root("alice").await.unwrap();
    assert_eq!(
        std::fs::read_to_string(root.join("htdocs/index.html")).unwrap(),
        "hi"
    );
}

#[tokio::test]
async fn test_workspace_rejects_bad_usernames() {
    let (_dir, instance) = setup_instance().await;
    let manager = instance.workspaces();

    for bad in ["", "..", "../escape", "a:b", "a\\b"] {
        assert!(manager.workspace_root(bad).await.is_err(), "{bad:?}");
        assert_eq!(manager.public_root(bad).await.unwrap(), None);
    }
    assert!(!manager.users_base().parent().unwrap().join("escape").exists());
}

#[tokio::test]
async fn test_list_entries_splits_and_sorts() {
    let (_dir, root) = setup_root();
    write_file(&root, "b.html", "");
    write_file(&root, "a.txt", "");
    write_file(&root, "zeta/x.html", "");
    write_file(&root, "alpha/y.html", "");

    let entries = workspace::list_entries(&root).await.unwrap();
    assert_eq!(entries.files, vec!["a.txt", "b.html"]);
    assert_eq!(entries.folders, vec!["alpha", "zeta"]);

    let missing = workspace::list_entries(&root.join("missing")).await.unwrap();
    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_find_index_prefers_html() {
    let (_dir, root) = setup_root();
    assert_eq!(workspace::find_index(&root).await.unwrap(), None);

    write_file(&root, "index.mako", "");
    assert_eq!(
        workspace::find_index(&root).await.unwrap(),
        Some("index.mako")
    );

    write_file(&root, "index.html", "");
    assert_eq!(
        workspace::find_index(&root).await.unwrap(),
        Some("index.html")
    );
}

#[tokio::test]
async fn test_find_index_ignores_folders() {
    let (_dir, root) = setup_root();
    std::fs::create_dir(root.join("index.html")).unwrap();

    assert_eq!(workspace::find_index(&root).await.unwrap(), None);
}

#[tokio::test]
async fn test_list_publishable() {
    let (_dir, instance) = setup_instance_with_users(&[("alice", "pw"), ("bob", "pw")]).await;
    let base = instance.data_dir().join(USERS_DIR);

    write_file(&base, "alice/htdocs/index.html", "");
    write_file(&base, "alice/htdocs/blog/post.mako", "");
    write_file(&base, "alice/htdocs/notes.txt", "");
    write_file(&base, "alice/private.html", "");
    write_file(&base, "bob/htdocs/readme.txt", "");

    let listing = instance.workspaces().list_publishable().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing["alice"], vec!["blog/post.mako", "index.html"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_publishable_skips_symlinks() {
    let (_outside_dir, outside) = setup_root();
    write_file(&outside, "leak.html", "");
    let (_dir, instance) = setup_instance_with_user("alice", "pw").await;
    let public = instance
        .workspaces()
        .workspace_root("alice")
        .await
        .unwrap()
        .join(PUBLIC_DIR);
    write_file(&public, "page.html", "");
    std::os::unix::fs::symlink(&outside, public.join("linked")).unwrap();

    let listing = instance.workspaces().list_publishable().await.unwrap();
    assert_eq!(listing["alice"], vec!["page.html"]);
}
