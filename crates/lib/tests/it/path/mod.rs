//! Scoped resolution against a real filesystem
//!
//! The lexical rules are covered by unit tests next to the resolver. These
//! tests exercise what only shows up on disk: symlinks, missing ancestors
//! and nested navigation over existing folders.

use folio::path::{self, ScopedDir};

use crate::helpers::*;

#[tokio::test]
async fn test_canonical_accepts_missing_targets() {
    let (_dir, root) = setup_root();

    let resolved = path::resolve_canonical(&root, "new/deeper/file.html")
        .await
        .unwrap();
    assert_eq!(resolved, root.join("new").join("deeper").join("file.html"));
}

#[tokio::test]
async fn test_canonical_matches_lexical_for_plain_paths() {
    let (_dir, root) = setup_root();
    write_file(&root, "docs/a.html", "a");

    for relative in ["", "docs", "docs/a.html", "docs/./a.html", "/docs/", "x/../docs"] {
        let lexical = path::resolve(&root, relative).unwrap();
        let canonical = path::resolve_canonical(&root, relative).await.unwrap();
        assert_eq!(lexical, canonical, "mismatch for {relative:?}");
    }
}

#[tokio::test]
async fn test_canonical_rejects_lexical_escapes() {
    let (_dir, root) = setup_root();

    let err = path::resolve_canonical(&root, "../outside").await.unwrap_err();
    assert!(err.is_escape());
    assert_eq!(err.requested(), Some("../outside"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_out_of_root_is_rejected() {
    let (_outside_dir, outside) = setup_root();
    write_file(&outside, "secret.txt", "secret");
    let (_dir, root) = setup_root();
    std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

    assert!(path::resolve(&root, "link/secret.txt").is_ok());

    let err = path::resolve_canonical(&root, "link/secret.txt")
        .await
        .unwrap_err();
    assert!(err.is_escape());

    let err = path::resolve_canonical(&root, "link/not-yet-there.html")
        .await
        .unwrap_err();
    assert!(err.is_escape());
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_inside_root_is_allowed() {
    let (_dir, root) = setup_root();
    write_file(&root, "real/page.html", "page");
    std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

    let resolved = path::resolve_canonical(&root, "alias/page.html")
        .await
        .unwrap();
    assert_eq!(resolved, root.join("alias").join("page.html"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_symlink_is_rejected() {
    let (_outside_dir, outside) = setup_root();
    let (_dir, root) = setup_root();
    std::os::unix::fs::symlink(outside.join("missing.html"), root.join("dangling.html")).unwrap();

    let err = path::resolve_canonical(&root, "dangling.html")
        .await
        .unwrap_err();
    assert!(err.is_escape());
    assert!(!outside.join("missing.html").exists());
}

#[tokio::test]
async fn test_scoped_navigation_over_existing_folders() {
    let (_dir, root) = setup_root();
    write_file(&root, "blog/2024/post.html", "post");

    let scope = ScopedDir::new(&root).unwrap();
    let blog = scope.enter("blog").unwrap();
    let year = blog.enter("2024").unwrap();
    assert_eq!(year.relative(), "blog/2024");
    assert_eq!(year.path(), root.join("blog").join("2024"));

    let post = year.resolve_canonical("post.html").await.unwrap();
    assert_eq!(std::fs::read_to_string(post).unwrap(), "post");

    // `..` is relative to the current folder and may not climb above it
    assert!(year.resolve("../sibling.html").unwrap_err().is_escape());
    assert!(year.enter("..").unwrap_err().is_escape());

    let back = year.parent().parent();
    assert!(back.is_root());
    assert_eq!(back.parent(), back);
}

#[cfg(unix)]
#[tokio::test]
async fn test_enter_canonical_refuses_symlinked_folder() {
    let (_outside_dir, outside) = setup_root();
    let (_dir, root) = setup_root();
    std::fs::create_dir(root.join("inside")).unwrap();
    std::os::unix::fs::symlink(&outside, root.join("door")).unwrap();

    let scope = ScopedDir::new(&root).unwrap();
    assert_eq!(
        scope.enter_canonical("inside").await.unwrap().relative(),
        "inside"
    );
    // Lexically fine, but it leads outside
    assert!(scope.enter("door").is_ok());
    assert!(scope.enter_canonical("door").await.unwrap_err().is_escape());
}

#[tokio::test]
async fn test_enter_canonical_requires_existing_folder() {
    let (_dir, root) = setup_root();
    std::fs::create_dir(root.join("docs")).unwrap();
    std::fs::write(root.join("page.html"), "hi").unwrap();

    let scope = ScopedDir::new(&root).unwrap();
    assert_eq!(scope.enter_canonical("").await.unwrap().relative(), "");
    assert_eq!(scope.enter_canonical("docs").await.unwrap().relative(), "docs");

    for target in ["page.html", "missing", "docs/page.html"] {
        let err = scope.enter_canonical(target).await.unwrap_err();
        assert!(!err.is_escape());
        assert!(err.is_invalid_input(), "{target:?} should be refused");
        assert_eq!(err.requested(), Some(target));
    }
}
