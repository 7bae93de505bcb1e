// tests/path_index.rs

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use notify::RecursiveMode;
use proptest::prelude::*;

use when_changed::errors::WhenChangedError;
use when_changed::fs::mock::MockFileSystem;
use when_changed::watch::PathIndex;

fn project_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/notes.txt", SystemTime::UNIX_EPOCH);
    fs.add_file("/proj/src/main.c", SystemTime::UNIX_EPOCH);
    fs.add_file("/proj/src/deep/util.c", SystemTime::UNIX_EPOCH);
    fs.add_dir("/proj/src/deep/deeper");
    fs
}

#[test]
fn resolves_existing_targets() {
    let fs = project_fs();
    let index = PathIndex::resolve(&fs, &["/proj/notes.txt", "/proj/src"]).unwrap();

    assert_eq!(index.len(), 2);
    let file = index.get(Path::new("/proj/notes.txt")).unwrap();
    assert!(!file.is_dir());
    assert_eq!(file.spelling(), "/proj/notes.txt");
    assert!(index.get(Path::new("/proj/src")).unwrap().is_dir());
}

#[test]
fn missing_target_is_invalid() {
    let fs = project_fs();
    let err = PathIndex::resolve(&fs, &["/proj/notes.txt", "/proj/missing.txt"]).unwrap_err();

    match err {
        WhenChangedError::InvalidTarget { target, .. } => assert_eq!(target, "/proj/missing.txt"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn symlinked_targets_collapse_to_canonical_path() {
    let fs = project_fs();
    fs.add_symlink("/home/link.txt", "/proj/notes.txt");
    fs.add_symlink("/home/srclink", "/proj/src");

    let index =
        PathIndex::resolve(&fs, &["/home/link.txt", "/proj/notes.txt", "/home/srclink/main.c"])
            .unwrap();

    assert_eq!(index.len(), 2);
    assert!(index.contains(Path::new("/proj/notes.txt")));
    assert!(index.contains(Path::new("/proj/src/main.c")));
    // First spelling wins.
    assert_eq!(
        index.get(Path::new("/proj/notes.txt")).unwrap().spelling(),
        "/home/link.txt"
    );
}

#[test]
fn relative_symlink_is_resolved_against_its_directory() {
    let fs = project_fs();
    fs.add_symlink("/proj/alias.c", "src/main.c");

    let index = PathIndex::resolve(&fs, &["/proj/alias.c"]).unwrap();
    assert!(index.contains(Path::new("/proj/src/main.c")));
}

#[test]
fn file_target_interest() {
    let fs = project_fs();
    let index = PathIndex::resolve(&fs, &["/proj/notes.txt"]).unwrap();

    assert!(index.is_interested(Path::new("/proj/notes.txt"), false));
    assert!(!index.is_interested(Path::new("/proj/other.txt"), false));
    assert!(!index.is_interested(Path::new("/proj/other.txt"), true));
}

#[test]
fn directory_target_non_recursive_sees_direct_children_only() {
    let fs = project_fs();
    let index = PathIndex::resolve(&fs, &["/proj/src"]).unwrap();

    assert!(index.is_interested(Path::new("/proj/src/main.c"), false));
    assert!(index.is_interested(Path::new("/proj/src/new_file.c"), false));
    assert!(!index.is_interested(Path::new("/proj/src/deep/util.c"), false));
    assert!(!index.is_interested(Path::new("/proj/notes.txt"), false));
}

#[test]
fn directory_target_recursive_sees_whole_subtree() {
    let fs = project_fs();
    let index = PathIndex::resolve(&fs, &["/proj/src"]).unwrap();

    assert!(index.is_interested(Path::new("/proj/src/deep/util.c"), true));
    assert!(index.is_interested(Path::new("/proj/src/deep/deeper/x/y.c"), true));
    assert!(!index.is_interested(Path::new("/proj/notes.txt"), true));
    assert!(!index.is_interested(Path::new("/elsewhere/src/deep/util.c"), true));
}

#[test]
fn root_target_is_never_reached_by_the_recursive_walk() {
    let fs = project_fs();
    let index = PathIndex::resolve(&fs, &["/"]).unwrap();

    // Direct children of "/" still count.
    assert!(index.is_interested(Path::new("/notes"), false));
    assert!(index.is_interested(Path::new("/notes"), true));
    // Anything deeper would only match through the root itself.
    assert!(!index.is_interested(Path::new("/proj/src/main.c"), true));
}

#[test]
fn watch_roots_for_files_and_directories() {
    let fs = project_fs();
    let index =
        PathIndex::resolve(&fs, &["/proj/notes.txt", "/proj/src", "/proj/src/deep/util.c"])
            .unwrap();

    let roots = index.watch_roots(false);
    assert_eq!(
        roots,
        vec![
            (PathBuf::from("/proj"), RecursiveMode::NonRecursive),
            (PathBuf::from("/proj/src"), RecursiveMode::NonRecursive),
            (PathBuf::from("/proj/src/deep"), RecursiveMode::NonRecursive),
        ]
    );
}

#[test]
fn recursive_directory_root_wins_over_file_parent() {
    let fs = project_fs();
    let index = PathIndex::resolve(&fs, &["/proj/src/main.c", "/proj/src"]).unwrap();

    let roots = index.watch_roots(true);
    assert_eq!(
        roots,
        vec![(PathBuf::from("/proj/src"), RecursiveMode::Recursive)]
    );
}

proptest! {
    #[test]
    fn recursive_interest_is_a_superset(depth in 0usize..6, name in "[a-z]{1,8}") {
        let fs = project_fs();
        let index = PathIndex::resolve(&fs, &["/proj/src"]).unwrap();

        let mut path = PathBuf::from("/proj/src");
        for i in 0..depth {
            path.push(format!("d{i}"));
        }
        path.push(&name);

        if index.is_interested(&path, false) {
            prop_assert!(index.is_interested(&path, true));
        }
        prop_assert!(index.is_interested(&path, true));
        prop_assert_eq!(index.is_interested(&path, false), depth == 0);
    }
}
