use dupescan::config::{ExcludeSet, ScanConfig, DEFAULT_EXCLUDED_DIRS};
use dupescan::duplicates::DuplicateFinder;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_excludes_prune_subtrees() {
    let dir = tempdir().unwrap();
    for name in [".git", "node_modules", "target", "__pycache__"] {
        let sub = dir.path().join(name).join("nested");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("copy.txt"), b"pruned content").unwrap();
    }
    fs::write(dir.path().join("keep.txt"), b"pruned content").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 1);
}

#[test]
fn test_no_default_excludes_scans_everything() {
    let dir = tempdir().unwrap();
    let git = dir.path().join(".git");
    fs::create_dir(&git).unwrap();
    fs::write(git.join("HEAD"), b"ref: main").unwrap();
    fs::write(dir.path().join("HEAD.bak"), b"ref: main").unwrap();

    let finder = DuplicateFinder::new(ScanConfig::default().with_excludes(ExcludeSet::empty()));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.files_scanned, 2);
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_custom_glob_exclude() {
    let dir = tempdir().unwrap();
    let cache = dir.path().join("thumbs.cache");
    fs::create_dir(&cache).unwrap();
    fs::write(cache.join("a.jpg"), b"jpeg bytes").unwrap();
    fs::write(dir.path().join("a.jpg"), b"jpeg bytes").unwrap();

    let excludes = ExcludeSet::new(["*.cache"]).unwrap();
    let finder = DuplicateFinder::new(ScanConfig::default().with_excludes(excludes));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 1);
}

#[test]
fn test_root_named_like_excluded_dir_is_scanned() {
    let parent = tempdir().unwrap();
    let root = parent.path().join("vendor");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), b"twin").unwrap();
    fs::write(root.join("b.txt"), b"twin").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&root)
        .unwrap();

    assert_eq!(groups.len(), 1);
}

#[test]
fn test_every_default_name_is_excluded() {
    let set = ExcludeSet::defaults();
    for name in DEFAULT_EXCLUDED_DIRS {
        assert!(set.is_excluded(name), "{name} should be excluded");
    }
    assert!(!set.is_excluded("src"));
    assert!(!set.is_excluded("documents"));
}
