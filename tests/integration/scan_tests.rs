use dupescan::config::{ExcludeSet, ScanConfig};
use dupescan::duplicates::DuplicateFinder;
use dupescan::scanner::{HashAlgorithm, Hasher};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn write(path: PathBuf, content: &[u8]) -> PathBuf {
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 0);
    assert_eq!(summary.total_bytes, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_basic_duplicates() {
    let dir = tempdir().unwrap();
    let a = write(dir.path().join("a.txt"), b"hello");
    let b = write(dir.path().join("b.txt"), b"hello");
    write(dir.path().join("c.txt"), b"world!");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![a, b]);
    assert_eq!(groups[0].size, 5);
    assert_eq!(groups[0].digest, Hasher::default().hash_bytes(b"hello"));
    assert_eq!(summary.files_scanned, 3);
    assert_eq!(summary.total_bytes, 16);
    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
}

#[test]
fn test_scan_single_file() {
    let dir = tempdir().unwrap();
    write(dir.path().join("only.txt"), b"hello");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_file_root_reports_one_file() {
    let dir = tempdir().unwrap();
    let only = write(dir.path().join("only.txt"), b"hello");
    write(dir.path().join("sibling.txt"), b"hello");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&only)
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(summary.total_bytes, 5);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.bin"), b"aaaa");
    write(dir.path().join("b.bin"), b"bbbb");
    write(dir.path().join("c.bin"), b"cccc");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.hashed_files, 3);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two").join("three");
    fs::create_dir_all(&deep).unwrap();

    let top = write(dir.path().join("top.txt"), b"nested duplicate");
    let bottom = write(deep.join("bottom.txt"), b"nested duplicate");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 2);
    assert!(groups[0].paths.contains(&top));
    assert!(groups[0].paths.contains(&bottom));
}

#[test]
fn test_multiple_groups_sorted_by_digest() {
    let dir = tempdir().unwrap();
    for i in 0..3 {
        write(dir.path().join(format!("x{i}.txt")), b"group x content");
        write(dir.path().join(format!("y{i}.txt")), b"group y content");
    }
    write(dir.path().join("z.txt"), b"group z");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert!(groups[0].digest < groups[1].digest);
    assert!(groups.iter().all(|g| g.paths.len() == 3));
    assert_eq!(summary.duplicate_files, 4);
    assert_eq!(summary.reclaimable_space, 4 * 15);
}

#[test]
fn test_empty_files_never_grouped() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1.txt")).unwrap();
    File::create(dir.path().join("empty2.txt")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 0);
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_reported() {
    let dir = tempdir().unwrap();
    let real = write(dir.path().join("real.txt"), b"linked content");
    std::os::unix::fs::symlink(&real, dir.path().join("alias.txt")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 1);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..10 {
        write(dir.path().join(format!("dup{i}.dat")), b"repeated payload");
        write(dir.path().join(format!("uniq{i}.dat")), format!("unique {i:03}").as_bytes());
    }

    let finder = DuplicateFinder::with_defaults();
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_concurrency_does_not_change_result() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(dir.path().join(format!("f{i}.dat")), format!("content {}", i % 7).as_bytes());
    }

    let collect = |n: usize| {
        let finder = DuplicateFinder::new(ScanConfig::default().with_max_concurrency(n));
        let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
        groups
            .into_iter()
            .map(|g| g.paths)
            .collect::<BTreeSet<_>>()
    };

    let serial = collect(1);
    assert_eq!(serial.len(), 7);
    assert_eq!(serial, collect(4));
    assert_eq!(serial, collect(64));
}

#[test]
fn test_algorithms_agree_on_groups() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a"), b"same");
    write(dir.path().join("b"), b"same");
    write(dir.path().join("c"), b"diff");

    let run = |alg: HashAlgorithm| {
        let finder = DuplicateFinder::new(ScanConfig::default().with_algorithm(alg));
        finder.find_duplicates(dir.path()).unwrap().0
    };

    let blake = run(HashAlgorithm::Blake3);
    let sha = run(HashAlgorithm::Sha256);

    assert_eq!(blake.len(), 1);
    assert_eq!(blake[0].paths, sha[0].paths);
    assert_ne!(blake[0].digest, sha[0].digest);
}

#[test]
fn test_paranoid_mode_confirms_groups() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    write(dir.path().join("big1.bin"), &data);
    write(dir.path().join("big2.bin"), &data);

    let finder = DuplicateFinder::new(
        ScanConfig::default()
            .with_excludes(ExcludeSet::empty())
            .with_paranoid(true),
    );
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.reclaimable_space, 200_000);
}
