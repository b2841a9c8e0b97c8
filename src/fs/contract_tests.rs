//! Scenarios that must behave the same on every backend.

use std::io::{Read, Seek, SeekFrom, Write};

use super::*;

/// Runs `scenario` against a fresh in-memory filesystem and the host
/// filesystem, handing it a path prefix to build file names from.
fn for_each_backend(scenario: impl Fn(&dyn FileSystem, &str)) {
    let mem = InMemoryFs::new();
    scenario(&mem, "");

    let dir = tempfile::tempdir().unwrap();
    let prefix = format!("{}/", dir.path().to_str().unwrap());
    scenario(&OsFs, &prefix);
}

#[test]
fn test_write_rename_read_scenario() {
    for_each_backend(|fs, root| {
        let a = format!("{root}a.txt");
        let b = format!("{root}b.txt");

        let mut file = fs.create(&a).unwrap();
        file.write_all(b"hello").unwrap();
        file.close().unwrap();
        assert_eq!(fs.read_file(&a).unwrap(), b"hello");

        fs.rename(&a, &b).unwrap();
        assert_eq!(fs.read_file(&b).unwrap(), b"hello");
        assert!(fs.read_file(&a).unwrap_err().is_not_found());
        assert!(fs.open(&a).unwrap_err().is_not_found());
    });
}

#[test]
fn test_open_and_stat_agree_on_missing() {
    for_each_backend(|fs, root| {
        let missing = format!("{root}missing.txt");
        assert!(fs.open(&missing).unwrap_err().is_not_found());
        assert!(fs.stat(&missing).unwrap_err().is_not_found());
        // Neither lookup created anything.
        assert!(!fs.exists(&missing));
    });
}

#[test]
fn test_create_then_open_is_empty() {
    for_each_backend(|fs, root| {
        let path = format!("{root}empty");
        fs.create(&path).unwrap();

        let mut file = fs.open(&path).unwrap();
        let mut buf = Vec::new();
        assert_eq!(file.read_to_end(&mut buf).unwrap(), 0);
        assert_eq!(file.stat().unwrap().size, 0);
        assert_eq!(fs.stat(&path).unwrap().name, "empty");
    });
}

#[test]
fn test_rename_missing_source() {
    for_each_backend(|fs, root| {
        let a = format!("{root}a");
        let b = format!("{root}b");
        assert!(fs.rename(&a, &b).unwrap_err().is_not_found());
        assert!(!fs.exists(&b));
    });
}

#[test]
fn test_positional_and_sequential_reads() {
    for_each_backend(|fs, root| {
        let path = format!("{root}data");
        fs.write_file(&path, b"0123456789").unwrap();

        let mut file = fs.open(&path).unwrap();
        assert_eq!(file.seek(SeekFrom::Start(4)).unwrap(), 4);

        #[cfg(unix)]
        {
            let mut at = [0u8; 2];
            assert_eq!(file.read_at(&mut at, 0).unwrap(), 2);
            assert_eq!(&at, b"01");
        }

        let mut rest = Vec::new();
        file.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"456789");
    });
}

#[test]
fn test_create_truncates_existing() {
    for_each_backend(|fs, root| {
        let path = format!("{root}t");
        fs.write_file(&path, b"long content").unwrap();
        fs.write_file(&path, b"short").unwrap();
        assert_eq!(fs.read_file(&path).unwrap(), b"short");
        assert_eq!(fs.stat(&path).unwrap().size, 5);
    });
}

#[test]
fn test_backends_are_swappable_behind_arc() {
    use std::sync::Arc;

    let backends: Vec<Arc<dyn FileSystem>> = vec![Arc::new(InMemoryFs::new()), Arc::new(OsFs)];
    let dir = tempfile::tempdir().unwrap();
    for (i, fs) in backends.iter().enumerate() {
        let path = dir.path().join(format!("swap-{i}"));
        let path = path.to_str().unwrap();
        fs.write_file(path, b"x").unwrap();
        assert!(fs.exists(path));
    }
}
