use super::*;
use std::fs;
use tempfile::tempdir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "SELECT 1;").unwrap();
}

fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_file_extension() {
    assert_eq!(file_extension(Path::new("a/users.sql")), Some(".sql"));
    assert_eq!(file_extension(Path::new("backup.tar.gz")), Some(".gz"));
    assert_eq!(file_extension(Path::new(".sql")), Some(".sql"));
    assert_eq!(file_extension(Path::new("README")), None);
    assert_eq!(file_extension(Path::new("dir.d/README")), None);
}

#[test]
fn test_walk_is_lexicographic_and_descends_in_place() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "b.sql");
    touch(dir.path(), "a.sql");
    touch(dir.path(), "a_dir/z.sql");
    touch(dir.path(), "a_dir/m.sql");
    touch(dir.path(), "c.sql");

    let files = walk_files(dir.path(), &[".sql"]).unwrap();
    assert_eq!(
        relative(dir.path(), &files),
        vec!["a.sql", "a_dir/m.sql", "a_dir/z.sql", "b.sql", "c.sql"]
    );
}

#[test]
fn test_walk_filters_extensions_case_sensitively() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "one.sql");
    touch(dir.path(), "two.SQL");
    touch(dir.path(), "three.sql.bak");
    touch(dir.path(), "notes.md");

    let files = walk_files(dir.path(), &[".sql"]).unwrap();
    assert_eq!(relative(dir.path(), &files), vec!["one.sql"]);

    for file in &files {
        assert_eq!(file_extension(file), Some(".sql"));
    }
}

#[test]
fn test_walk_accepts_multiple_extensions() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.sql");
    touch(dir.path(), "b.md");
    touch(dir.path(), "c.txt");

    let files = walk_files(dir.path(), &[".sql", ".md"]).unwrap();
    assert_eq!(relative(dir.path(), &files), vec!["a.sql", "b.md"]);
}

#[test]
fn test_walk_without_filter_returns_every_file_but_no_directories() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.sql");
    touch(dir.path(), "nested/README");
    fs::create_dir_all(dir.path().join("empty")).unwrap();

    let files = walk_files(dir.path(), &[]).unwrap();
    assert_eq!(relative(dir.path(), &files), vec!["a.sql", "nested/README"]);
}

#[test]
fn test_walk_root_file_is_returned_when_it_matches() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "only.sql");
    let root = dir.path().join("only.sql");

    assert_eq!(walk_files(&root, &[".sql"]).unwrap(), vec![root.clone()]);
    assert!(walk_files(&root, &[".md"]).unwrap().is_empty());
}

#[test]
fn test_walk_missing_root_is_error() {
    let dir = tempdir().unwrap();
    let result = walk_files(&dir.path().join("does-not-exist"), &[".sql"]);
    assert!(matches!(result, Err(CoreError::RootNotFound { .. })));
}

#[test]
fn test_walk_empty_directory() {
    let dir = tempdir().unwrap();
    assert!(walk_files(dir.path(), &[".sql"]).unwrap().is_empty());
}
