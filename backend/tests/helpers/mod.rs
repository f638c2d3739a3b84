use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub fn fixture_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture subdirectory");
    }
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}
