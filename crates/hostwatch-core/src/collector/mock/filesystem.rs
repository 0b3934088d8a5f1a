//! In-memory mock filesystem for testing the procfs probe without real `/proc`.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::collector::traits::{DiskUsage, FileSystem};

#[derive(Debug, Default)]
struct MockFsInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    mounts: HashMap<PathBuf, DiskUsage>,
}

/// In-memory filesystem for testing.
///
/// Clones share the same contents, so a test can keep a handle and rewrite
/// `/proc/stat` between samples while the probe owns another clone.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    inner: Arc<RwLock<MockFsInner>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MockFsInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MockFsInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds (or replaces) a file. Parent directories are created implicitly.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut inner = self.write();

        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                inner.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        inner.files.insert(path, content.into());
    }

    /// Removes a file, simulating a process exiting or a permission change.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.write().files.remove(path.as_ref());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut inner = self.write();

        let mut current = Some(path.as_path());
        while let Some(p) = current {
            if !p.as_os_str().is_empty() {
                inner.directories.insert(p.to_path_buf());
            }
            current = p.parent();
        }
    }

    /// Adds a process directory with its `/proc/[pid]/stat` file.
    pub fn add_process(&mut self, pid: u32, stat: &str) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("stat"), stat);
    }

    /// Registers space usage for a mount point.
    pub fn set_disk_usage(&mut self, path: impl AsRef<Path>, usage: DiskUsage) {
        self.write().mounts.insert(path.as_ref().to_path_buf(), usage);
    }
}

fn not_found(what: &str, path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found: {:?}", what, path),
    )
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.read()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("file", path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let inner = self.read();
        if !inner.directories.contains(path) {
            return Err(not_found("directory", path));
        }

        let mut entries = HashSet::new();

        for file_path in inner.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &inner.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn disk_usage(&self, path: &Path) -> io::Result<DiskUsage> {
        self.read()
            .mounts
            .get(path)
            .copied()
            .ok_or_else(|| not_found("mount", path))
    }
}
