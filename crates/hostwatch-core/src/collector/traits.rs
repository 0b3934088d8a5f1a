//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the procfs probe read either the real `/proc`
//! tree on Linux or an in-memory mock in tests and on other platforms.

use std::io;
use std::path::{Path, PathBuf};

/// Space accounting for one mounted filesystem, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    /// Space available to unprivileged users.
    pub available: u64,
}

impl DiskUsage {
    /// Used share as reported by `df`: `used / (used + available)`.
    ///
    /// Blocks reserved for root are excluded from the denominator.
    pub fn percent(&self) -> f64 {
        let denom = self.used + self.available;
        if denom == 0 {
            return 0.0;
        }
        self.used as f64 / denom as f64 * 100.0
    }
}

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Returns space usage of the filesystem mounted at `path`.
    fn disk_usage(&self, path: &Path) -> io::Result<DiskUsage>;
}

/// Real filesystem implementation that delegates to `std::fs` and `statvfs(3)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    #[cfg(unix)]
    fn disk_usage(&self, path: &Path) -> io::Result<DiskUsage> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // SAFETY: `stat` is a plain C struct that statvfs fully initializes on
        // success, and `c_path` is a valid NUL-terminated string for the call.
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }

        let block_size = stat.f_frsize as u64;
        let total = stat.f_blocks as u64 * block_size;
        let free = stat.f_bfree as u64 * block_size;
        let available = stat.f_bavail as u64 * block_size;

        Ok(DiskUsage {
            total,
            used: total.saturating_sub(free),
            available,
        })
    }

    #[cfg(not(unix))]
    fn disk_usage(&self, path: &Path) -> io::Result<DiskUsage> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("disk usage of {:?} needs statvfs", path),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_real_fs_read_to_string() {
        let fs = RealFs::new();
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        let content = fs.read_to_string(&cargo_toml).unwrap();
        assert!(content.contains("[package]"));
    }

    #[test]
    fn test_real_fs_missing_file() {
        let fs = RealFs::new();
        let err = fs
            .read_to_string(Path::new("/nonexistent/path/12345"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_real_fs_read_dir() {
        let fs = RealFs::new();
        let src_dir = env::current_dir().unwrap().join("src");
        let entries = fs.read_dir(&src_dir).unwrap();
        assert!(!entries.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_disk_usage() {
        let fs = RealFs::new();
        let usage = fs.disk_usage(&env::current_dir().unwrap()).unwrap();
        assert!(usage.total > 0);
        assert!(usage.used <= usage.total);
        assert!((0.0..=100.0).contains(&usage.percent()));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_disk_usage_missing_path() {
        let fs = RealFs::new();
        assert!(fs.disk_usage(Path::new("/nonexistent/path/12345")).is_err());
    }

    #[cfg(not(unix))]
    #[test]
    fn test_real_fs_disk_usage_unsupported() {
        let err = RealFs::new().disk_usage(Path::new(".")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_disk_usage_percent() {
        let usage = DiskUsage {
            total: 1000,
            used: 300,
            available: 600,
        };
        assert!((usage.percent() - 33.333).abs() < 0.01);
        assert_eq!(DiskUsage::default().percent(), 0.0);
    }
}
