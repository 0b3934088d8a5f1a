//! Process list collection from `/proc/[pid]/stat`.

use std::path::Path;

use tracing::trace;

use crate::collector::probe::ProbeError;
use crate::collector::procfs::parser::parse_proc_stat;
use crate::collector::traits::FileSystem;
use crate::storage::ProcessInfo;

/// Default page size used to convert `rss` pages to bytes.
const DEFAULT_PAGE_SIZE: u64 = 4096;

/// Lists processes found under the proc directory.
pub struct ProcessLister {
    proc_path: String,
    page_size: u64,
}

impl ProcessLister {
    pub fn new(proc_path: impl Into<String>) -> Self {
        Self {
            proc_path: proc_path.into(),
            page_size: system_page_size(),
        }
    }

    /// Overrides the page size (used by tests to get deterministic RSS).
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Reads one process. `None` if it vanished or its stat is unreadable.
    fn collect_process<F: FileSystem>(&self, fs: &F, pid: u32) -> Option<ProcessInfo> {
        let stat_path = format!("{}/{}/stat", self.proc_path, pid);
        let content = fs.read_to_string(Path::new(&stat_path)).ok()?;
        match parse_proc_stat(&content) {
            Ok(stat) => Some(ProcessInfo {
                pid: stat.pid,
                name: stat.comm,
                resident_memory_bytes: stat.rss.max(0) as u64 * self.page_size,
            }),
            Err(e) => {
                trace!(pid, error = %e, "skipping process with malformed stat");
                None
            }
        }
    }

    /// Collects every process, ordered by pid.
    ///
    /// Processes that disappear during collection are silently skipped; only a
    /// failure to list the proc directory itself is an error.
    pub fn collect_all<F: FileSystem>(&self, fs: &F) -> Result<Vec<ProcessInfo>, ProbeError> {
        let entries = fs
            .read_dir(Path::new(&self.proc_path))
            .map_err(|e| ProbeError::read(&self.proc_path, e))?;

        let mut processes: Vec<ProcessInfo> = entries
            .iter()
            .filter_map(|entry| entry.file_name()?.to_str()?.parse::<u32>().ok())
            .filter_map(|pid| self.collect_process(fs, pid))
            .collect();

        processes.sort_by_key(|p| p.pid);
        Ok(processes)
    }
}

fn system_page_size() -> u64 {
    // SAFETY: sysconf has no preconditions; it returns -1 for unknown names.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        DEFAULT_PAGE_SIZE
    }
}
