//! Pre-built mock filesystem scenarios for testing.

use super::filesystem::MockFs;
use crate::collector::traits::DiskUsage;

impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: systemd (PID 1), sshd (PID 100) and a bash shell (PID 1000),
    /// two network interfaces and a root filesystem at 25% usage.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12288000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
SReclaimable:     256000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 5000 250 1500 40000 500 100 50 0 0 0
cpu1 5000 250 1500 40000 500 100 50 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  1000000     1000    0    0    0     0          0         0  1000000     1000    0    0    0     0       0          0
  eth0: 52428800    40000    0    0    0     0          0         0 10485760    20000    0    0    0     0       0          0
",
        );

        fs.add_process(
            1,
            "1 (systemd) S 0 1 1 0 -1 4194560 50000 0 100 0 500 300 0 0 20 0 1 0 1 170000000 3000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0",
        );
        fs.add_process(
            100,
            "100 (sshd) S 1 100 100 0 -1 4194560 2000 0 10 0 20 10 0 0 20 0 1 0 500 15000000 1200 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0",
        );
        fs.add_process(
            1000,
            "1000 (bash) S 100 1000 1000 34816 1000 4194304 5000 0 10 0 100 50 0 0 20 0 1 0 100000 25000000 1500 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0",
        );

        fs.set_disk_usage(
            "/",
            DiskUsage {
                total: 100 * 1024 * 1024 * 1024,
                used: 25 * 1024 * 1024 * 1024,
                available: 75 * 1024 * 1024 * 1024,
            },
        );

        fs
    }

    /// Rewrites the aggregate `cpu` line of `/proc/stat`.
    pub fn set_cpu_times(&mut self, user: u64, system: u64, idle: u64) {
        self.add_file(
            "/proc/stat",
            format!("cpu  {} 0 {} {} 0 0 0 0 0 0\nctxt 1\n", user, system, idle),
        );
    }
}
