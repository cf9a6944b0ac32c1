use crate::domain::model::ResourceStats;

#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Samples a running child process for memory and CPU figures.
#[cfg(feature = "cli")]
pub struct ProcessMonitor {
    system: System,
    pid: Pid,
    stats: ResourceStats,
}

#[cfg(feature = "cli")]
impl ProcessMonitor {
    pub fn new(pid: u32) -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(pid),
            stats: ResourceStats::default(),
        }
    }

    /// Takes one sample; returns false once the process is gone.
    pub fn sample(&mut self) -> bool {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );

        let Some(process) = self.system.process(self.pid) else {
            return false;
        };

        let memory_mb = process.memory() / 1024 / 1024;
        self.stats.samples += 1;
        self.stats.peak_memory_mb = self.stats.peak_memory_mb.max(memory_mb);
        self.stats.last_cpu_usage = process.cpu_usage();

        tracing::debug!(
            "📊 pid {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
            self.pid,
            self.stats.last_cpu_usage,
            memory_mb,
            self.stats.peak_memory_mb
        );
        true
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }
}

// 為非CLI環境提供空實現
#[cfg(not(feature = "cli"))]
pub struct ProcessMonitor;

#[cfg(not(feature = "cli"))]
impl ProcessMonitor {
    pub fn new(_pid: u32) -> Self {
        Self
    }

    pub fn sample(&mut self) -> bool {
        false
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats::default()
    }
}

pub fn log_final_stats(stats: &ResourceStats) {
    tracing::info!(
        "📊 Final Stats - Samples: {}, Peak Memory: {}MB, CPU: {:.1}%",
        stats.samples,
        stats.peak_memory_mb,
        stats.last_cpu_usage
    );
}
