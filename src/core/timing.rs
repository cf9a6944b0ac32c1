use crate::domain::model::TimingReport;
use std::time::{Duration, Instant};

/// CPU time consumed by reaped children of this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildCpuTimes {
    pub user: Duration,
    pub sys: Duration,
}

fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec.max(0) as u64) + Duration::from_micros(tv.tv_usec.max(0) as u64)
}

impl ChildCpuTimes {
    pub fn now() -> Self {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
        // SAFETY: getrusage only writes into the provided struct.
        let rc = unsafe { libc::getrusage(libc::RUSAGE_CHILDREN, usage.as_mut_ptr()) };
        if rc != 0 {
            tracing::warn!(
                "getrusage failed: {}",
                std::io::Error::last_os_error()
            );
            return Self::default();
        }
        // SAFETY: zero-initialised and filled by a successful getrusage call.
        let usage = unsafe { usage.assume_init() };
        Self {
            user: timeval_to_duration(usage.ru_utime),
            sys: timeval_to_duration(usage.ru_stime),
        }
    }
}

/// Measures one child run: wall clock plus the children CPU-time delta.
///
/// The delta covers every child reaped between `start` and `stop`, which is
/// exactly the delegated program in a sequential launch.
#[derive(Debug)]
pub struct Stopwatch {
    started: Instant,
    cpu_before: ChildCpuTimes,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            cpu_before: ChildCpuTimes::now(),
        }
    }

    pub fn stop(self) -> TimingReport {
        let real = self.started.elapsed();
        let cpu_after = ChildCpuTimes::now();
        TimingReport {
            real,
            user: cpu_after.user.saturating_sub(self.cpu_before.user),
            sys: cpu_after.sys.saturating_sub(self.cpu_before.sys),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwatch_measures_wall_clock() {
        let watch = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(20));
        let report = watch.stop();
        assert!(report.real >= Duration::from_millis(20));
    }

    #[test]
    fn test_child_times_are_monotonic() {
        let before = ChildCpuTimes::now();
        std::process::Command::new("/bin/sh")
            .arg("-c")
            .arg("true")
            .status()
            .unwrap();
        let after = ChildCpuTimes::now();
        assert!(after.user >= before.user);
        assert!(after.sys >= before.sys);
    }
}
