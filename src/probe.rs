use std::sync::Mutex;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStats {
    pub memory_bytes: u64,
    pub cpu_percent: f32,
    pub threads: Option<usize>,
}

impl ProcessStats {
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / 1024.0 / 1024.0
    }
}

pub trait ProcessProbe: Send + Sync {
    /// `None` when the OS refuses to tell us.
    fn sample(&self) -> Option<ProcessStats>;
}

/// Reads this process's counters through `sysinfo`.
pub struct SysinfoProbe {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("Process introspection unavailable: {}", e);
                None
            }
        };
        Self { pid, system: Mutex::new(System::new()) }
    }
}

impl ProcessProbe for SysinfoProbe {
    fn sample(&self) -> Option<ProcessStats> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        // cpu usage is a delta since the previous refresh: the first sample reads 0%
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;
        Some(ProcessStats {
            memory_bytes: process.memory(),
            cpu_percent: process.cpu_usage(),
            threads: process.tasks().map(|tasks| tasks.len()),
        })
    }
}

#[cfg(test)]
pub struct FixedProbe(pub Option<ProcessStats>);

#[cfg(test)]
impl ProcessProbe for FixedProbe {
    fn sample(&self) -> Option<ProcessStats> {
        self.0.clone()
    }
}
