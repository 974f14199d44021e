use crate::domain::model::ScanStats;
use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// Pipeline phases the monitor times, with the unit each one counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Transform,
    Load,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Extract => "Extract",
            Phase::Transform => "Transform",
            Phase::Load => "Load",
        }
    }

    /// Extract counts photos read; transform counts files prepared; load counts files written.
    pub fn unit(&self) -> &'static str {
        match self {
            Phase::Extract => "photos",
            Phase::Transform | Phase::Load => "files",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: Phase,
    pub items: usize,
    pub elapsed: Duration,
    pub memory_mb: Option<u64>,
}

impl PhaseStats {
    /// Items per second, `None` when the phase was too quick to measure.
    pub fn rate(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| self.items as f64 / secs)
    }

    fn summary(&self) -> String {
        let rate = self
            .rate()
            .map(|r| format!(" ({:.1} {}/s)", r, self.phase.unit()))
            .unwrap_or_default();
        let memory = self
            .memory_mb
            .map(|mb| format!(", Memory: {}MB", mb))
            .unwrap_or_default();
        format!(
            "{} - {} {} in {:.2?}{}{}",
            self.phase.name(),
            self.items,
            self.phase.unit(),
            self.elapsed,
            rate,
            memory
        )
    }
}

/// Process memory sampling; only the cli build links sysinfo.
#[cfg(feature = "cli")]
struct MemorySampler {
    system: System,
    pid: Pid,
    peak_mb: u64,
}

#[cfg(feature = "cli")]
impl MemorySampler {
    fn new() -> Option<Self> {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!("Memory sampling unavailable: {}", e);
                return None;
            }
        };
        let mut system = System::new_with_specifics(RefreshKind::everything());
        system.refresh_all();
        Some(Self {
            system,
            pid,
            peak_mb: 0,
        })
    }

    fn sample_mb(&mut self) -> Option<u64> {
        self.system.refresh_all();
        let memory_mb = self.system.process(self.pid)?.memory() / 1024 / 1024;
        self.peak_mb = self.peak_mb.max(memory_mb);
        Some(memory_mb)
    }
}

#[cfg(not(feature = "cli"))]
struct MemorySampler;

#[cfg(not(feature = "cli"))]
impl MemorySampler {
    fn new() -> Option<Self> {
        None
    }

    fn sample_mb(&mut self) -> Option<u64> {
        None
    }
}

struct MonitorState {
    phase_started: Instant,
    phases: Vec<PhaseStats>,
    memory: Option<MemorySampler>,
}

/// Times each pipeline phase and reports its throughput, plus process memory on cli builds.
pub struct SystemMonitor {
    enabled: bool,
    start_time: Instant,
    state: Mutex<MonitorState>,
}

impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let memory = if enabled { MemorySampler::new() } else { None };
        let now = Instant::now();
        Self {
            enabled,
            start_time: now,
            state: Mutex::new(MonitorState {
                phase_started: now,
                phases: Vec::new(),
                memory,
            }),
        }
    }

    /// Closes the running phase after it handled `items` units and starts timing the next.
    pub fn phase_done(&self, phase: Phase, items: usize) -> Option<PhaseStats> {
        if !self.enabled {
            return None;
        }
        let mut state = self.state.lock().ok()?;
        let now = Instant::now();
        let stats = PhaseStats {
            phase,
            items,
            elapsed: now.duration_since(state.phase_started),
            memory_mb: state.memory.as_mut().and_then(MemorySampler::sample_mb),
        };
        state.phase_started = now;
        state.phases.push(stats.clone());

        tracing::info!("📊 {}", stats.summary());
        Some(stats)
    }

    /// Overall throughput of the run in photos per second.
    pub fn log_final_stats(&self, stats: &ScanStats) {
        if !self.enabled {
            return;
        }
        let Ok(state) = self.state.lock() else {
            return;
        };
        let total = self.start_time.elapsed();
        let secs = total.as_secs_f64();
        let rate = if secs > 0.0 {
            stats.scanned as f64 / secs
        } else {
            0.0
        };
        let slowest = state
            .phases
            .iter()
            .max_by_key(|p| p.elapsed)
            .map(|p| p.phase.name())
            .unwrap_or("-");

        tracing::info!(
            "📊 Final Stats - {} photos ({} located) in {:.2?}, {:.1} photos/s, slowest phase: {}{}",
            stats.scanned,
            stats.with_gps,
            total,
            rate,
            slowest,
            peak_memory(&state)
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
fn peak_memory(state: &MonitorState) -> String {
    state
        .memory
        .as_ref()
        .map(|m| format!(", Peak Memory: {}MB", m.peak_mb))
        .unwrap_or_default()
}

#[cfg(not(feature = "cli"))]
fn peak_memory(_state: &MonitorState) -> String {
    String::new()
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
