use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub elapsed: Duration,
}

/// Records wall-clock time per harness phase: container start, readiness and
/// each scenario.
pub struct SuiteMonitor {
    start_time: Instant,
    last_mark: Mutex<Instant>,
    phases: Mutex<Vec<PhaseStats>>,
    enabled: bool,
}

impl SuiteMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_mark: Mutex::new(now),
            phases: Mutex::new(Vec::new()),
            enabled,
        }
    }

    /// Closes the current phase and returns its duration.
    pub fn mark(&self, phase: &str) -> Option<Duration> {
        if !self.enabled {
            return None;
        }

        let now = Instant::now();
        let mut last = self.last_mark.lock().ok()?;
        let elapsed = now.duration_since(*last);
        *last = now;

        self.phases.lock().ok()?.push(PhaseStats {
            phase: phase.to_string(),
            elapsed,
        });

        Some(elapsed)
    }

    pub fn log_phase(&self, phase: &str) {
        if let Some(elapsed) = self.mark(phase) {
            tracing::info!("⏱  {} took {:?}", phase, elapsed);
        }
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let phase_count = self.phases.lock().map(|p| p.len()).unwrap_or(0);
        tracing::info!(
            "⏱  Suite finished - Total Time: {:?}, Phases: {}",
            self.start_time.elapsed(),
            phase_count
        );
    }

    pub fn phases(&self) -> Vec<PhaseStats> {
        self.phases.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for SuiteMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
