use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::process::{Pid, ProcessOutcome};

/// The last foreground termination result, read by `status`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExitStatusTracker {
    last: ProcessOutcome,
}

impl ExitStatusTracker {
    pub fn record(&mut self, outcome: ProcessOutcome) {
        self.last = outcome;
    }

    pub fn last(&self) -> ProcessOutcome {
        self.last
    }
}

/// Process-wide shell state, created at startup and dropped at shell exit.
pub struct ShellState {
    pid: u32,
    foreground_only: Arc<AtomicBool>,
    exit_status: ExitStatusTracker,
    background: BTreeSet<Pid>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            pid: std::process::id(),
            foreground_only: Arc::new(AtomicBool::new(false)),
            exit_status: ExitStatusTracker::default(),
            background: BTreeSet::new(),
        }
    }

    /// The shell's own pid, substituted for `$$`.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn is_foreground_only(&self) -> bool {
        self.foreground_only.load(Ordering::SeqCst)
    }

    /// Handle on the mode flag for the signal controller, its only writer.
    pub(crate) fn mode_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.foreground_only)
    }

    pub fn exit_status(&self) -> &ExitStatusTracker {
        &self.exit_status
    }

    pub(crate) fn record_foreground(&mut self, outcome: ProcessOutcome) {
        self.exit_status.record(outcome);
    }

    pub(crate) fn track_background(&mut self, pid: Pid) {
        self.background.insert(pid);
    }

    /// Drops a reaped pid, returning whether it was being tracked.
    pub(crate) fn forget_background(&mut self, pid: Pid) -> bool {
        self.background.remove(&pid)
    }

    pub fn is_tracked(&self, pid: Pid) -> bool {
        self.background.contains(&pid)
    }

    pub fn background_pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.background.iter().copied()
    }
}
