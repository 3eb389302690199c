use std::io::{self, Write};

use libc::c_int;

use super::{Pid, ProcessOutcome};
use crate::core::state::ShellState;

/// A child collected by one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub outcome: ProcessOutcome,
    pub tracked: bool,
}

/// Non-blocking collector for finished children.
///
/// Sweeps for any terminated child, not only tracked background pids, and
/// reports each one as done. The foreground child is never seen here because
/// it is waited on synchronously before the sweep runs.
#[derive(Debug, Clone, Default)]
pub struct JobReaper;

impl JobReaper {
    pub fn new() -> Self {
        Self
    }

    /// Collects every finished child before returning.
    ///
    /// A failed write does not stop the drain: the remaining children are
    /// still collected and logged, and the first write error is returned once
    /// nothing is left to wait for.
    pub fn sweep<W: Write>(&self, state: &mut ShellState, out: &mut W) -> io::Result<Vec<Reaped>> {
        let mut reaped = Vec::new();
        let mut write_error = None;
        while let Some((pid, status)) = poll_any()? {
            let Some(outcome) = ProcessOutcome::from_wait_status(status) else {
                continue;
            };
            let tracked = state.forget_background(pid);
            if write_error.is_none() {
                if let Err(e) = writeln!(out, "background pid {} is done: {}", pid, outcome) {
                    write_error = Some(e);
                }
            }
            if write_error.is_some() {
                tracing::warn!(pid, %outcome, "completion notice not written");
            }
            tracing::debug!(pid, %outcome, tracked, "reaped child");
            reaped.push(Reaped {
                pid,
                outcome,
                tracked,
            });
        }
        match write_error {
            Some(e) => Err(e),
            None => {
                out.flush()?;
                Ok(reaped)
            }
        }
    }
}

/// One `waitpid(-1, WNOHANG)`. `None` once nothing is left to collect.
fn poll_any() -> io::Result<Option<(Pid, c_int)>> {
    let mut status: c_int = 0;
    loop {
        // SAFETY: status is a valid out-pointer.
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
        match pid {
            0 => return Ok(None),
            -1 => {
                let err = io::Error::last_os_error();
                match err.raw_os_error() {
                    Some(libc::EINTR) => continue,
                    Some(libc::ECHILD) => return Ok(None),
                    _ => {
                        tracing::warn!(error = %err, "waitpid sweep failed");
                        return Err(err);
                    }
                }
            }
            pid => return Ok(Some((pid, status))),
        }
    }
}
