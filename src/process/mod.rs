use std::fmt;

use thiserror::Error;

pub mod launcher;
pub mod reaper;
pub mod signal;

pub use launcher::{Launched, ProcessLauncher};
pub use reaper::{JobReaper, Reaped};
pub use signal::SignalModeController;

/// Child exit code when a redirection cannot be opened or bound.
pub const SETUP_FAILURE_CODE: i32 = 1;
/// Child exit code when the program image cannot be loaded.
pub const EXEC_FAILURE_CODE: i32 = 2;

pub type Pid = libc::pid_t;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("cannot create process: {0}")]
    Fork(#[source] std::io::Error),
    #[error("cannot wait for process {pid}: {source}")]
    Wait {
        pid: Pid,
        #[source]
        source: std::io::Error,
    },
    #[error("argument contains a NUL byte: {0:?}")]
    InvalidArgument(String),
    #[error("no program to run")]
    EmptyCommand,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// Whether the shell can no longer guarantee correct operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Fork(_))
    }
}

/// Why a child stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited(i32),
    KilledBySignal(i32),
}

impl Default for ProcessOutcome {
    fn default() -> Self {
        ProcessOutcome::Exited(0)
    }
}

impl ProcessOutcome {
    /// Decodes a raw `waitpid` status. Stop/continue reports yield `None`.
    pub fn from_wait_status(status: libc::c_int) -> Option<Self> {
        if libc::WIFEXITED(status) {
            Some(ProcessOutcome::Exited(libc::WEXITSTATUS(status)))
        } else if libc::WIFSIGNALED(status) {
            Some(ProcessOutcome::KilledBySignal(libc::WTERMSIG(status)))
        } else {
            None
        }
    }
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOutcome::Exited(code) => write!(f, "exit value {}", code),
            ProcessOutcome::KilledBySignal(signum) => {
                write!(f, "terminated by signal {}", signum)
            }
        }
    }
}
