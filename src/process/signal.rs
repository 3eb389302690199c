use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use libc::{c_int, sighandler_t, SIGINT, SIGTSTP, SIG_DFL, SIG_ERR, SIG_IGN};
use signal_hook::low_level;
use signal_hook::SigId;

const ENTER_MESSAGE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_MESSAGE: &[u8] = b"\nExiting foreground-only mode\n";

/// Flips foreground-only mode on every SIGTSTP.
///
/// The registered handler touches nothing but the shared flag and a raw
/// `write(2)` of a static message, both async-signal-safe.
pub struct SignalModeController {
    flag: Arc<AtomicBool>,
    registration: Option<SigId>,
}

impl SignalModeController {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self {
            flag,
            registration: None,
        }
    }

    /// Binds the toggle to SIGTSTP and makes the shell ignore SIGINT.
    pub fn install(&mut self) -> io::Result<()> {
        if self.registration.is_some() {
            return Ok(());
        }
        ignore_interrupt()?;

        let flag = Arc::clone(&self.flag);
        // SAFETY: the action only performs an atomic RMW and write(2).
        let id = unsafe {
            low_level::register(SIGTSTP, move || {
                toggle_mode(&flag);
            })?
        };
        self.registration = Some(id);
        tracing::debug!("foreground-only toggle bound to SIGTSTP");
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.registration.is_some()
    }

    /// Runs the handler's toggle directly, so the mode can be flipped
    /// without delivering a real SIGTSTP. Returns the new mode.
    pub fn toggle(&self) -> bool {
        toggle_mode(&self.flag)
    }
}

impl Drop for SignalModeController {
    fn drop(&mut self) {
        if let Some(id) = self.registration.take() {
            low_level::unregister(id);
        }
    }
}

fn toggle_mode(flag: &AtomicBool) -> bool {
    let entering = !flag.fetch_xor(true, Ordering::SeqCst);
    let message = if entering { ENTER_MESSAGE } else { EXIT_MESSAGE };
    // SAFETY: static buffer, unbuffered write straight to fd 1.
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            message.as_ptr().cast(),
            message.len(),
        );
    }
    entering
}

fn ignore_interrupt() -> io::Result<()> {
    set_disposition(SIGINT, SIG_IGN)
}

/// Child-side dispositions: SIGINT back to default, SIGTSTP ignored.
///
/// Only raw `signal(2)` calls, so it is safe between `fork` and `exec`.
pub(crate) fn reset_for_child() -> io::Result<()> {
    set_disposition(SIGINT, SIG_DFL)?;
    set_disposition(SIGTSTP, SIG_IGN)
}

fn set_disposition(signum: c_int, handler: sighandler_t) -> io::Result<()> {
    // SAFETY: installing SIG_IGN/SIG_DFL has no handler code to run.
    if unsafe { libc::signal(signum, handler) } == SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
