pub mod error;
pub mod flags;
pub mod shell;

pub mod core;
pub mod highlight;
pub mod parser;
pub mod process;

pub use crate::core::commands::Flow;
pub use crate::core::config::ShellConfig;
pub use crate::shell::{LineReader, Shell};

#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    // Forking, reaping and chdir are process-wide; tests touching them take turns.
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
