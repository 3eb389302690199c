use thiserror::Error;

use crate::core::commands::CommandError;
use crate::core::config::ConfigError;
use crate::parser::ParseError;
use crate::process::ProcessError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    CommandError(#[from] CommandError),
    #[error("Process error: {0}")]
    ProcessError(#[from] ProcessError),
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Flag error: {0}")]
    FlagError(String),
}

impl ShellError {
    /// Errors after which the shell must stop instead of prompting again.
    pub fn is_fatal(&self) -> bool {
        match self {
            ShellError::ProcessError(e) => e.is_fatal(),
            _ => false,
        }
    }
}
