use std::path::PathBuf;

use thiserror::Error;

mod loader;
mod paths;

pub use loader::ConfigLoader;
pub use paths::ConfigPaths;

use crate::flags::Flags;

pub const DEFAULT_PROMPT: &str = ": ";

/// Settings resolved once at startup from flags and the environment.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub prompt: String,
    pub home: PathBuf,
    pub startup_file: Option<PathBuf>,
    pub quiet: bool,
    pub debug: bool,
}

impl ShellConfig {
    pub fn from_flags(flags: &Flags) -> Result<Self, ConfigError> {
        let paths = ConfigPaths::new()?;
        let startup_file = match flags.get_value("config") {
            Some(path) => Some(PathBuf::from(path)),
            None => Some(paths.rc_path).filter(|path| path.is_file()),
        };

        Ok(ShellConfig {
            prompt: DEFAULT_PROMPT.to_string(),
            home: paths.home,
            startup_file,
            quiet: flags.is_set("quiet"),
            debug: flags.is_set("debug"),
        })
    }

    /// A config rooted at `home` with no startup file.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        ShellConfig {
            prompt: DEFAULT_PROMPT.to_string(),
            home: home.into(),
            startup_file: None,
            quiet: false,
            debug: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Home directory not found")]
    HomeDirNotFound,
    #[error("Config file not found: {0}")]
    ConfigFileNotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
