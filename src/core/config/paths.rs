use super::ConfigError;
use std::path::PathBuf;

const RC_FILE: &str = ".smallshrc";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub home: PathBuf,
    pub rc_path: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::from_home(home))
    }

    pub fn from_home(home: PathBuf) -> Self {
        ConfigPaths {
            rc_path: home.join(RC_FILE),
            home,
        }
    }
}
