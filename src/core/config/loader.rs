use std::fs;
use std::path::Path;

use super::ConfigError;
use crate::core::commands::Flow;

/// Feeds a startup file to the dispatcher one line at a time.
pub struct ConfigLoader<'a> {
    path: &'a Path,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Runs every line through `run_line`, stopping early on `Flow::Exit`.
    pub fn source<F, E>(&self, mut run_line: F) -> Result<Flow, E>
    where
        F: FnMut(&str) -> Result<Flow, E>,
        E: From<ConfigError>,
    {
        if !self.path.is_file() {
            return Err(ConfigError::ConfigFileNotFound(self.path.display().to_string()).into());
        }
        let content = fs::read_to_string(self.path).map_err(ConfigError::from)?;
        tracing::debug!(path = %self.path.display(), "sourcing startup file");

        for line in content.lines() {
            if run_line(line)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }
}
