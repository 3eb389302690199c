use std::env;
use std::io::Write;
use std::path::Path;

use super::{Command, CommandContext, CommandError, Flow};

#[derive(Debug, Clone, Default)]
pub struct CdCommand;

impl CdCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for CdCommand {
    fn execute<W: Write>(
        &self,
        args: &[String],
        ctx: &mut CommandContext<'_, W>,
    ) -> Result<Flow, CommandError> {
        let target = args.first().map(Path::new).unwrap_or(ctx.home);

        env::set_current_dir(target).map_err(|e| {
            tracing::debug!(path = %target.display(), error = %e, "cd failed");
            CommandError::DirectoryNotFound {
                command: "cd".to_string(),
                path: target.display().to_string(),
            }
        })?;
        Ok(Flow::Continue)
    }
}
