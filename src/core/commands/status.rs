use std::io::Write;

use super::{Command, CommandContext, CommandError, Flow};

/// Prints the last foreground outcome without changing it.
#[derive(Debug, Clone, Default)]
pub struct StatusCommand;

impl StatusCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for StatusCommand {
    fn execute<W: Write>(
        &self,
        _args: &[String],
        ctx: &mut CommandContext<'_, W>,
    ) -> Result<Flow, CommandError> {
        writeln!(ctx.out, "{}", ctx.state.exit_status().last())?;
        ctx.out.flush()?;
        Ok(Flow::Continue)
    }
}
