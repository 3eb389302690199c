use std::io::Write;

use super::{Command, CommandContext, CommandError, Flow};

#[derive(Debug, Clone)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    fn execute<W: Write>(
        &self,
        _args: &[String],
        _ctx: &mut CommandContext<'_, W>,
    ) -> Result<Flow, CommandError> {
        Ok(Flow::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ShellState;
    use std::path::Path;

    #[test]
    fn test_exit_command_ignores_arguments() {
        let state = ShellState::new();
        let mut out = Vec::new();
        let mut ctx = CommandContext {
            state: &state,
            home: Path::new("/"),
            out: &mut out,
        };

        let cmd = ExitCommand::new();
        assert_eq!(cmd.execute(&["3".to_string()], &mut ctx).unwrap(), Flow::Exit);
        assert!(out.is_empty());
    }
}
