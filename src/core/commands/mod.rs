use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

mod builtin;
mod cd;
mod status;

pub use builtin::ExitCommand;
pub use cd::CdCommand;
pub use status::StatusCommand;

use crate::core::state::ShellState;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{command}: {path}: directory not found")]
    DirectoryNotFound { command: String, path: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Whether the dispatcher keeps cycling after a built-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// What a built-in may see of the running shell.
pub struct CommandContext<'a, W: Write> {
    pub state: &'a ShellState,
    pub home: &'a Path,
    pub out: &'a mut W,
}

pub trait Command {
    fn execute<W: Write>(
        &self,
        args: &[String],
        ctx: &mut CommandContext<'_, W>,
    ) -> Result<Flow, CommandError>;
}

#[derive(Debug, Clone)]
pub enum CommandType {
    Cd(CdCommand),
    Status(StatusCommand),
    Exit(ExitCommand),
}

impl Command for CommandType {
    fn execute<W: Write>(
        &self,
        args: &[String],
        ctx: &mut CommandContext<'_, W>,
    ) -> Result<Flow, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args, ctx),
            CommandType::Status(cmd) => cmd.execute(args, ctx),
            CommandType::Exit(cmd) => cmd.execute(args, ctx),
        }
    }
}

/// Name to built-in lookup.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandType>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd".to_string(), CommandType::Cd(CdCommand::new()));
        commands.insert(
            "status".to_string(),
            CommandType::Status(StatusCommand::new()),
        );
        commands.insert("exit".to_string(), CommandType::Exit(ExitCommand::new()));
        Self { commands }
    }

    pub fn get(&self, name: &str) -> Option<&CommandType> {
        self.commands.get(name)
    }
}
