use std::io::Write;

use crate::core::commands::{Command, CommandContext, CommandType, Flow};
use crate::error::ShellError;
use crate::parser::{parse_line, CommandDescriptor, Line};

/// Where a parsed line goes.
#[derive(Debug, Clone)]
pub enum Route {
    Skip,
    Builtin(CommandType, Vec<String>),
    External(CommandDescriptor),
}

pub(crate) trait CommandDispatcher {
    /// Parse, route, execute and reap for one line.
    fn dispatch_line(&mut self, line: &str) -> Result<Flow, ShellError>;
    fn route(&self, line: Line) -> Route;
    fn execute(&mut self, route: Route) -> Result<Flow, ShellError>;
}

impl<W: Write> CommandDispatcher for super::Shell<W> {
    fn dispatch_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let result = parse_line(line, self.state.pid())
            .map_err(ShellError::from)
            .and_then(|parsed| {
                let route = self.route(parsed);
                self.execute(route)
            });

        let flow = match result {
            Ok(flow) => flow,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.report(&e);
                Flow::Continue
            }
        };

        if let Err(e) = self.reaper.sweep(&mut self.state, &mut self.out) {
            self.report(&ShellError::from(e));
        }
        Ok(flow)
    }

    fn route(&self, line: Line) -> Route {
        let command = match line {
            Line::Blank | Line::Comment => return Route::Skip,
            Line::Command(command) => command,
        };

        if let Some(builtin) = self.commands.get(command.program()) {
            return Route::Builtin(builtin.clone(), command.args().to_vec());
        }
        // Read the live flag: the mode may have flipped since the line was typed.
        if command.is_background() && self.state.is_foreground_only() {
            return Route::External(command.in_foreground());
        }
        Route::External(command)
    }

    fn execute(&mut self, route: Route) -> Result<Flow, ShellError> {
        match route {
            Route::Skip => Ok(Flow::Continue),
            Route::Builtin(builtin, args) => {
                let mut ctx = CommandContext {
                    state: &self.state,
                    home: &self.config.home,
                    out: &mut self.out,
                };
                Ok(builtin.execute(&args, &mut ctx)?)
            }
            Route::External(command) => {
                self.launcher
                    .launch(&command, &mut self.state, &mut self.out)?;
                Ok(Flow::Continue)
            }
        }
    }
}
