use std::io::{self, BufRead, IsTerminal, Write};

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

use crate::error::ShellError;

/// Where command lines come from.
///
/// A terminal gets a line editor with terminal signals left on, so Ctrl-Z
/// still reaches the shell as SIGTSTP. Anything else is read line by line.
pub enum LineReader {
    Editor(DefaultEditor),
    Stdin(io::Stdin),
}

impl LineReader {
    pub fn new() -> Result<Self, ShellError> {
        if !io::stdin().is_terminal() {
            return Ok(LineReader::Stdin(io::stdin()));
        }
        let config = Config::builder()
            .auto_add_history(true)
            .enable_signals(true)
            .build();
        Ok(LineReader::Editor(DefaultEditor::with_config(config)?))
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        match self {
            LineReader::Editor(editor) => match editor.readline(prompt) {
                Ok(line) => Ok(Some(line)),
                Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
                Err(ReadlineError::Eof) => Ok(None),
                Err(e) => Err(e.into()),
            },
            LineReader::Stdin(stdin) => {
                let mut stdout = io::stdout();
                stdout.write_all(prompt.as_bytes())?;
                stdout.flush()?;
                read_plain_line(&mut stdin.lock())
            }
        }
    }
}

fn read_plain_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, ShellError> {
    let mut line = String::new();
    loop {
        match reader.read_line(&mut line) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            // SIGTSTP landing mid-read.
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}
