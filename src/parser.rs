use std::path::{Path, PathBuf};

use thiserror::Error;

const PID_TOKEN: &str = "$$";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing file name after '{0}'")]
    MissingRedirectTarget(char),
    #[error("missing command")]
    MissingCommand,
}

/// A parsed external or built-in command.
///
/// Built once by [`parse_line`] and never mutated afterwards; the only way to
/// change it is to derive a new descriptor (see [`CommandDescriptor::in_foreground`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    argv: Vec<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    background: bool,
}

impl CommandDescriptor {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            input: None,
            output: None,
            background: false,
        }
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Same command with the background request dropped.
    pub fn in_foreground(&self) -> Self {
        Self {
            background: false,
            ..self.clone()
        }
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn is_background(&self) -> bool {
        self.background
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Blank,
    Comment,
    Command(CommandDescriptor),
}

pub fn parse_line(line: &str, shell_pid: u32) -> Result<Line, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return Ok(Line::Blank);
    };
    if first.starts_with('#') {
        return Ok(Line::Comment);
    }

    let pid = shell_pid.to_string();
    let mut descriptor = CommandDescriptor::new(Vec::<String>::new());
    let mut tokens = tokens.iter().peekable();

    while let Some(&token) = tokens.next() {
        match token {
            "<" => {
                let path = tokens.next().ok_or(ParseError::MissingRedirectTarget('<'))?;
                descriptor.input = Some(PathBuf::from(path));
            }
            ">" => {
                let path = tokens.next().ok_or(ParseError::MissingRedirectTarget('>'))?;
                descriptor.output = Some(PathBuf::from(path));
            }
            "&" if tokens.peek().is_none() => descriptor.background = true,
            word => descriptor.argv.push(word.replace(PID_TOKEN, &pid)),
        }
    }

    if descriptor.argv.is_empty() {
        return Err(ParseError::MissingCommand);
    }
    Ok(Line::Command(descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> CommandDescriptor {
        match parse_line(line, 4242) {
            Ok(Line::Command(cmd)) => cmd,
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("", 1), Ok(Line::Blank));
        assert_eq!(parse_line("   \t ", 1), Ok(Line::Blank));
        assert_eq!(parse_line("# ls -la", 1), Ok(Line::Comment));
        assert_eq!(parse_line("  #comment & > x", 1), Ok(Line::Comment));
    }

    #[test]
    fn test_plain_command() {
        let cmd = command("ls -la /tmp");
        assert_eq!(cmd.program(), "ls");
        assert_eq!(cmd.args(), ["-la", "/tmp"]);
        assert!(cmd.input().is_none());
        assert!(cmd.output().is_none());
        assert!(!cmd.is_background());
    }

    #[test]
    fn test_redirections_and_background() {
        let cmd = command("sort < in.txt > out.txt &");
        assert_eq!(cmd.argv(), ["sort"]);
        assert_eq!(cmd.input(), Some(Path::new("in.txt")));
        assert_eq!(cmd.output(), Some(Path::new("out.txt")));
        assert!(cmd.is_background());
    }

    #[test]
    fn test_ampersand_only_counts_when_trailing() {
        let cmd = command("echo a & b");
        assert_eq!(cmd.argv(), ["echo", "a", "&", "b"]);
        assert!(!cmd.is_background());
    }

    #[test]
    fn test_last_redirection_wins() {
        let cmd = command("cat < a < b > c > d");
        assert_eq!(cmd.input(), Some(Path::new("b")));
        assert_eq!(cmd.output(), Some(Path::new("d")));
    }

    #[test]
    fn test_pid_substitution() {
        assert_eq!(command("echo pid$$").argv(), ["echo", "pid4242"]);
        assert_eq!(command("echo $$-$$").argv(), ["echo", "4242-4242"]);
        assert_eq!(command("echo $").argv(), ["echo", "$"]);
        // Paths are taken literally.
        assert_eq!(command("ls > out$$").output(), Some(Path::new("out$$")));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_line("cat <", 1),
            Err(ParseError::MissingRedirectTarget('<'))
        );
        assert_eq!(
            parse_line("ls >", 1),
            Err(ParseError::MissingRedirectTarget('>'))
        );
        assert_eq!(parse_line("> out.txt", 1), Err(ParseError::MissingCommand));
        assert_eq!(parse_line("&", 1), Err(ParseError::MissingCommand));
    }

    #[test]
    fn test_in_foreground_keeps_everything_else() {
        let cmd = command("sleep 5 > log &");
        let fg = cmd.in_foreground();
        assert!(cmd.is_background());
        assert!(!fg.is_background());
        assert_eq!(fg.argv(), cmd.argv());
        assert_eq!(fg.output(), cmd.output());
    }
}
