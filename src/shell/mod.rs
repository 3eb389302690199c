use std::io::{self, Write};

mod dispatcher;
mod input;

use crate::{
    core::{
        commands::{CommandRegistry, Flow},
        config::{ConfigLoader, ShellConfig},
        state::ShellState,
    },
    error::ShellError,
    highlight::SyntaxHighlighter,
    process::{JobReaper, ProcessLauncher, SignalModeController},
};

pub use dispatcher::Route;
pub use input::LineReader;

use dispatcher::CommandDispatcher;

/// States of the interactive loop. Parse, route, execute and reap all happen
/// inside `Dispatch`.
#[derive(Debug)]
enum Stage {
    Prompt,
    Dispatch(String),
    Terminate,
}

pub struct Shell<W: Write = io::Stdout> {
    pub(crate) state: ShellState,
    pub(crate) config: ShellConfig,
    pub(crate) commands: CommandRegistry,
    pub(crate) launcher: ProcessLauncher,
    pub(crate) reaper: JobReaper,
    pub(crate) mode: SignalModeController,
    pub(crate) highlighter: SyntaxHighlighter,
    pub(crate) out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(config: ShellConfig, out: W) -> Self {
        let state = ShellState::new();
        let mode = SignalModeController::new(state.mode_flag());

        Shell {
            state,
            config,
            commands: CommandRegistry::new(),
            launcher: ProcessLauncher::new(),
            reaper: JobReaper::new(),
            mode,
            highlighter: SyntaxHighlighter::new(),
            out,
        }
    }

    /// Ignore SIGINT and bind the foreground-only toggle to SIGTSTP.
    pub fn install_signal_handlers(&mut self) -> Result<(), ShellError> {
        self.mode.install()?;
        Ok(())
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Runs one line exactly as if it had been typed at the prompt.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        self.dispatch_line(line)
    }

    /// Runs the configured startup file, if any.
    pub fn source_startup_file(&mut self) -> Result<Flow, ShellError> {
        let Some(path) = self.config.startup_file.clone() else {
            return Ok(Flow::Continue);
        };
        ConfigLoader::new(&path).source(|line| self.dispatch_line(line))
    }

    /// Runs the prompt loop, then shuts down however the loop ended.
    pub fn run(&mut self, input: &mut LineReader) -> Result<(), ShellError> {
        let result = self.cycle(input);
        self.shutdown();
        result
    }

    fn cycle(&mut self, input: &mut LineReader) -> Result<(), ShellError> {
        let mut stage = Stage::Prompt;
        loop {
            stage = match stage {
                Stage::Prompt => match input.read_line(self.prompt()) {
                    Ok(Some(line)) => Stage::Dispatch(line),
                    Ok(None) => Stage::Terminate,
                    // Unreadable input ends the session like end of input.
                    Err(e) => {
                        self.report(&e);
                        Stage::Terminate
                    }
                },
                Stage::Dispatch(line) => match self.dispatch_line(&line)? {
                    Flow::Continue => Stage::Prompt,
                    Flow::Exit => Stage::Terminate,
                },
                Stage::Terminate => return Ok(()),
            };
        }
    }

    /// Sends SIGTERM to every background child that is still tracked.
    pub fn shutdown(&mut self) {
        for pid in self.state.background_pids() {
            tracing::debug!(pid, "terminating background child");
            // SAFETY: plain kill(2) on a pid this shell forked.
            unsafe { libc::kill(pid, libc::SIGTERM) };
        }
        let _ = self.out.flush();
    }

    fn prompt(&self) -> &str {
        if self.config.quiet {
            ""
        } else {
            &self.config.prompt
        }
    }

    fn report(&self, error: &ShellError) {
        eprintln!("{}", self.highlighter.highlight_error(&error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessOutcome, EXEC_FAILURE_CODE};
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::thread;
    use std::time::{Duration, Instant};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("smallsh-shell-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.canonicalize().unwrap()
    }

    fn test_shell(home: PathBuf) -> Shell<Vec<u8>> {
        Shell::new(ShellConfig::with_home(home), Vec::new())
    }

    fn output(shell: &Shell<Vec<u8>>) -> String {
        String::from_utf8_lossy(&shell.out).into_owned()
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let _guard = crate::test_lock();
        let mut shell = test_shell(env::temp_dir());

        assert_eq!(shell.execute_line("").unwrap(), Flow::Continue);
        assert_eq!(shell.execute_line("   ").unwrap(), Flow::Continue);
        assert_eq!(shell.execute_line("# exit").unwrap(), Flow::Continue);
        assert!(output(&shell).is_empty());
    }

    #[test]
    fn test_exit_terminates() {
        let _guard = crate::test_lock();
        let mut shell = test_shell(env::temp_dir());
        assert_eq!(shell.execute_line("exit").unwrap(), Flow::Exit);
    }

    #[test]
    fn test_redirect_then_status() {
        let _guard = crate::test_lock();
        let dir = scratch_dir("redirect");
        let file = dir.join("out.txt");
        let copy = dir.join("copy.txt");
        let mut shell = test_shell(dir.clone());

        shell
            .execute_line(&format!("echo hello > {}", file.display()))
            .unwrap();
        shell
            .execute_line(&format!("cat < {} > {}", file.display(), copy.display()))
            .unwrap();
        shell.execute_line("status").unwrap();

        assert_eq!(fs::read_to_string(&copy).unwrap(), "hello\n");
        assert_eq!(output(&shell), "exit value 0\n");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_pid_expansion_reaches_the_child() {
        let _guard = crate::test_lock();
        let dir = scratch_dir("pid");
        let file = dir.join("pid.txt");
        let mut shell = test_shell(dir.clone());

        shell
            .execute_line(&format!("echo pid$$ > {}", file.display()))
            .unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            format!("pid{}\n", std::process::id())
        );
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_unknown_program_sets_exec_failure_status() {
        let _guard = crate::test_lock();
        let mut shell = test_shell(env::temp_dir());

        assert_eq!(
            shell.execute_line("smallsh-definitely-missing").unwrap(),
            Flow::Continue
        );
        assert_eq!(
            shell.state().exit_status().last(),
            ProcessOutcome::Exited(EXEC_FAILURE_CODE)
        );
        shell.execute_line("status").unwrap();
        assert_eq!(output(&shell), format!("exit value {}\n", EXEC_FAILURE_CODE));
    }

    #[test]
    fn test_parse_errors_are_recoverable() {
        let _guard = crate::test_lock();
        let mut shell = test_shell(env::temp_dir());
        assert_eq!(shell.execute_line("cat <").unwrap(), Flow::Continue);
        assert_eq!(shell.execute_line("> out").unwrap(), Flow::Continue);
    }

    #[test]
    fn test_cd_home_and_missing_target() {
        let _guard = crate::test_lock();
        let original = env::current_dir().unwrap();
        let home = scratch_dir("home");
        let mut shell = test_shell(home.clone());

        shell.execute_line("cd").unwrap();
        assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), home);

        assert_eq!(shell.execute_line("cd /nonexistent").unwrap(), Flow::Continue);
        assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), home);

        env::set_current_dir(original).unwrap();
        fs::remove_dir_all(home).unwrap();
    }

    #[test]
    fn test_background_launch_is_reaped_in_a_later_cycle() {
        let _guard = crate::test_lock();
        let mut shell = test_shell(env::temp_dir());

        shell.execute_line("sleep 1 &").unwrap();
        let pid = shell
            .state()
            .background_pids()
            .next()
            .expect("background pid tracked");
        assert!(output(&shell).starts_with(&format!("background pid is {}\n", pid)));

        let deadline = Instant::now() + Duration::from_secs(10);
        while shell.state().is_tracked(pid) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(50));
            shell.execute_line("").unwrap();
        }

        assert!(!shell.state().is_tracked(pid));
        assert!(output(&shell).contains(&format!("background pid {} is done: exit value 0\n", pid)));
        // Background completions never touch the foreground slot.
        assert_eq!(shell.state().exit_status().last(), ProcessOutcome::Exited(0));
    }

    #[test]
    fn test_foreground_only_mode_downgrades_background_requests() {
        let _guard = crate::test_lock();
        let mut shell = test_shell(env::temp_dir());

        assert!(shell.mode.toggle());
        let line = crate::parser::parse_line("sleep 0 &", 1).unwrap();
        match shell.route(line) {
            Route::External(command) => assert!(!command.is_background()),
            other => panic!("expected an external route, got {:?}", other),
        }

        shell.execute_line("false &").unwrap();
        assert_eq!(shell.state().exit_status().last(), ProcessOutcome::Exited(1));
        assert_eq!(shell.state().background_pids().count(), 0);
        assert!(!output(&shell).contains("background pid"));

        // A second toggle restores normal background handling.
        assert!(!shell.mode.toggle());
        assert!(!shell.state().is_foreground_only());
    }

    /// Accepts everything except completion notices.
    struct NoticeRejectingWriter(Vec<u8>);

    impl Write for NoticeRejectingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if String::from_utf8_lossy(buf).contains("is done") {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_completion_notice_keeps_the_shell_running() {
        let _guard = crate::test_lock();
        let mut shell = Shell::new(
            ShellConfig::with_home(env::temp_dir()),
            NoticeRejectingWriter(Vec::new()),
        );

        assert_eq!(shell.execute_line("true &").unwrap(), Flow::Continue);
        assert_eq!(shell.execute_line("true &").unwrap(), Flow::Continue);
        thread::sleep(Duration::from_millis(500));

        assert_eq!(shell.execute_line("").unwrap(), Flow::Continue);
        assert_eq!(shell.state().background_pids().count(), 0);

        // Later cycles still run commands normally.
        assert_eq!(shell.execute_line("false").unwrap(), Flow::Continue);
        assert_eq!(shell.state().exit_status().last(), ProcessOutcome::Exited(1));
        assert_eq!(shell.execute_line("exit").unwrap(), Flow::Exit);
    }

    #[test]
    fn test_startup_file_runs_before_prompt() {
        let _guard = crate::test_lock();
        let dir = scratch_dir("startup");
        let rc = dir.join(".smallshrc");
        fs::write(&rc, "# startup\nfalse\nstatus\nexit\nstatus\n").unwrap();

        let mut config = ShellConfig::with_home(dir.clone());
        config.startup_file = Some(rc);
        let mut shell = Shell::new(config, Vec::new());

        assert_eq!(shell.source_startup_file().unwrap(), Flow::Exit);
        assert_eq!(output(&shell), "exit value 1\n");
        fs::remove_dir_all(dir).unwrap();
    }
}
