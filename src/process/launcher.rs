use std::ffi::{CString, OsStr};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use libc::{c_char, c_int, O_CLOEXEC, O_CREAT, O_RDONLY, O_TRUNC, O_WRONLY};

use super::{signal, Pid, ProcessError, ProcessOutcome, EXEC_FAILURE_CODE, SETUP_FAILURE_CODE};
use crate::core::state::ShellState;
use crate::parser::CommandDescriptor;

const OUTPUT_MODE: libc::c_uint = 0o644;
const DEV_NULL: &str = "/dev/null";

/// What the parent knows once `launch` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    Background(Pid),
    Foreground(Pid, ProcessOutcome),
}

/// Forks one child per external command and execs it.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    pub fn launch<W: Write>(
        &self,
        command: &CommandDescriptor,
        state: &mut ShellState,
        out: &mut W,
    ) -> Result<Launched, ProcessError> {
        let background = command.is_background() && !state.is_foreground_only();
        let plan = ChildPlan::prepare(command, background)?;

        // Anything still buffered would otherwise be duplicated into the child.
        out.flush()?;
        io::stdout().flush()?;

        // SAFETY: the child only runs ChildPlan::run, which is limited to
        // signal(2), open(2), dup2(2), close(2), write(2), execvp(3) and _exit(2).
        let pid = unsafe { libc::fork() };
        match pid {
            -1 => Err(ProcessError::Fork(io::Error::last_os_error())),
            0 => plan.run(),
            pid => {
                tracing::debug!(pid, program = command.program(), background, "launched child");
                if background {
                    state.track_background(pid);
                    writeln!(out, "background pid is {}", pid)?;
                    out.flush()?;
                    return Ok(Launched::Background(pid));
                }

                let outcome = wait_for(pid)?;
                state.record_foreground(outcome);
                if let ProcessOutcome::KilledBySignal(_) = outcome {
                    writeln!(out, "{}", outcome)?;
                    out.flush()?;
                }
                tracing::debug!(pid, %outcome, "foreground child finished");
                Ok(Launched::Foreground(pid, outcome))
            }
        }
    }
}

/// Blocks until `pid` terminates.
fn wait_for(pid: Pid) -> Result<ProcessOutcome, ProcessError> {
    let mut status: c_int = 0;
    loop {
        // SAFETY: status is a valid out-pointer.
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
        if rc == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(ProcessError::Wait { pid, source: err });
        }
        if let Some(outcome) = ProcessOutcome::from_wait_status(status) {
            return Ok(outcome);
        }
    }
}

/// A redirection resolved to C strings before forking.
struct Redirect {
    path: CString,
    flags: c_int,
    target: c_int,
    open_failed: Vec<u8>,
    bind_failed: Vec<u8>,
}

impl Redirect {
    fn input(path: &Path) -> Result<Self, ProcessError> {
        Self::new(path, O_RDONLY, libc::STDIN_FILENO, "input")
    }

    fn output(path: &Path) -> Result<Self, ProcessError> {
        Self::new(path, O_WRONLY | O_CREAT | O_TRUNC, libc::STDOUT_FILENO, "output")
    }

    fn new(path: &Path, flags: c_int, target: c_int, stream: &str) -> Result<Self, ProcessError> {
        let display = path.display();
        Ok(Self {
            path: c_string(path.as_os_str())?,
            flags: flags | O_CLOEXEC,
            target,
            open_failed: format!("cannot open {} for {}\n", display, stream).into_bytes(),
            bind_failed: format!("cannot bind {} to standard {}\n", display, stream).into_bytes(),
        })
    }

    /// Opens the file, moves it onto the target stream and closes the original.
    fn bind(&self) -> Result<(), ChildFailure<'_>> {
        // SAFETY: path is NUL-terminated and outlives the call.
        let fd = unsafe { libc::open(self.path.as_ptr(), self.flags, OUTPUT_MODE) };
        if fd == -1 {
            return Err(ChildFailure::Setup(&self.open_failed));
        }
        // SAFETY: fd was just opened and is owned here.
        unsafe {
            if fd != self.target {
                let bound = libc::dup2(fd, self.target);
                libc::close(fd);
                if bound == -1 {
                    return Err(ChildFailure::Setup(&self.bind_failed));
                }
            } else {
                // Already in place; keep it across exec.
                libc::fcntl(fd, libc::F_SETFD, 0);
            }
        }
        Ok(())
    }
}

enum ChildFailure<'a> {
    Setup(&'a [u8]),
    Exec(&'a [u8]),
}

impl ChildFailure<'_> {
    fn exit_code(&self) -> c_int {
        match self {
            ChildFailure::Setup(_) => SETUP_FAILURE_CODE,
            ChildFailure::Exec(_) => EXEC_FAILURE_CODE,
        }
    }

    fn message(&self) -> &[u8] {
        match self {
            ChildFailure::Setup(msg) | ChildFailure::Exec(msg) => msg,
        }
    }
}

/// Everything the child needs, allocated in the parent.
struct ChildPlan {
    argv: Vec<CString>,
    argv_ptrs: Vec<*const c_char>,
    stdin: Option<Redirect>,
    stdout: Option<Redirect>,
    signal_failed: Vec<u8>,
    not_found: Vec<u8>,
}

impl ChildPlan {
    fn prepare(command: &CommandDescriptor, background: bool) -> Result<Self, ProcessError> {
        if command.argv().is_empty() {
            return Err(ProcessError::EmptyCommand);
        }
        let argv = command
            .argv()
            .iter()
            .map(|arg| c_string(OsStr::new(arg)))
            .collect::<Result<Vec<_>, _>>()?;
        // The CString buffers are heap allocated, so these stay valid as argv moves.
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();

        let stdin = match command.input() {
            Some(path) => Some(Redirect::input(path)?),
            None if background => Some(Redirect::input(Path::new(DEV_NULL))?),
            None => None,
        };
        let stdout = command.output().map(Redirect::output).transpose()?;

        Ok(Self {
            argv,
            argv_ptrs,
            stdin,
            stdout,
            signal_failed: b"cannot reset signal handling\n".to_vec(),
            not_found: format!("{}: no such file or directory\n", command.program()).into_bytes(),
        })
    }

    /// Child side of the fork. Never returns.
    fn run(&self) -> ! {
        let failure = match self.configure().and_then(|()| self.bind_redirections()) {
            Ok(()) => self.replace_image(),
            Err(failure) => failure,
        };
        // SAFETY: raw write of a prepared buffer, then exit without running
        // the parent's atexit handlers or flushing its copied buffers.
        unsafe {
            let msg = failure.message();
            libc::write(libc::STDERR_FILENO, msg.as_ptr().cast(), msg.len());
            libc::_exit(failure.exit_code())
        }
    }

    fn configure(&self) -> Result<(), ChildFailure<'_>> {
        signal::reset_for_child().map_err(|_| ChildFailure::Setup(&self.signal_failed))
    }

    fn bind_redirections(&self) -> Result<(), ChildFailure<'_>> {
        if let Some(stdin) = &self.stdin {
            stdin.bind()?;
        }
        if let Some(stdout) = &self.stdout {
            stdout.bind()?;
        }
        Ok(())
    }

    /// Only comes back if exec failed.
    fn replace_image(&self) -> ChildFailure<'_> {
        // SAFETY: argv_ptrs is a NULL-terminated array into the live argv strings.
        unsafe { libc::execvp(self.argv[0].as_ptr(), self.argv_ptrs.as_ptr()) };
        ChildFailure::Exec(&self.not_found)
    }
}

fn c_string(value: &OsStr) -> Result<CString, ProcessError> {
    CString::new(value.as_bytes())
        .map_err(|_| ProcessError::InvalidArgument(value.to_string_lossy().into_owned()))
}
