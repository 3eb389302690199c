use smallsh::core::commands::Flow;
use smallsh::core::config::ShellConfig;
use smallsh::error::ShellError;
use smallsh::flags::Flags;
use smallsh::shell::{LineReader, Shell};
use std::env;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("smallsh: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("smallsh {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ShellConfig::from_flags(&flags)?;
    init_tracing(config.debug);

    let mut shell = Shell::new(config, io::stdout());
    shell.install_signal_handlers()?;

    if shell.source_startup_file()? == Flow::Exit {
        shell.shutdown();
        return Ok(());
    }

    let mut input = LineReader::new()?;
    shell.run(&mut input)
}

// SMALLSH_LOG overrides the level, e.g. SMALLSH_LOG=smallsh=debug.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SMALLSH_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}
