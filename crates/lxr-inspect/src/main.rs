use std::io::{self, BufWriter, IsTerminal, Write};
use std::process::ExitCode;

use lxr_inspect::cli::Cli;
use lxr_inspect::git::GitRepository;
use lxr_inspect::{CommandError, CommandTable};
use tracing::{Level, error};

fn main() -> ExitCode {
    let cli = Cli::new(CommandTable::with_inspection_commands());
    let parsed = match cli.parse(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(error) => {
            if error.print().is_err() {
                return ExitCode::FAILURE;
            }

            return ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(2));
        }
    };

    let level = if parsed.config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let repository = GitRepository::open(&parsed.config);
    let mut out = BufWriter::new(io::stdout().lock());
    let result = cli
        .execute(&parsed, &repository, &mut out)
        .and_then(|()| out.flush().map_err(CommandError::from));

    if let Err(err) = result {
        error!("{err}");

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
