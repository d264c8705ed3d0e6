//! Command-line host: exposes registered commands as clap subcommands.

use std::ffi::OsString;
use std::io::Write;

use clap::{Arg, ArgMatches, Args, Command, FromArgMatches};

use crate::command::{CommandDescriptor, CommandError, CommandTable, Invocation};
use crate::config::Config;
use crate::host::Repository;

const BIN_NAME: &str = "lxr-inspect";

/// A parsed command line, ready to dispatch.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub config: Config,
    pub command: &'static str,
    pub invocation: Invocation,
}

/// Argument parser and dispatcher built from a [`CommandTable`].
#[derive(Debug)]
pub struct Cli {
    table: CommandTable,
}

impl Cli {
    pub fn new(table: CommandTable) -> Self {
        Self { table }
    }

    /// Builds the clap command tree, one subcommand per descriptor.
    pub fn command(&self) -> Command {
        let root = Command::new(BIN_NAME)
            .about("Inspect directories and file sizes at any revision")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true);

        self.table
            .commands()
            .iter()
            .fold(Config::augment_args(root), |root, descriptor| {
                root.subcommand(subcommand(descriptor))
            })
    }

    /// Parses `args` (program name first).
    ///
    /// # Errors
    /// Returns the clap error for invalid input, `--help` and `--version`.
    pub fn parse<I, T>(&self, args: I) -> Result<ParsedCommand, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        let config = Config::from_arg_matches(&matches)?;
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(self
                .command()
                .error(clap::error::ErrorKind::MissingSubcommand, "no command given"));
        };
        let Some(descriptor) = self.table.find(name) else {
            return Err(self
                .command()
                .error(clap::error::ErrorKind::InvalidSubcommand, name));
        };

        Ok(ParsedCommand {
            config,
            command: descriptor.name,
            invocation: invocation_from_matches(descriptor, sub_matches),
        })
    }

    /// Runs a parsed command against `repository`.
    ///
    /// # Errors
    /// Returns whatever the command handler fails with.
    pub fn execute(
        &self,
        parsed: &ParsedCommand,
        repository: &dyn Repository,
        out: &mut dyn Write,
    ) -> Result<(), CommandError> {
        self.table
            .dispatch(parsed.command, repository, &parsed.invocation, out)
    }
}

fn subcommand(descriptor: &CommandDescriptor) -> Command {
    let command = Command::new(descriptor.name)
        .about(descriptor.about)
        .override_usage(format!("{BIN_NAME} {}", descriptor.synopsis));

    let command = descriptor.options.iter().fold(command, |command, option| {
        command.arg(
            Arg::new(option.long)
                .short(option.short)
                .long(option.long)
                .value_name(option.value_name)
                .default_value(option.default)
                .help(option.help),
        )
    });

    descriptor
        .positionals
        .iter()
        .enumerate()
        .fold(command, |command, (index, positional)| {
            command.arg(
                Arg::new(positional.name)
                    .index(index + 1)
                    .required(positional.default.is_none())
                    .help(positional.help),
            )
        })
}

/// Starts from schema defaults and overlays every value clap parsed.
fn invocation_from_matches(descriptor: &CommandDescriptor, matches: &ArgMatches) -> Invocation {
    let mut invocation = Invocation::with_defaults(descriptor);
    let names = descriptor
        .options
        .iter()
        .map(|option| option.long)
        .chain(descriptor.positionals.iter().map(|positional| positional.name));

    for name in names {
        if let Some(value) = matches.get_one::<String>(name) {
            invocation.set(name, value.clone());
        }
    }

    invocation
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::error::ErrorKind;

    use super::*;
    use crate::host::{FileNode, Manifest, MockRepository, Revision};
    use crate::path::PathEncoding;

    fn cli() -> Cli {
        Cli::new(CommandTable::with_inspection_commands())
    }

    #[test]
    fn test_command_tree_is_consistent() {
        cli().command().debug_assert();
    }

    #[test]
    fn test_parse_ls_onelevel_defaults() {
        // Arrange
        let args = ["lxr-inspect", "ls-onelevel"];

        // Act
        let parsed = cli().parse(args).expect("Failed to parse");

        // Assert
        assert_eq!(parsed.command, "ls-onelevel");
        assert_eq!(parsed.invocation.get("rev").ok(), Some("."));
        assert_eq!(parsed.invocation.get("path").ok(), Some(""));
        assert_eq!(parsed.config, Config::default());
    }

    #[test]
    fn test_parse_options_and_globals() {
        // Arrange
        let args = [
            "lxr-inspect",
            "-R",
            "/srv/repo",
            "fsize",
            "--rev",
            "v1.0",
            "src/main.rs",
            "--path-encoding",
            "plain",
            "-v",
        ];

        // Act
        let parsed = cli().parse(args).expect("Failed to parse");

        // Assert
        assert_eq!(parsed.command, "fsize");
        assert_eq!(parsed.invocation.get("rev").ok(), Some("v1.0"));
        assert_eq!(parsed.invocation.get("path").ok(), Some("src/main.rs"));
        assert_eq!(parsed.config.repository, PathBuf::from("/srv/repo"));
        assert_eq!(parsed.config.path_encoding, PathEncoding::Plain);
        assert!(parsed.config.verbose);
    }

    #[test]
    fn test_parse_short_rev() {
        // Arrange
        let args = ["lxr-inspect", "ls-onelevel", "-r", "abc123", "src"];

        // Act
        let parsed = cli().parse(args).expect("Failed to parse");

        // Assert
        assert_eq!(parsed.invocation.get("rev").ok(), Some("abc123"));
        assert_eq!(parsed.invocation.get("path").ok(), Some("src"));
    }

    #[test]
    fn test_parse_rejects_unknown_subcommand() {
        // Arrange
        let args = ["lxr-inspect", "cat", "readme.md"];

        // Act
        let result = cli().parse(args);

        // Assert
        assert_eq!(
            result.map(|parsed| parsed.command).map_err(|error| error.kind()),
            Err(ErrorKind::InvalidSubcommand)
        );
    }

    #[test]
    fn test_execute_dispatches_to_handler() {
        // Arrange
        let cli = cli();
        let parsed = cli
            .parse(["lxr-inspect", "ls-onelevel"])
            .expect("Failed to parse");
        let mut repository = MockRepository::new();
        repository
            .expect_resolve_revision()
            .returning(|_| Ok(Revision::new("c0ffee")));
        repository.expect_manifest().returning(|_| {
            Ok([
                ("src/a.txt", FileNode::new("h1")),
                ("readme.md", FileNode::new("h3")),
            ]
            .into_iter()
            .collect::<Manifest>())
        });
        repository
            .expect_decode_path()
            .returning(|encoded| encoded.to_string());
        let mut out = Vec::new();

        // Act
        cli.execute(&parsed, &repository, &mut out)
            .expect("Failed to execute");

        // Assert
        assert_eq!(String::from_utf8_lossy(&out), "src/\nreadme.md\n");
    }
}
