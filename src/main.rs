mod app;
mod logging;

use clap::Parser;
use emberly_library::run::ClassStatus;
use std::path::PathBuf;
use std::process::ExitCode;

/// Keep symlink directories of trending movies, series and anime in sync
/// with what is actually in the local Emby library.
#[derive(Debug, Parser)]
#[command(name = "emberly", version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML, TOML or JSON). Defaults to `config.yaml` in
    /// the platform configuration directory, if present.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report what would change without touching any target directory.
    #[arg(long)]
    dry_run: bool,

    /// Ignore cached snapshots and fetch everything again.
    #[arg(long)]
    force: bool,

    /// More logging (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}
impl Cli {
    fn flags(&self) -> app::Flags {
        app::Flags { config: self.config.clone(), dry_run: self.dry_run, force: self.force }
    }
}

/// Exit status when the run completed but at least one class failed.
const CLASS_FAILED: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match app::execute(&cli.flags()).await {
        Ok(summary) if summary.has_failures() => {
            for report in summary.classes.iter().filter(|report| report.status == ClassStatus::Failed) {
                tracing::error!(class = %report.class, notes = ?report.notes, "Class failed");
            }
            ExitCode::from(CLASS_FAILED)
        },
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "{}", *e);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["emberly", "--config", "/etc/emberly.yaml", "--dry-run", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.flags(),
            app::Flags { config: Some(PathBuf::from("/etc/emberly.yaml")), dry_run: true, force: false }
        );
    }

    #[rstest]
    #[case(&["emberly", "-v", "-q"])]
    #[case(&["emberly", "--unknown"])]
    fn test_rejected_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
