mod completion;
mod dispatch;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use crate::dispatch::run_cli;
use crate::render::{current_output_style, paint_status_line};

const LOG_ENV_VAR: &str = "LNB_LOG";

#[derive(Parser, Debug)]
#[command(name = "lnb", version)]
#[command(
    about = "Register binaries and shell commands as launchers on your PATH",
    long_about = None
)]
struct Cli {
    /// Directory launchers are written to.
    #[arg(long, global = true, value_name = "DIR")]
    bin_dir: Option<PathBuf>,
    /// Manifest file tracking installed launchers.
    #[arg(long, global = true, value_name = "FILE")]
    manifest: Option<PathBuf>,
    /// Disable badges and colours.
    #[arg(long, global = true)]
    plain: bool,
    /// Log more; repeat for debug output.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register an executable under its file name.
    Install { path: String },
    /// Unregister a binary by name or by the path it was installed from.
    Remove { name: String },
    /// Register a shell command under a new name.
    Alias {
        name: String,
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        command: Vec<String>,
    },
    /// Unregister an alias.
    Unalias { name: String },
    /// Show registered binaries and aliases.
    List,
    /// Print a completion script.
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
    /// Print the snippet that puts the launcher directory on PATH.
    InitShell {
        #[arg(long, value_enum)]
        shell: Option<CliCompletionShell>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CliCompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl From<CliCompletionShell> for Shell {
    fn from(value: CliCompletionShell) -> Self {
        match value {
            CliCompletionShell::Bash => Shell::Bash,
            CliCompletionShell::Zsh => Shell::Zsh,
            CliCompletionShell::Fish => Shell::Fish,
            CliCompletionShell::Powershell => Shell::PowerShell,
        }
    }
}

fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output_style = current_output_style(cli.plain);

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "{}",
                paint_status_line(output_style, "error", &format!("{err:#}"))
            );
            ExitCode::FAILURE
        }
    }
}
