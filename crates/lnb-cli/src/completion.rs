use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;

use crate::{Cli, CliCompletionShell};

pub(crate) fn write_completions_script<W: Write>(
    shell: CliCompletionShell,
    writer: &mut W,
) -> Result<()> {
    let mut command = Cli::command();
    let generator: Shell = shell.into();
    let mut generated = Vec::new();
    clap_complete::generate(generator, &mut command, "lnb", &mut generated);

    writer
        .write_all(&generated)
        .with_context(|| "failed writing generated completion script")?;
    Ok(())
}

fn escape_single_quote_shell(value: &str) -> String {
    value.replace('\'', "'\"'\"'")
}

fn escape_ps_single_quote(value: &str) -> String {
    value.replace('\'', "''")
}

fn detect_shell_from_env(shell_env: Option<&str>) -> Option<CliCompletionShell> {
    let shell_value = shell_env?;
    let shell_token = Path::new(shell_value)
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or(shell_value)
        .to_ascii_lowercase();
    match shell_token.trim_end_matches(".exe") {
        "bash" => Some(CliCompletionShell::Bash),
        "zsh" => Some(CliCompletionShell::Zsh),
        "fish" => Some(CliCompletionShell::Fish),
        "powershell" | "pwsh" => Some(CliCompletionShell::Powershell),
        _ => None,
    }
}

pub(crate) fn resolve_init_shell(
    requested_shell: Option<CliCompletionShell>,
    shell_env: Option<&str>,
    is_windows: bool,
) -> CliCompletionShell {
    if let Some(shell) = requested_shell {
        return shell;
    }
    if let Some(shell) = detect_shell_from_env(shell_env) {
        return shell;
    }
    if is_windows {
        CliCompletionShell::Powershell
    } else {
        CliCompletionShell::Bash
    }
}

/// Shell code that prepends `bin_dir` to PATH unless it is already there.
pub(crate) fn render_init_shell_snippet(bin_dir: &Path, shell: CliCompletionShell) -> String {
    let bin = bin_dir.display().to_string();
    match shell {
        CliCompletionShell::Bash | CliCompletionShell::Zsh => {
            let escaped_bin = escape_single_quote_shell(&bin);
            format!(
                "case \":$PATH:\" in\n  *':{escaped_bin}:'*) ;;\n  *) export PATH='{escaped_bin}':\"$PATH\" ;;\nesac\n"
            )
        }
        CliCompletionShell::Fish => {
            let escaped_bin = escape_single_quote_shell(&bin);
            format!(
                "if not contains -- '{escaped_bin}' $PATH\n    set -gx PATH '{escaped_bin}' $PATH\nend\n"
            )
        }
        CliCompletionShell::Powershell => {
            let escaped_bin = escape_ps_single_quote(&bin);
            format!(
                "if (-not ($env:PATH -split ';' | Where-Object {{ $_ -eq '{escaped_bin}' }})) {{\n  $env:PATH = '{escaped_bin};' + $env:PATH\n}}\n"
            )
        }
    }
}
