use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lnb_core::{absolutize, CommandContext};
use lnb_installer::{
    default_user_home, LauncherPlatform, LnbLayout, RegistrationEngine, Settings,
    SettingsOverrides,
};
use tracing::debug;

use crate::completion::{render_init_shell_snippet, resolve_init_shell, write_completions_script};
use crate::render::{
    current_output_style, format_install_lines, format_list_lines, format_remove_lines,
    print_lines, print_warnings,
};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let output_style = current_output_style(cli.plain);
    let overrides = SettingsOverrides {
        bin_dir: cli.bin_dir,
        manifest_path: cli.manifest,
    };

    match cli.command {
        Commands::Install { path } => {
            let mut engine = open_engine(&overrides)?;
            let outcome = engine.install_binary(&path)?;
            print_lines(&format_install_lines(&outcome, output_style));
            print_warnings(output_style, &outcome.warnings);
        }
        Commands::Remove { name } => {
            let mut engine = open_engine(&overrides)?;
            let outcome = engine.remove_binary(&name)?;
            print_lines(&format_remove_lines(&outcome, output_style));
            print_warnings(output_style, &outcome.warnings);
        }
        Commands::Alias { name, command } => {
            let mut engine = open_engine(&overrides)?;
            let outcome = engine.install_alias(&name, &command.join(" "))?;
            print_lines(&format_install_lines(&outcome, output_style));
            print_warnings(output_style, &outcome.warnings);
        }
        Commands::Unalias { name } => {
            let mut engine = open_engine(&overrides)?;
            let outcome = engine.remove_alias(&name)?;
            print_lines(&format_remove_lines(&outcome, output_style));
            print_warnings(output_style, &outcome.warnings);
        }
        Commands::List => {
            let entries = open_engine(&overrides)?.list()?;
            print_lines(&format_list_lines(&entries, output_style));
        }
        Commands::Completions { shell } => {
            let mut stdout = std::io::stdout();
            write_completions_script(shell, &mut stdout)?;
        }
        Commands::InitShell { shell } => {
            let (settings, _) = load_settings(&overrides)?;
            let resolved_shell =
                resolve_init_shell(shell, std::env::var("SHELL").ok().as_deref(), cfg!(windows));
            print!(
                "{}",
                render_init_shell_snippet(&settings.bin_dir, resolved_shell)
            );
        }
    }

    Ok(())
}

fn open_engine(overrides: &SettingsOverrides) -> Result<RegistrationEngine> {
    let (settings, context) = load_settings(overrides)?;
    Ok(settings.engine(context))
}

fn load_settings(overrides: &SettingsOverrides) -> Result<(Settings, CommandContext)> {
    let home = default_user_home().with_context(|| {
        if cfg!(windows) {
            "USERPROFILE is not set; cannot resolve the lnb state directory"
        } else {
            "HOME is not set; cannot resolve the lnb state directory"
        }
    })?;
    let cwd = std::env::current_dir().context("failed to resolve the current directory")?;

    let overrides = absolute_overrides(overrides, &cwd);
    let layout = LnbLayout::new(&home);
    let settings = Settings::load(&layout, LauncherPlatform::current(), &overrides)?;
    debug!(
        platform = %settings.platform,
        cwd = %cwd.display(),
        "prepared registration session"
    );
    Ok((settings, CommandContext::new(cwd, Some(home))))
}

fn absolute_overrides(overrides: &SettingsOverrides, cwd: &Path) -> SettingsOverrides {
    let absolute = |path: &PathBuf| absolutize(cwd, path);
    SettingsOverrides {
        bin_dir: overrides.bin_dir.as_ref().map(absolute),
        manifest_path: overrides.manifest_path.as_ref().map(absolute),
    }
}
