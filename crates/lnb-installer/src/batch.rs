use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use lnb_core::{CommandLine, NormalizeOptions, Result};
use tracing::debug;

use crate::fs_utils::{ensure_launcher_dir, write_launcher_script};
use crate::launcher::{Launcher, LauncherPlatform};
use crate::user_path::{ensure_dir_on_user_path, run_command};

pub const BINARY_WRAPPER_EXTENSION: &str = "cmd";
pub const ALIAS_WRAPPER_EXTENSION: &str = "bat";

pub type CommandRunner = fn(&mut Command) -> io::Result<String>;

pub fn render_binary_wrapper(source: &Path) -> String {
    format!("@echo off\r\n\"{}\" %*\r\n", source.display())
}

pub fn render_alias_batch(command: &CommandLine) -> String {
    format!("@echo off\r\n{command} %*\r\n")
}

#[derive(Debug, Clone)]
pub struct BatchLauncher {
    bin_dir: PathBuf,
    update_user_path: bool,
    run_command: CommandRunner,
}

impl BatchLauncher {
    pub fn new(bin_dir: impl Into<PathBuf>, update_user_path: bool) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            update_user_path,
            run_command,
        }
    }

    /// Replaces the runner used for the user PATH queries.
    pub fn with_command_runner(mut self, run_command: CommandRunner) -> Self {
        self.run_command = run_command;
        self
    }
}

impl Launcher for BatchLauncher {
    fn platform(&self) -> LauncherPlatform {
        LauncherPlatform::Batch
    }

    fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            backslash_separators: true,
            ..NormalizeOptions::default()
        }
    }

    fn binary_name(&self, source: &Path) -> Option<String> {
        source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
    }

    fn binary_target(&self, name: &str) -> PathBuf {
        self.bin_dir
            .join(format!("{name}.{BINARY_WRAPPER_EXTENSION}"))
    }

    fn alias_target(&self, name: &str) -> PathBuf {
        self.bin_dir.join(format!("{name}.{ALIAS_WRAPPER_EXTENSION}"))
    }

    fn write_binary(&self, source: &Path, target: &Path) -> Result<()> {
        ensure_launcher_dir(&self.bin_dir)?;
        write_launcher_script(target, &render_binary_wrapper(source))?;
        debug!(source = %source.display(), target = %target.display(), "wrote binary wrapper");
        Ok(())
    }

    fn render_alias(&self, command: &CommandLine) -> String {
        render_alias_batch(command)
    }

    fn after_install(&self) -> Vec<String> {
        ensure_dir_on_user_path(&self.bin_dir, self.update_user_path, self.run_command)
    }
}
