use std::io;
use std::path::{Path, PathBuf};

use lnb_core::{CommandLine, LnbError, NormalizeOptions, Result};
use tracing::debug;

use crate::fs_utils::ensure_launcher_dir;
use crate::launcher::{Launcher, LauncherPlatform};

pub fn render_alias_script(command: &CommandLine) -> String {
    format!("#!/bin/bash\n{command} \"$@\"\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkLauncher {
    bin_dir: PathBuf,
}

impl SymlinkLauncher {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }
}

impl Launcher for SymlinkLauncher {
    fn platform(&self) -> LauncherPlatform {
        LauncherPlatform::Symlink
    }

    fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    fn write_binary(&self, source: &Path, target: &Path) -> Result<()> {
        ensure_launcher_dir(&self.bin_dir)?;
        create_symlink(source, target)?;
        debug!(source = %source.display(), target = %target.display(), "created symlink");
        Ok(())
    }

    fn render_alias(&self, command: &CommandLine) -> String {
        render_alias_script(command)
    }
}

/// Symlink launcher whose alias commands may name `.app` bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppBundleLauncher {
    inner: SymlinkLauncher,
}

impl AppBundleLauncher {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: SymlinkLauncher::new(bin_dir),
        }
    }
}

impl Launcher for AppBundleLauncher {
    fn platform(&self) -> LauncherPlatform {
        LauncherPlatform::AppBundle
    }

    fn bin_dir(&self) -> &Path {
        self.inner.bin_dir()
    }

    fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            app_bundle_launch: true,
            ..NormalizeOptions::default()
        }
    }

    fn write_binary(&self, source: &Path, target: &Path) -> Result<()> {
        self.inner.write_binary(source, target)
    }

    fn render_alias(&self, command: &CommandLine) -> String {
        render_alias_script(command)
    }
}

fn create_symlink(source: &Path, target: &Path) -> Result<()> {
    #[cfg(unix)]
    let created = std::os::unix::fs::symlink(source, target);

    #[cfg(windows)]
    let created = std::os::windows::fs::symlink_file(source, target);

    #[cfg(not(any(unix, windows)))]
    let created: io::Result<()> = Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot link {}: no symlink support", source.display()),
    ));

    created.map_err(|err: io::Error| LnbError::filesystem("create symlink at", target, err))
}
