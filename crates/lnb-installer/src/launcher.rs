use std::fmt;
use std::path::{Path, PathBuf};

use lnb_core::{CommandLine, NormalizeOptions, Result};

use crate::batch::BatchLauncher;
use crate::fs_utils::{ensure_launcher_dir, remove_launcher, write_launcher_script};
use crate::layout::LnbLayout;
use crate::posix::{AppBundleLauncher, SymlinkLauncher};

/// Which launcher flavour a host uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherPlatform {
    /// Symlinked binaries, bash alias scripts.
    Symlink,
    /// As [`LauncherPlatform::Symlink`], with `.app` bundles launched via `open -a`.
    AppBundle,
    /// `.cmd` wrappers for binaries and `.bat` files for aliases.
    Batch,
}

impl LauncherPlatform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Batch
        } else if cfg!(target_os = "macos") {
            Self::AppBundle
        } else {
            Self::Symlink
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symlink => "symlink",
            Self::AppBundle => "app-bundle",
            Self::Batch => "batch",
        }
    }

    pub fn default_bin_dir(self, layout: &LnbLayout) -> PathBuf {
        match self {
            Self::Symlink | Self::AppBundle => PathBuf::from("/usr/local/bin"),
            Self::Batch => layout.user_bin_dir(),
        }
    }

    pub fn launcher(self, bin_dir: PathBuf, update_user_path: bool) -> Box<dyn Launcher> {
        match self {
            Self::Symlink => Box::new(SymlinkLauncher::new(bin_dir)),
            Self::AppBundle => Box::new(AppBundleLauncher::new(bin_dir)),
            Self::Batch => Box::new(BatchLauncher::new(bin_dir, update_user_path)),
        }
    }
}

impl fmt::Display for LauncherPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates and removes the on-disk artifacts that make a name invocable.
pub trait Launcher {
    fn platform(&self) -> LauncherPlatform;

    fn bin_dir(&self) -> &Path;

    fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::default()
    }

    /// Registration name for a binary at `source`.
    fn binary_name(&self, source: &Path) -> Option<String> {
        source
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
    }

    fn binary_target(&self, name: &str) -> PathBuf {
        self.bin_dir().join(name)
    }

    fn alias_target(&self, name: &str) -> PathBuf {
        self.bin_dir().join(name)
    }

    fn write_binary(&self, source: &Path, target: &Path) -> Result<()>;

    /// Script body that runs `command` with the caller's arguments appended.
    fn render_alias(&self, command: &CommandLine) -> String;

    fn write_alias(&self, command: &CommandLine, target: &Path) -> Result<()> {
        ensure_launcher_dir(self.bin_dir())?;
        write_launcher_script(target, &self.render_alias(command))
    }

    fn remove(&self, target: &Path) -> Result<()> {
        remove_launcher(target)
    }

    /// Follow-up notices after a successful install. Never fails.
    fn after_install(&self) -> Vec<String> {
        Vec::new()
    }
}
