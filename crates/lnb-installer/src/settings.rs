use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lnb_core::CommandContext;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::engine::RegistrationEngine;
use crate::launcher::LauncherPlatform;
use crate::layout::LnbLayout;
use crate::store::ManifestStore;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of the optional `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub bin_dir: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub update_user_path: bool,
}

impl SettingsFile {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw, path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line; these win over the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub bin_dir: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub platform: LauncherPlatform,
    pub bin_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub update_user_path: bool,
}

impl Settings {
    pub fn load(
        layout: &LnbLayout,
        platform: LauncherPlatform,
        overrides: &SettingsOverrides,
    ) -> Result<Self, SettingsError> {
        let file = SettingsFile::load(&layout.settings_path())?;
        Ok(Self::resolve(layout, platform, &file, overrides))
    }

    pub fn resolve(
        layout: &LnbLayout,
        platform: LauncherPlatform,
        file: &SettingsFile,
        overrides: &SettingsOverrides,
    ) -> Self {
        let bin_dir = overrides
            .bin_dir
            .clone()
            .or_else(|| file.bin_dir.as_deref().map(|dir| layout.expand_home(dir)))
            .unwrap_or_else(|| platform.default_bin_dir(layout));
        let manifest_path = overrides
            .manifest_path
            .clone()
            .or_else(|| {
                file.manifest_path
                    .as_deref()
                    .map(|path| layout.expand_home(path))
            })
            .unwrap_or_else(|| layout.manifest_path());

        debug!(
            %platform,
            bin_dir = %bin_dir.display(),
            manifest = %manifest_path.display(),
            "resolved settings"
        );
        Self {
            platform,
            bin_dir,
            manifest_path,
            update_user_path: file.update_user_path,
        }
    }

    pub fn engine(&self, context: CommandContext) -> RegistrationEngine {
        RegistrationEngine::new(
            ManifestStore::new(&self.manifest_path),
            self.platform
                .launcher(self.bin_dir.clone(), self.update_user_path),
            context,
        )
    }
}
