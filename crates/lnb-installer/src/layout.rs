use std::path::{Path, PathBuf};

/// Per-user state locations, all derived from the home/profile directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnbLayout {
    home: PathBuf,
}

impl LnbLayout {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn state_dir(&self) -> PathBuf {
        self.home.join(".lnb")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.state_dir().join("config.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.state_dir().join("settings.toml")
    }

    pub fn user_bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    /// Expands a leading `~/` against the home directory.
    pub fn expand_home(&self, path: &Path) -> PathBuf {
        match path.strip_prefix("~") {
            Ok(rest) if path.as_os_str() != "~" => self.home.join(rest),
            _ => path.to_path_buf(),
        }
    }
}

/// `USERPROFILE` on Windows, `HOME` elsewhere. Empty values count as unset.
pub fn default_user_home() -> Option<PathBuf> {
    let variable = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(variable)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
