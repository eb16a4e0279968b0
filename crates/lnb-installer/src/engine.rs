use std::path::{Path, PathBuf};

use lnb_core::{
    normalize_alias_command, resolve_binary_path, CommandContext, Entry, EntryKind, LnbError,
    Result,
};
use tracing::{info, warn};

use crate::fs_utils::path_occupied;
use crate::launcher::Launcher;
use crate::store::{ManifestStore, StaleCheck};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub name: String,
    pub kind: EntryKind,
    /// Binary path, or the alias command as given.
    pub source: String,
    /// The command the alias launcher runs; `None` for binaries.
    pub command: Option<String>,
    pub target: PathBuf,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub name: String,
    pub kind: EntryKind,
    pub target: PathBuf,
    pub warnings: Vec<String>,
}

/// Ties the normalizer, manifest store and launcher together.
///
/// Install: reconcile stale entry, check name, check target, write launcher,
/// record entry. Remove: check entry and target, delete launcher, drop entry.
/// A launcher that cannot be deleted leaves the manifest untouched.
/// Manifest saves that fail after the launcher changed are warnings.
pub struct RegistrationEngine {
    store: ManifestStore,
    launcher: Box<dyn Launcher>,
    context: CommandContext,
}

impl RegistrationEngine {
    pub fn new(store: ManifestStore, launcher: Box<dyn Launcher>, context: CommandContext) -> Self {
        Self {
            store,
            launcher,
            context,
        }
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    pub fn install_binary(&mut self, raw_path: &str) -> Result<InstallOutcome> {
        let source = resolve_binary_path(raw_path, &self.context)?;
        let name = self
            .launcher
            .binary_name(&source)
            .ok_or_else(|| LnbError::InvalidName {
                name: raw_path.to_string(),
                reason: "path has no usable file name",
            })?;
        validate_name(&name)?;
        let target = self.launcher.binary_target(&name);

        let mut warnings = self.prepare_install(EntryKind::Binary, &name, &target)?;
        self.launcher.write_binary(&source, &target)?;
        info!(name = %name, source = %source.display(), target = %target.display(), "installed binary");

        warnings.extend(self.record(Entry::binary(&name, &source, &target)));
        warnings.extend(self.launcher.after_install());
        Ok(InstallOutcome {
            name,
            kind: EntryKind::Binary,
            source: source.display().to_string(),
            command: None,
            target,
            warnings,
        })
    }

    pub fn install_alias(&mut self, name: &str, raw_command: &str) -> Result<InstallOutcome> {
        validate_name(name)?;
        let normalized =
            normalize_alias_command(raw_command, &self.context, self.launcher.normalize_options())?;
        let target = self.launcher.alias_target(name);

        let mut warnings = self.prepare_install(EntryKind::Alias, name, &target)?;
        self.launcher.write_alias(&normalized.command, &target)?;
        info!(
            name,
            command = %normalized.command,
            target = %target.display(),
            "installed alias"
        );

        warnings.extend(self.record(Entry::alias(name, &normalized.original, &target)));
        warnings.extend(self.launcher.after_install());
        Ok(InstallOutcome {
            name: name.to_string(),
            kind: EntryKind::Alias,
            source: normalized.original,
            command: Some(normalized.command.to_string()),
            target,
            warnings,
        })
    }

    /// Accepts a registered name or the path the binary was installed from.
    pub fn remove_binary(&mut self, name_or_path: &str) -> Result<RemoveOutcome> {
        let trimmed = name_or_path.trim();
        let name = self
            .launcher
            .binary_name(Path::new(trimmed))
            .ok_or_else(|| LnbError::NotInstalled {
                kind: EntryKind::Binary,
                name: trimmed.to_string(),
            })?;
        let expected = self.launcher.binary_target(&name);
        self.remove(EntryKind::Binary, &name, expected)
    }

    pub fn remove_alias(&mut self, name: &str) -> Result<RemoveOutcome> {
        let expected = self.launcher.alias_target(name);
        self.remove(EntryKind::Alias, name, expected)
    }

    /// All entries, sorted by name.
    pub fn list(&mut self) -> Result<Vec<Entry>> {
        self.store.list()
    }

    fn prepare_install(&mut self, kind: EntryKind, name: &str, target: &Path) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        match self.store.reconcile_stale(name)? {
            StaleCheck::Absent => {}
            StaleCheck::Live(existing) => {
                return Err(LnbError::AlreadyInstalled {
                    kind: existing.kind(),
                    name: name.to_string(),
                });
            }
            StaleCheck::Repaired {
                warnings: repaired, ..
            } => warnings.extend(repaired),
        }

        let occupied = path_occupied(target)?;
        if let Some(owner) = self.store.owner_of_target(target)? {
            if occupied {
                return Err(LnbError::TargetClaimed {
                    path: target.to_path_buf(),
                    owner: owner.name,
                });
            }
            if let StaleCheck::Repaired {
                warnings: repaired, ..
            } = self.store.reconcile_stale(&owner.name)?
            {
                warnings.extend(repaired);
            }
        }
        if occupied {
            return Err(LnbError::TargetExists {
                kind,
                name: name.to_string(),
                path: target.to_path_buf(),
            });
        }

        Ok(warnings)
    }

    fn record(&mut self, entry: Entry) -> Vec<String> {
        let name = entry.name.clone();
        if let Err(err) = self.store.put(entry).and_then(|()| self.store.save()) {
            warn!(name = %name, error = %err, "launcher written but manifest not updated");
            return vec![format!(
                "launcher for '{name}' was created but the manifest could not be updated: {err}"
            )];
        }
        Vec::new()
    }

    fn remove(&mut self, kind: EntryKind, name: &str, expected: PathBuf) -> Result<RemoveOutcome> {
        let entry = match self.store.get(name)? {
            Some(entry) if entry.kind() == kind => entry,
            _ => {
                return Err(LnbError::NotInstalled {
                    kind,
                    name: name.to_string(),
                })
            }
        };
        if entry.target_path != expected {
            return Err(LnbError::TargetMismatch {
                kind,
                name: name.to_string(),
                expected,
                found: entry.target_path,
            });
        }

        // A failed delete keeps the entry so the artifact stays tracked.
        self.launcher.remove(&expected)?;
        info!(name, target = %expected.display(), "removed launcher");

        let mut warnings = Vec::new();
        self.store.delete(name)?;
        if let Err(err) = self.store.save() {
            warn!(name, error = %err, "launcher removed but manifest not updated");
            warnings.push(format!(
                "launcher for '{name}' was removed but the manifest could not be updated: {err}"
            ));
        }

        Ok(RemoveOutcome {
            name: name.to_string(),
            kind,
            target: expected,
            warnings,
        })
    }
}

/// A name becomes a file name inside the launcher directory.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "name must not be empty"
    } else if name == "." || name == ".." {
        "name must not be a relative directory"
    } else if name.contains(['/', '\\']) {
        "name must not contain path separators"
    } else if name.chars().any(char::is_control) {
        "name must not contain control characters"
    } else {
        return Ok(());
    };

    Err(LnbError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
