use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lnb_core::{Entry, LnbError, Manifest, Result};
use tracing::{debug, warn};

use crate::fs_utils::path_occupied;

/// Reads the manifest at `path`. A missing or empty file is an empty manifest.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Manifest::default()),
        Err(err) => return Err(LnbError::filesystem("read", path, err)),
    };
    if raw.trim().is_empty() {
        return Ok(Manifest::default());
    }

    Manifest::from_json_str(&raw).map_err(|source| LnbError::ManifestCorrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrites the manifest at `path`, creating its parent directory on demand.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| LnbError::filesystem("create directory", parent, err))?;
    }

    let rendered = manifest
        .to_json_string()
        .map_err(|err| LnbError::filesystem("serialize manifest for", path, err.into()))?;
    fs::write(path, rendered.as_bytes()).map_err(|err| LnbError::filesystem("write", path, err))
}

/// Result of checking a name for a manifest entry whose launcher is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleCheck {
    Absent,
    Live(Entry),
    Repaired { entry: Entry, warnings: Vec<String> },
}

/// The manifest file plus a lazily loaded copy of its contents.
///
/// Every mutation goes through the cached copy; [`ManifestStore::save`]
/// rewrites the whole file from it. Nothing is written until a save.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    manifest: Option<Manifest>,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            manifest: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> Result<&Manifest> {
        let manifest: &Manifest = self.loaded()?;
        Ok(manifest)
    }

    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        let manifest = self.loaded()?;
        write_manifest(&path, manifest)?;
        debug!(path = %path.display(), entries = manifest.len(), "saved manifest");
        Ok(())
    }

    pub fn get(&mut self, name: &str) -> Result<Option<Entry>> {
        Ok(self.loaded()?.get(name).cloned())
    }

    pub fn put(&mut self, entry: Entry) -> Result<()> {
        self.loaded()?.put(entry);
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<Option<Entry>> {
        Ok(self.loaded()?.delete(name))
    }

    pub fn list(&mut self) -> Result<Vec<Entry>> {
        Ok(self.loaded()?.list())
    }

    pub fn owner_of_target(&mut self, target: &Path) -> Result<Option<Entry>> {
        Ok(self.loaded()?.owner_of_target(target).cloned())
    }

    /// Drops the entry for `name` when its launcher no longer exists, and
    /// persists the manifest without it. A failed save is reported as a
    /// warning; the in-memory manifest stays repaired either way.
    pub fn reconcile_stale(&mut self, name: &str) -> Result<StaleCheck> {
        let Some(entry) = self.get(name)? else {
            return Ok(StaleCheck::Absent);
        };
        if path_occupied(&entry.target_path)? {
            return Ok(StaleCheck::Live(entry));
        }

        warn!(
            name,
            target = %entry.target_path.display(),
            "manifest entry points at a missing launcher; dropping it"
        );
        let mut warnings = vec![format!(
            "manifest shows '{name}' as installed but launcher {} does not exist; cleaned up the stale entry",
            entry.target_path.display()
        )];

        self.delete(name)?;
        if let Err(err) = self.save() {
            warn!(error = %err, "failed to persist stale entry cleanup");
            warnings.push(format!("failed to persist manifest cleanup: {err}"));
        }

        Ok(StaleCheck::Repaired { entry, warnings })
    }

    fn loaded(&mut self) -> Result<&mut Manifest> {
        if self.manifest.is_none() {
            let manifest = read_manifest(&self.path)?;
            debug!(
                path = %self.path.display(),
                entries = manifest.len(),
                "loaded manifest"
            );
            self.manifest = Some(manifest);
        }
        Ok(self.manifest.get_or_insert_with(Manifest::default))
    }
}
