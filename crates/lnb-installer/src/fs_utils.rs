use std::fs;
use std::io;
use std::path::Path;

use lnb_core::{LnbError, Result};

/// Whether anything sits at `path`, without following a final symlink.
///
/// A dangling launcher symlink counts as present. Treating it as stale would
/// drop its entry while the link still blocks the target, leaving an artifact
/// nothing tracks; `lnb remove` deletes such a link instead.
pub fn path_occupied(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(LnbError::filesystem("inspect", path, err)),
    }
}

pub fn ensure_launcher_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| LnbError::filesystem("create directory", dir, err))
}

/// Writes a launcher script and marks it executable (0755) where modes exist.
pub fn write_launcher_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body.as_bytes()).map_err(|err| LnbError::filesystem("write", path, err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|err| LnbError::filesystem("set permissions on", path, err))?;
    }

    Ok(())
}

pub fn remove_launcher(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|err| LnbError::filesystem("remove", path, err))
}
