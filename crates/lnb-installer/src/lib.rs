mod batch;
mod engine;
mod fs_utils;
mod launcher;
mod layout;
mod posix;
mod settings;
mod store;
mod user_path;

pub use batch::{
    render_alias_batch, render_binary_wrapper, BatchLauncher, CommandRunner,
    ALIAS_WRAPPER_EXTENSION, BINARY_WRAPPER_EXTENSION,
};
pub use engine::{validate_name, InstallOutcome, RegistrationEngine, RemoveOutcome};
pub use fs_utils::path_occupied;
pub use launcher::{Launcher, LauncherPlatform};
pub use layout::{default_user_home, LnbLayout};
pub use posix::{render_alias_script, AppBundleLauncher, SymlinkLauncher};
pub use settings::{Settings, SettingsError, SettingsFile, SettingsOverrides};
pub use store::{read_manifest, write_manifest, ManifestStore, StaleCheck};
pub use user_path::{
    append_path_entry, append_to_user_path, ensure_dir_on_user_path, path_list_contains,
    query_user_path, run_command,
};

#[cfg(test)]
mod tests;
