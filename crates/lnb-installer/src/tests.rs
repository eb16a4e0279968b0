use super::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use lnb_core::{CommandContext, Entry, EntryKind, LnbError, Manifest};

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn build_test_root_path(nanos: u128) -> PathBuf {
    let mut path = std::env::temp_dir();
    let sequence = TEST_ROOT_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!(
        "lnb-installer-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        sequence
    ));
    path
}

fn test_root() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let root = build_test_root_path(nanos);
    fs::create_dir_all(root.join("work")).expect("must create work dir");
    root
}

fn manifest_path(root: &Path) -> PathBuf {
    root.join("state").join("config.json")
}

fn context(root: &Path) -> CommandContext {
    CommandContext::new(root.join("work"), Some(root.join("home")))
}

fn symlink_engine(root: &Path) -> RegistrationEngine {
    RegistrationEngine::new(
        ManifestStore::new(manifest_path(root)),
        Box::new(SymlinkLauncher::new(root.join("bin"))),
        context(root),
    )
}

fn runner_without_launcher_dir(_command: &mut Command) -> io::Result<String> {
    Ok(r"C:\Windows\system32;C:\Tools".to_string())
}

fn batch_engine(root: &Path) -> RegistrationEngine {
    RegistrationEngine::new(
        ManifestStore::new(manifest_path(root)),
        Box::new(
            BatchLauncher::new(root.join("bin"), false)
                .with_command_runner(runner_without_launcher_dir),
        ),
        context(root),
    )
}

fn write_executable(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("must create parent dir");
    }
    fs::write(path, b"#!/bin/sh\necho ok\n").expect("must write executable");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .expect("must set executable mode");
    }
}

fn command_args(command: &Command) -> Vec<String> {
    command
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn build_test_root_path_disambiguates_same_timestamp_calls() {
    assert_ne!(build_test_root_path(7), build_test_root_path(7));
}

#[cfg(unix)]
#[test]
fn install_binary_links_launcher_and_records_entry() {
    let root = test_root();
    let source = root.join("work").join("tool");
    write_executable(&source);
    let mut engine = symlink_engine(&root);

    let outcome = engine.install_binary("tool").expect("must install");
    assert_eq!(outcome.name, "tool");
    assert_eq!(outcome.kind, EntryKind::Binary);
    assert_eq!(outcome.target, root.join("bin").join("tool"));
    assert_eq!(outcome.source, source.display().to_string());
    assert!(outcome.command.is_none());
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(
        fs::read_link(&outcome.target).expect("launcher must be a symlink"),
        source
    );

    let manifest = read_manifest(&manifest_path(&root)).expect("must read manifest");
    let entry = manifest.get("tool").expect("entry must be recorded");
    assert_eq!(entry.source_path, source.display().to_string());
    assert_eq!(entry.target_path, outcome.target);

    let _ = fs::remove_dir_all(&root);
}

#[cfg(unix)]
#[test]
fn install_binary_twice_is_already_installed() {
    let root = test_root();
    write_executable(&root.join("work").join("tool"));
    let mut engine = symlink_engine(&root);

    engine.install_binary("tool").expect("first install");
    let err = engine.install_binary("./tool").expect_err("second install must fail");
    assert!(
        matches!(&err, LnbError::AlreadyInstalled { kind: EntryKind::Binary, name } if name == "tool"),
        "{err}"
    );
    assert!(err.to_string().contains("lnb remove tool"));

    let _ = fs::remove_dir_all(&root);
}

#[cfg(unix)]
#[test]
fn reinstall_after_launcher_deleted_repairs_stale_entry() {
    let root = test_root();
    write_executable(&root.join("work").join("tool"));
    let mut engine = symlink_engine(&root);

    let first = engine.install_binary("tool").expect("first install");
    fs::remove_file(&first.target).expect("must delete launcher out of band");

    let second = engine
        .install_binary("tool")
        .expect("install after external delete must succeed");
    assert!(
        second
            .warnings
            .iter()
            .any(|warning| warning.contains("does not exist")),
        "{:?}",
        second.warnings
    );
    assert!(fs::symlink_metadata(&second.target).is_ok());

    let manifest = read_manifest(&manifest_path(&root)).expect("must read manifest");
    assert_eq!(manifest.len(), 1);
    assert!(manifest.get("tool").is_some());

    let _ = fs::remove_dir_all(&root);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_still_counts_as_live_launcher() {
    let root = test_root();
    let source = root.join("work").join("tool");
    write_executable(&source);
    let mut engine = symlink_engine(&root);

    let installed = engine.install_binary("tool").expect("must install");
    fs::remove_file(&source).expect("must delete real binary");
    assert!(!installed.target.exists(), "launcher must now dangle");
    write_executable(&root.join("work").join("other").join("tool"));

    let err = engine
        .install_binary("other/tool")
        .expect_err("launcher is still present");
    assert!(matches!(err, LnbError::AlreadyInstalled { .. }));

    let _ = fs::remove_dir_all(&root);
}

#[cfg(unix)]
#[test]
fn remove_binary_accepts_name_or_source_path() {
    let root = test_root();
    let source = root.join("work").join("tool");
    write_executable(&source);
    let mut engine = symlink_engine(&root);

    let installed = engine.install_binary("tool").expect("must install");
    let removed = engine
        .remove_binary(&source.display().to_string())
        .expect("must remove by path");
    assert_eq!(removed.name, "tool");
    assert_eq!(removed.target, installed.target);
    assert!(removed.warnings.is_empty());
    assert!(fs::symlink_metadata(&installed.target).is_err());
    assert!(source.exists(), "real binary must be left alone");
    assert!(read_manifest(&manifest_path(&root))
        .expect("must read manifest")
        .is_empty());

    engine.install_binary("tool").expect("must install again");
    engine.remove_binary("tool").expect("must remove by name");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn remove_unknown_name_is_not_installed_and_touches_nothing() {
    let root = test_root();
    let mut engine = symlink_engine(&root);

    let err = engine.remove_binary("ghost").expect_err("must fail");
    assert!(matches!(err, LnbError::NotInstalled { kind: EntryKind::Binary, .. }));
    let err = engine.remove_alias("ghost").expect_err("must fail");
    assert!(matches!(err, LnbError::NotInstalled { kind: EntryKind::Alias, .. }));

    assert!(!manifest_path(&root).exists(), "manifest must not be created");
    assert!(!root.join("state").exists());
    assert!(!root.join("bin").exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn remove_with_mismatched_target_leaves_everything_in_place() {
    let root = test_root();
    let recorded = root.join("elsewhere").join("rg");
    fs::create_dir_all(recorded.parent().expect("must have parent")).expect("must create dir");
    fs::write(&recorded, b"launcher").expect("must write launcher");

    let mut manifest = Manifest::default();
    manifest.put(Entry::binary("rg", Path::new("/opt/rg/rg"), &recorded));
    write_manifest(&manifest_path(&root), &manifest).expect("must write manifest");

    let mut engine = symlink_engine(&root);
    let err = engine.remove_binary("rg").expect_err("must fail");
    match err {
        LnbError::TargetMismatch {
            expected, found, ..
        } => {
            assert_eq!(expected, root.join("bin").join("rg"));
            assert_eq!(found, recorded);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(recorded.exists());
    let persisted = read_manifest(&manifest_path(&root)).expect("must read manifest");
    assert!(persisted.get("rg").is_some());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn install_refuses_unmanaged_file_at_target() {
    let root = test_root();
    write_executable(&root.join("work").join("tool"));
    let occupied = root.join("bin").join("tool");
    fs::create_dir_all(occupied.parent().expect("must have parent")).expect("must create dir");
    fs::write(&occupied, b"someone else's").expect("must write file");

    let mut engine = symlink_engine(&root);
    let err = engine.install_binary("tool").expect_err("must fail");
    assert!(matches!(&err, LnbError::TargetExists { path, .. } if *path == occupied));
    assert!(err.to_string().contains("remove it manually"));
    assert_eq!(
        fs::read(&occupied).expect("must read file"),
        b"someone else's".to_vec()
    );
    assert!(!manifest_path(&root).exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn install_refuses_target_recorded_for_another_name() {
    let root = test_root();
    write_executable(&root.join("work").join("tool"));
    let target = root.join("bin").join("tool");
    fs::create_dir_all(target.parent().expect("must have parent")).expect("must create dir");
    fs::write(&target, b"launcher").expect("must write launcher");

    let mut manifest = Manifest::default();
    manifest.put(Entry::binary("other", Path::new("/opt/other"), &target));
    write_manifest(&manifest_path(&root), &manifest).expect("must write manifest");

    let mut engine = symlink_engine(&root);
    let err = engine.install_binary("tool").expect_err("must fail");
    assert!(
        matches!(&err, LnbError::TargetClaimed { owner, .. } if owner == "other"),
        "{err}"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn stale_record_under_another_name_is_dropped_on_install() {
    let root = test_root();
    write_executable(&root.join("work").join("tool"));
    let target = root.join("bin").join("tool");

    let mut manifest = Manifest::default();
    manifest.put(Entry::alias("other", "echo hi", &target));
    write_manifest(&manifest_path(&root), &manifest).expect("must write manifest");

    let mut engine = symlink_engine(&root);
    let outcome = engine
        .install_alias("tool", "echo hello")
        .expect("stale claim must not block install");
    assert_eq!(outcome.warnings.len(), 1, "{:?}", outcome.warnings);

    let persisted = read_manifest(&manifest_path(&root)).expect("must read manifest");
    assert!(persisted.get("other").is_none());
    assert!(persisted.get("tool").is_some());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn alias_scenario_records_original_and_forwards_arguments() {
    let root = test_root();
    let mut engine = symlink_engine(&root);

    let outcome = engine
        .install_alias("logs", "tail -f /var/log/x.log")
        .expect("must install alias");
    assert_eq!(outcome.kind, EntryKind::Alias);
    assert_eq!(outcome.source, "tail -f /var/log/x.log");
    assert_eq!(outcome.command.as_deref(), Some("tail -f /var/log/x.log"));
    assert_eq!(outcome.target, root.join("bin").join("logs"));

    let listed = engine.list().expect("must list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].kind(), EntryKind::Alias);
    assert_eq!(listed[0].source_path, "alias:tail -f /var/log/x.log");

    let script = fs::read_to_string(&outcome.target).expect("must read script");
    assert_eq!(script, "#!/bin/bash\ntail -f /var/log/x.log \"$@\"\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&outcome.target)
            .expect("must stat script")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    let _ = fs::remove_dir_all(&root);
}

#[cfg(unix)]
#[test]
fn alias_launcher_runs_normalized_command() {
    let root = test_root();
    let script = root.join("work").join("scripts").join("run.sh");
    write_executable(&script);
    let mut engine = symlink_engine(&root);

    let outcome = engine
        .install_alias("run", "./scripts/run.sh --fast")
        .expect("must install alias");
    assert_eq!(outcome.source, "./scripts/run.sh --fast");

    let body = fs::read_to_string(&outcome.target).expect("must read script");
    assert_eq!(
        body,
        format!("#!/bin/bash\n{} --fast \"$@\"\n", script.display())
    );
    let entry = engine
        .list()
        .expect("must list")
        .into_iter()
        .find(|entry| entry.name == "run")
        .expect("must record alias");
    assert_eq!(entry.display_source(), "./scripts/run.sh --fast");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn alias_and_binary_share_one_namespace() {
    let root = test_root();
    let mut engine = symlink_engine(&root);
    let alias = engine.install_alias("x", "echo x").expect("must install");

    let err = engine.remove_binary("x").expect_err("alias is not a binary");
    assert!(matches!(err, LnbError::NotInstalled { kind: EntryKind::Binary, .. }));
    assert!(alias.target.exists());

    let err = engine.install_alias("x", "echo y").expect_err("name is taken");
    assert!(err.to_string().contains("lnb unalias x"), "{err}");

    let removed = engine.remove_alias("x").expect("must remove alias");
    assert_eq!(removed.kind, EntryKind::Alias);
    assert!(!alias.target.exists());
    assert!(engine.list().expect("must list").is_empty());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn remove_with_missing_launcher_fails_and_keeps_entry() {
    let root = test_root();
    let mut engine = symlink_engine(&root);
    let alias = engine.install_alias("gone", "echo gone").expect("must install");
    fs::remove_file(&alias.target).expect("must delete launcher");

    let err = engine.remove_alias("gone").expect_err("remove must fail");
    assert!(
        matches!(err, LnbError::Filesystem { operation: "remove", .. }),
        "{err}"
    );
    let manifest = read_manifest(&manifest_path(&root)).expect("must read manifest");
    assert!(manifest.get("gone").is_some());

    // The next install of the name is where the stale entry gets repaired.
    let reinstalled = engine
        .install_alias("gone", "echo again")
        .expect("must reinstall");
    assert_eq!(reinstalled.warnings.len(), 1);
    assert!(reinstalled.warnings[0].contains("cleaned up the stale entry"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn remove_failure_leaves_persisted_entry_untouched() {
    let root = test_root();
    let mut engine = symlink_engine(&root);
    let alias = engine
        .install_alias("logs", "tail -f /var/log/x.log")
        .expect("must install");

    fs::remove_file(&alias.target).expect("must delete launcher");
    fs::create_dir_all(&alias.target).expect("must create directory in its place");
    fs::write(alias.target.join("keep"), b"x").expect("must populate directory");

    let err = engine.remove_alias("logs").expect_err("remove must fail");
    assert!(err.to_string().starts_with("failed to remove"), "{err}");
    assert!(alias.target.join("keep").exists());

    let mut fresh = ManifestStore::new(manifest_path(&root));
    let entry = fresh
        .get("logs")
        .expect("must read manifest")
        .expect("entry must remain");
    assert_eq!(entry.target_path, alias.target);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn install_reports_manifest_save_failure_as_warning() {
    let root = test_root();
    let mut engine = symlink_engine(&root);
    assert!(engine.list().expect("must load empty manifest").is_empty());

    // The manifest directory can no longer be created once its path is a file.
    fs::write(root.join("state"), b"not a directory").expect("must block state dir");

    let outcome = engine
        .install_alias("logs", "echo logs")
        .expect("install must still succeed");
    assert!(outcome.target.exists(), "launcher must be written");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(
        outcome.warnings[0]
            .starts_with("launcher for 'logs' was created but the manifest could not be updated"),
        "{}",
        outcome.warnings[0]
    );
    assert!(root.join("state").is_file());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn invalid_alias_names_are_rejected_before_any_write() {
    let root = test_root();
    let mut engine = symlink_engine(&root);

    for name in ["", "  ", ".", "..", "a/b", r"a\b", "tab\tname"] {
        let err = engine
            .install_alias(name, "echo hi")
            .expect_err("invalid name must fail");
        assert!(matches!(err, LnbError::InvalidName { .. }), "{name:?}: {err}");
    }
    assert!(!root.join("bin").exists());
    assert!(!manifest_path(&root).exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn validate_name_accepts_ordinary_names() {
    for name in ["rg", "my-tool", "tool.v2", "x_1"] {
        validate_name(name).expect("name must be accepted");
    }
}

#[test]
fn failed_alias_normalization_writes_nothing() {
    let root = test_root();
    let mut engine = symlink_engine(&root);

    let err = engine
        .install_alias("bad", "rm|x")
        .expect_err("dangerous command must fail");
    assert!(matches!(err, LnbError::DangerousCharacters { .. }));
    let err = engine
        .install_alias("missing", "./nope.sh")
        .expect_err("missing program must fail");
    assert!(matches!(err, LnbError::CommandNotFound { .. }));
    assert!(!root.join("bin").exists());
    assert!(!manifest_path(&root).exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn batch_launcher_writes_cmd_and_bat_wrappers() {
    let root = test_root();
    let source = root.join("work").join("tool.exe");
    write_executable(&source);
    let mut engine = batch_engine(&root);

    let binary = engine.install_binary("tool.exe").expect("must install binary");
    assert_eq!(binary.name, "tool");
    assert_eq!(binary.target, root.join("bin").join("tool.cmd"));
    assert_eq!(
        fs::read_to_string(&binary.target).expect("must read wrapper"),
        format!("@echo off\r\n\"{}\" %*\r\n", source.display())
    );
    assert!(
        binary
            .warnings
            .iter()
            .any(|warning| warning.contains("is not on your user PATH")),
        "{:?}",
        binary.warnings
    );

    let alias = engine
        .install_alias("logs", "tail -f x")
        .expect("must install alias");
    assert_eq!(alias.target, root.join("bin").join("logs.bat"));
    assert_eq!(
        fs::read_to_string(&alias.target).expect("must read batch file"),
        "@echo off\r\ntail -f x %*\r\n"
    );

    engine.remove_binary("tool").expect("must remove by stem");
    assert!(!binary.target.exists());
    engine.remove_alias("logs").expect("must remove alias");
    assert!(!alias.target.exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn batch_launcher_checks_foreign_manifest_targets() {
    let root = test_root();
    let mut manifest = Manifest::default();
    manifest.put(Entry::binary(
        "tool",
        Path::new("/opt/tool"),
        "/usr/local/bin/tool",
    ));
    write_manifest(&manifest_path(&root), &manifest).expect("must write manifest");

    let mut engine = batch_engine(&root);
    let err = engine.remove_binary("tool").expect_err("posix record must not match");
    assert!(matches!(err, LnbError::TargetMismatch { .. }));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn render_helpers_produce_expected_bodies() {
    let command = lnb_core::CommandLine::new(vec![
        lnb_core::Token::bare("echo"),
        lnb_core::Token::parse("'a b'"),
    ]);
    assert_eq!(
        render_alias_script(&command),
        "#!/bin/bash\necho 'a b' \"$@\"\n"
    );
    assert_eq!(render_alias_batch(&command), "@echo off\r\necho 'a b' %*\r\n");
    assert_eq!(
        render_binary_wrapper(Path::new("/opt/My Tool/run")),
        "@echo off\r\n\"/opt/My Tool/run\" %*\r\n"
    );
}

#[test]
fn manifest_store_load_never_creates_files() {
    let root = test_root();
    let path = manifest_path(&root);
    let mut store = ManifestStore::new(&path);

    assert!(store.load().expect("must load").is_empty());
    assert!(store.get("x").expect("must get").is_none());
    assert!(store.delete("x").expect("must delete").is_none());
    assert!(!path.exists());
    assert!(!root.join("state").exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn manifest_store_save_of_load_is_a_fixed_point() {
    let root = test_root();
    let path = manifest_path(&root);

    let mut store = ManifestStore::new(&path);
    store
        .put(Entry::binary("rg", Path::new("/opt/rg/rg"), "/usr/local/bin/rg"))
        .expect("must put");
    store
        .put(Entry::alias("logs", "tail -f x.log", "/usr/local/bin/logs"))
        .expect("must put");
    store.save().expect("must save");
    let first = fs::read(&path).expect("must read manifest");

    let mut reopened = ManifestStore::new(&path);
    reopened.load().expect("must load");
    reopened.save().expect("must save");
    assert_eq!(fs::read(&path).expect("must read manifest"), first);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn manifest_store_rewrites_legacy_list_as_map() {
    let root = test_root();
    let path = manifest_path(&root);
    fs::create_dir_all(path.parent().expect("must have parent")).expect("must create dir");
    fs::write(
        &path,
        r#"{"version":"1.0","entries":[{"name":"rg","source_path":"/opt/rg","target_path":"/usr/local/bin/rg","installed_at":"2024-01-02T03:04:05Z"}]}"#,
    )
    .expect("must write legacy manifest");

    let mut store = ManifestStore::new(&path);
    assert_eq!(store.load().expect("must load").len(), 1);
    store.save().expect("must save");

    let rewritten = fs::read_to_string(&path).expect("must read manifest");
    assert!(rewritten.contains("\"rg\": {"), "{rewritten}");
    assert!(rewritten.contains("\"installed_at\": \"2024-01-02T03:04:05Z\""));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn manifest_store_reports_corrupt_manifest() {
    let root = test_root();
    let path = manifest_path(&root);
    fs::create_dir_all(path.parent().expect("must have parent")).expect("must create dir");
    fs::write(&path, b"{ not json").expect("must write manifest");

    let mut store = ManifestStore::new(&path);
    let err = store.load().expect_err("corrupt manifest must fail");
    assert!(matches!(err, LnbError::ManifestCorrupt { .. }));
    assert_eq!(fs::read(&path).expect("must read"), b"{ not json".to_vec());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn reconcile_stale_distinguishes_absent_live_and_repaired() {
    let root = test_root();
    let live_target = root.join("bin").join("live");
    fs::create_dir_all(root.join("bin")).expect("must create bin");
    fs::write(&live_target, b"x").expect("must write launcher");

    let path = manifest_path(&root);
    let mut manifest = Manifest::default();
    manifest.put(Entry::binary("live", Path::new("/opt/live"), &live_target));
    manifest.put(Entry::binary(
        "gone",
        Path::new("/opt/gone"),
        root.join("bin").join("gone"),
    ));
    write_manifest(&path, &manifest).expect("must write manifest");

    let mut store = ManifestStore::new(&path);
    assert_eq!(
        store.reconcile_stale("none").expect("must check"),
        StaleCheck::Absent
    );
    assert!(matches!(
        store.reconcile_stale("live").expect("must check"),
        StaleCheck::Live(entry) if entry.name == "live"
    ));
    match store.reconcile_stale("gone").expect("must check") {
        StaleCheck::Repaired { entry, warnings } => {
            assert_eq!(entry.name, "gone");
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].contains("'gone'"));
        }
        other => panic!("unexpected check result: {other:?}"),
    }

    let persisted = read_manifest(&path).expect("must read manifest");
    assert!(persisted.get("gone").is_none());
    assert!(persisted.get("live").is_some());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn path_list_contains_ignores_case_and_trailing_separators() {
    let dir = Path::new(r"C:\Users\me\bin");
    assert!(path_list_contains(r"C:\Windows;c:\users\ME\bin\;", dir));
    assert!(path_list_contains(r"C:\Users\me\bin", dir));
    assert!(!path_list_contains(r"C:\Users\me\bin2;C:\Users\me", dir));
    assert!(!path_list_contains("", dir));
    assert!(!path_list_contains(";;", Path::new("")));
}

#[test]
fn append_path_entry_handles_empty_and_trailing_semicolons() {
    let dir = Path::new(r"C:\Users\me\bin");
    assert_eq!(append_path_entry("", dir), r"C:\Users\me\bin");
    assert_eq!(
        append_path_entry(r"C:\Windows;", dir),
        r"C:\Windows;C:\Users\me\bin"
    );
}

#[test]
fn ensure_dir_on_user_path_is_quiet_when_already_present() {
    let mut calls = Vec::new();
    let warnings = ensure_dir_on_user_path(Path::new(r"C:\Users\me\bin"), true, |command| {
        calls.push(command_args(command));
        Ok("C:\\Windows;C:\\Users\\me\\bin\r\n".to_string())
    });
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(calls.len(), 1);
    assert!(calls[0]
        .last()
        .expect("must pass a script")
        .contains("GetEnvironmentVariable('Path', 'User')"));
}

#[test]
fn ensure_dir_on_user_path_only_warns_without_opt_in() {
    let mut calls = 0usize;
    let warnings = ensure_dir_on_user_path(Path::new(r"C:\Users\me\bin"), false, |_command| {
        calls += 1;
        Ok(r"C:\Windows".to_string())
    });
    assert_eq!(calls, 1, "PATH must not be modified without opt-in");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("update_user_path"));
}

#[test]
fn ensure_dir_on_user_path_appends_when_opted_in() {
    let mut scripts = Vec::new();
    let warnings = ensure_dir_on_user_path(Path::new(r"C:\Users\o'neil\bin"), true, |command| {
        assert_eq!(command.get_program(), "powershell");
        scripts.push(command_args(command).last().cloned().unwrap_or_default());
        Ok(if scripts.len() == 1 {
            r"C:\Windows".to_string()
        } else {
            String::new()
        })
    });

    assert_eq!(scripts.len(), 2);
    assert_eq!(
        scripts[1],
        r"[Environment]::SetEnvironmentVariable('Path', 'C:\Windows;C:\Users\o''neil\bin', 'User')"
    );
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("open a new terminal"));
}

#[test]
fn ensure_dir_on_user_path_reports_runner_failures_as_warnings() {
    let warnings = ensure_dir_on_user_path(Path::new(r"C:\bin"), true, |_command| {
        Err(io::Error::new(io::ErrorKind::NotFound, "powershell missing"))
    });
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("could not read the user PATH"));
    assert!(warnings[0].contains("powershell missing"));

    let mut calls = 0usize;
    let warnings = ensure_dir_on_user_path(Path::new(r"C:\bin"), true, |_command| {
        calls += 1;
        if calls == 1 {
            Ok(String::new())
        } else {
            Err(io::Error::other("access denied"))
        }
    });
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("failed to add"));
}

#[test]
fn settings_precedence_is_flag_then_file_then_default() {
    let layout = LnbLayout::new("/home/u");
    let file = SettingsFile::parse(
        "bin_dir = \"~/tools\"\nupdate_user_path = true\n",
        Path::new("settings.toml"),
    )
    .expect("must parse settings");

    let from_file = Settings::resolve(
        &layout,
        LauncherPlatform::Symlink,
        &file,
        &SettingsOverrides::default(),
    );
    assert_eq!(from_file.bin_dir, PathBuf::from("/home/u/tools"));
    assert_eq!(from_file.manifest_path, layout.manifest_path());
    assert!(from_file.update_user_path);

    let overrides = SettingsOverrides {
        bin_dir: Some(PathBuf::from("/cli/bin")),
        manifest_path: Some(PathBuf::from("/cli/lnb.json")),
    };
    let from_flags = Settings::resolve(&layout, LauncherPlatform::Symlink, &file, &overrides);
    assert_eq!(from_flags.bin_dir, PathBuf::from("/cli/bin"));
    assert_eq!(from_flags.manifest_path, PathBuf::from("/cli/lnb.json"));

    let defaults = Settings::resolve(
        &layout,
        LauncherPlatform::Batch,
        &SettingsFile::default(),
        &SettingsOverrides::default(),
    );
    assert_eq!(defaults.bin_dir, layout.user_bin_dir());
    assert!(!defaults.update_user_path);
}

#[test]
fn settings_file_rejects_unknown_keys_and_bad_types() {
    let path = Path::new("settings.toml");
    let err = SettingsFile::parse("bin_directory = \"/x\"\n", path).expect_err("must fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
    let err = SettingsFile::parse("update_user_path = \"yes\"\n", path).expect_err("must fail");
    assert!(matches!(err, SettingsError::Parse { .. }));
}

#[test]
fn settings_load_defaults_when_file_missing() {
    let root = test_root();
    let layout = LnbLayout::new(root.join("home"));
    let settings = Settings::load(
        &layout,
        LauncherPlatform::Symlink,
        &SettingsOverrides::default(),
    )
    .expect("missing settings file is fine");
    assert_eq!(settings.bin_dir, PathBuf::from("/usr/local/bin"));
    assert_eq!(settings.manifest_path, root.join("home").join(".lnb").join("config.json"));
    assert!(!layout.state_dir().exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn settings_build_engine_for_resolved_platform() {
    let root = test_root();
    let settings = Settings {
        platform: LauncherPlatform::Batch,
        bin_dir: root.join("bin"),
        manifest_path: manifest_path(&root),
        update_user_path: false,
    };
    let engine = settings.engine(context(&root));
    assert_eq!(engine.launcher().platform(), LauncherPlatform::Batch);
    assert_eq!(engine.launcher().bin_dir(), root.join("bin"));
    assert_eq!(engine.store().path(), manifest_path(&root));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn layout_places_state_under_home() {
    let layout = LnbLayout::new("/home/u");
    assert_eq!(layout.state_dir(), PathBuf::from("/home/u/.lnb"));
    assert_eq!(
        layout.settings_path(),
        PathBuf::from("/home/u/.lnb/settings.toml")
    );
    assert_eq!(
        layout.expand_home(Path::new("~/bin")),
        PathBuf::from("/home/u/bin")
    );
    assert_eq!(
        layout.expand_home(Path::new("/opt/bin")),
        PathBuf::from("/opt/bin")
    );
}

#[test]
fn launcher_platforms_pick_their_own_defaults() {
    let layout = LnbLayout::new("/home/u");
    assert_eq!(
        LauncherPlatform::Symlink.default_bin_dir(&layout),
        PathBuf::from("/usr/local/bin")
    );
    assert_eq!(
        LauncherPlatform::Batch.default_bin_dir(&layout),
        PathBuf::from("/home/u/bin")
    );

    let app_bundle = LauncherPlatform::AppBundle.launcher(PathBuf::from("/b"), false);
    assert!(app_bundle.normalize_options().app_bundle_launch);
    let batch = LauncherPlatform::Batch.launcher(PathBuf::from("/b"), false);
    assert!(batch.normalize_options().backslash_separators);
    assert_eq!(
        batch.binary_name(Path::new("/x/tool.exe")).as_deref(),
        Some("tool")
    );
    let symlink = LauncherPlatform::Symlink.launcher(PathBuf::from("/b"), false);
    assert_eq!(
        symlink.binary_name(Path::new("/x/tool.exe")).as_deref(),
        Some("tool.exe")
    );
}
