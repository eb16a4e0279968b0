use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

/// Case-insensitive membership test over a `;`-separated PATH value.
/// Trailing separators on either side are ignored.
pub fn path_list_contains(path_value: &str, dir: &Path) -> bool {
    let wanted = normalized_path_entry(&dir.display().to_string());
    if wanted.is_empty() {
        return false;
    }
    path_value
        .split(';')
        .map(normalized_path_entry)
        .any(|entry| entry == wanted)
}

pub fn append_path_entry(path_value: &str, dir: &Path) -> String {
    let current = path_value.trim().trim_end_matches(';');
    if current.is_empty() {
        dir.display().to_string()
    } else {
        format!("{current};{}", dir.display())
    }
}

/// Reads the persistent per-user PATH through `run_command`.
pub fn query_user_path<RunCommand>(run_command: &mut RunCommand) -> io::Result<String>
where
    RunCommand: FnMut(&mut Command) -> io::Result<String>,
{
    let mut command = powershell_command("[Environment]::GetEnvironmentVariable('Path', 'User')");
    run_command(&mut command).map(|output| output.trim().to_string())
}

/// Appends `dir` to the persistent per-user PATH, given its current value.
/// Returns the value that was written.
pub fn append_to_user_path<RunCommand>(
    run_command: &mut RunCommand,
    current: &str,
    dir: &Path,
) -> io::Result<String>
where
    RunCommand: FnMut(&mut Command) -> io::Result<String>,
{
    let updated = append_path_entry(current, dir);
    let script = format!(
        "[Environment]::SetEnvironmentVariable('Path', {}, 'User')",
        powershell_literal(&updated)
    );
    run_command(&mut powershell_command(&script))?;
    Ok(updated)
}

/// Checks that `dir` is on the user PATH, appending it when `update` is set.
/// Every outcome that needs the user's attention comes back as a warning.
pub fn ensure_dir_on_user_path<RunCommand>(
    dir: &Path,
    update: bool,
    mut run_command: RunCommand,
) -> Vec<String>
where
    RunCommand: FnMut(&mut Command) -> io::Result<String>,
{
    let current = match query_user_path(&mut run_command) {
        Ok(current) => current,
        Err(err) => {
            return vec![format!(
                "could not read the user PATH ({err}); add {} to PATH manually",
                dir.display()
            )];
        }
    };

    if path_list_contains(&current, dir) {
        debug!(dir = %dir.display(), "launcher directory already on user PATH");
        return Vec::new();
    }

    if !update {
        return vec![format!(
            "{} is not on your user PATH; add it manually or set update_user_path = true in settings.toml",
            dir.display()
        )];
    }

    match append_to_user_path(&mut run_command, &current, dir) {
        Ok(_) => {
            info!(dir = %dir.display(), "added launcher directory to user PATH");
            vec![format!(
                "added {} to your user PATH; open a new terminal to pick it up",
                dir.display()
            )]
        }
        Err(err) => vec![format!(
            "failed to add {} to your user PATH ({err}); add it manually",
            dir.display()
        )],
    }
}

/// Runs `command` and returns its stdout; a non-zero exit is an error.
pub fn run_command(command: &mut Command) -> io::Result<String> {
    let output = command.output()?;
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(io::Error::other(format!(
        "{} exited with {}: {}",
        command.get_program().to_string_lossy(),
        output.status,
        stderr.trim()
    )))
}

fn powershell_command(script: &str) -> Command {
    let mut command = Command::new("powershell");
    command
        .arg("-NoProfile")
        .arg("-NonInteractive")
        .arg("-Command")
        .arg(script);
    command
}

fn powershell_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn normalized_path_entry(entry: &str) -> String {
    entry
        .trim()
        .trim_end_matches(['\\', '/'])
        .to_lowercase()
}
