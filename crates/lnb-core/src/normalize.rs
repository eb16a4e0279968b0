use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{LnbError, Result};
use crate::shell::{split_shell_words, tokenize_command, CommandLine, Token};

/// Characters refused in a bare (search-path) command name.
pub const DANGEROUS_COMMAND_CHARS: &[char] =
    &['{', '}', '[', ']', '(', ')', '<', '>', '|', '&', ';'];

/// Dialect knobs supplied by the launcher platform in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// `\` separates path components and drive-qualified values are absolute.
    pub backslash_separators: bool,
    /// Commands naming a `.app` bundle are launched through `open -a`.
    pub app_bundle_launch: bool,
}

/// Where relative paths and `~/` are resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(cwd: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            home,
        }
    }

    pub fn expand_home(&self, value: &str) -> String {
        match (value.strip_prefix("~/"), &self.home) {
            (Some(rest), Some(home)) => home.join(rest).display().to_string(),
            _ => value.to_string(),
        }
    }

    pub fn resolve(&self, value: &str) -> PathBuf {
        absolutize(&self.cwd, Path::new(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCommand {
    /// The command exactly as supplied; this is what the manifest records.
    pub original: String,
    /// The rewritten command the launcher executes.
    pub command: CommandLine,
}

/// Validates and canonicalizes an alias command.
pub fn normalize_alias_command(
    raw: &str,
    context: &CommandContext,
    options: NormalizeOptions,
) -> Result<NormalizedCommand> {
    if raw.trim().is_empty() {
        return Err(LnbError::EmptyCommand);
    }

    let mut tokens = tokenize_command(raw, &context.cwd)
        .iter()
        .map(|word| Token::parse(word))
        .collect::<Vec<_>>();

    let unwrapped_head = tokens
        .first()
        .filter(|head| {
            head.is_quoted()
                && head.value.chars().any(char::is_whitespace)
                && !quoted_program_spans_value(&head.value, context)
        })
        .map(|head| {
            debug!(program = %head.value, "quoted command carries its own arguments; unwrapping");
            split_shell_words(&head.value)
                .iter()
                .map(|word| Token::parse(word))
                .collect::<Vec<_>>()
        });
    if let Some(inner) = unwrapped_head {
        tokens.splice(0..1, inner);
    }

    let Some(head) = tokens.first() else {
        return Err(LnbError::EmptyCommand);
    };
    if head.value.trim().is_empty() {
        return Err(LnbError::EmptyCommand);
    }

    let program = resolve_program(head, context, options)?;
    tokens[0] = program;
    for token in tokens.iter_mut().skip(1) {
        if let Some(rewritten) = resolve_argument(token, context, options) {
            *token = rewritten;
        }
    }

    if options.app_bundle_launch && is_app_bundle(&tokens[0].value) {
        tokens.insert(0, Token::bare("-a"));
        tokens.insert(0, Token::bare("open"));
    }

    Ok(NormalizedCommand {
        original: raw.to_string(),
        command: CommandLine::new(tokens),
    })
}

/// Validates a binary to register and returns its absolute path.
pub fn resolve_binary_path(raw: &str, context: &CommandContext) -> Result<PathBuf> {
    let expanded = context.expand_home(raw.trim());
    let path = context.resolve(&expanded);
    if expanded.is_empty() {
        return Err(LnbError::NotFound { path });
    }

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LnbError::NotFound { path });
        }
        Err(err) => return Err(LnbError::filesystem("inspect", path, err)),
    };
    if !has_execute_permission(&metadata) {
        return Err(LnbError::NotExecutable { path });
    }
    Ok(path)
}

/// `\` is a separator only in the backslash dialect; POSIX file names may
/// contain it, so there `tools\run` stays a bare name resolved at run time.
pub fn is_path_like(value: &str, options: NormalizeOptions) -> bool {
    value.contains('/') || (options.backslash_separators && value.contains('\\'))
}

pub fn looks_absolute(value: &str, options: NormalizeOptions) -> bool {
    value.starts_with('/')
        || (options.backslash_separators && (value.starts_with('\\') || value.contains(':')))
}

pub fn has_dangerous_chars(value: &str) -> bool {
    value.contains(DANGEROUS_COMMAND_CHARS)
}

/// Lexically absolute form of `path` against `base`: `.` dropped, `..` folded.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

fn resolve_program(
    token: &Token,
    context: &CommandContext,
    options: NormalizeOptions,
) -> Result<Token> {
    let value = context.expand_home(&token.value);

    if is_path_like(&value, options) {
        let resolved = context.resolve(&value);
        if !resolved.exists() {
            return Err(LnbError::CommandNotFound {
                command: token.value.clone(),
                resolved,
            });
        }
        debug!(program = %token.value, resolved = %resolved.display(), "resolved program path");
        return Ok(token.rewritten(resolved.display().to_string()));
    }

    // Bare names resolve through the search path at run time, which may
    // differ from the one visible now.
    if has_dangerous_chars(&value) {
        return Err(LnbError::DangerousCharacters { command: value });
    }
    Ok(token.rewritten(value))
}

fn resolve_argument(
    token: &Token,
    context: &CommandContext,
    options: NormalizeOptions,
) -> Option<Token> {
    let value = token.value.as_str();
    let relative_prefix = value.starts_with("./")
        || value.starts_with("../")
        || (options.backslash_separators && (value.starts_with(".\\") || value.starts_with("..\\")));
    let dotted_name =
        value.contains('.') && !looks_absolute(value, options) && !value.contains("://");
    if !(relative_prefix || dotted_name) {
        return None;
    }

    let resolved = context.resolve(value);
    if !resolved.exists() {
        return None;
    }
    debug!(argument = value, resolved = %resolved.display(), "canonicalized argument path");
    Some(token.rewritten(resolved.display().to_string()))
}

/// Whether a quoted first token containing whitespace is one program path
/// (`"/Applications/Visual Studio Code.app"`) rather than a program plus
/// arguments (`"/usr/bin/java -jar app.jar"`, `"docker run --rm img"`).
fn quoted_program_spans_value(value: &str, context: &CommandContext) -> bool {
    if context.resolve(&context.expand_home(value)).exists() {
        return true;
    }

    let mut words = value.split_whitespace();
    let Some(first) = words.next() else {
        return true;
    };
    if words.next().is_none() {
        return true;
    }

    // Relative forms always start with `./` or `../`, so their first word
    // always has a dot and is taken as the program.
    if !value.starts_with('/') {
        return false;
    }
    first.ends_with(".app")
        || (!first.contains('.') && !first.ends_with("/bin/java") && !first.ends_with("/bin/node"))
}

fn is_app_bundle(value: &str) -> bool {
    value.trim_end_matches('/').ends_with(".app")
}

#[cfg(unix)]
fn has_execute_permission(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_permission(_metadata: &fs::Metadata) -> bool {
    true
}
