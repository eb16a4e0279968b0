mod entry;
mod error;
mod normalize;
mod shell;

pub use entry::{Entry, EntryKind, Manifest, ALIAS_SOURCE_PREFIX, MANIFEST_FORMAT_VERSION};
pub use error::{LnbError, Result};
pub use normalize::{
    absolutize, has_dangerous_chars, is_path_like, looks_absolute, normalize_alias_command,
    resolve_binary_path, CommandContext, NormalizeOptions, NormalizedCommand,
    DANGEROUS_COMMAND_CHARS,
};
pub use shell::{split_shell_words, tokenize_command, CommandLine, Quote, Token};
