use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Marks an entry source as an alias command rather than a binary path.
pub const ALIAS_SOURCE_PREFIX: &str = "alias:";

pub const MANIFEST_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Binary,
    Alias,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Alias => "alias",
        }
    }

    pub fn remove_hint(self, name: &str) -> String {
        match self {
            Self::Binary => format!("lnb remove {name}"),
            Self::Alias => format!("lnb unalias {name}"),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub source_path: String,
    pub target_path: PathBuf,
    pub installed_at: DateTime<Utc>,
}

impl Entry {
    pub fn binary(name: impl Into<String>, source: &Path, target: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_path: source.display().to_string(),
            target_path: target.into(),
            installed_at: Utc::now(),
        }
    }

    /// `command` is the text as the user typed it, before normalization.
    pub fn alias(name: impl Into<String>, command: &str, target: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source_path: format!("{ALIAS_SOURCE_PREFIX}{command}"),
            target_path: target.into(),
            installed_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        if self.source_path.starts_with(ALIAS_SOURCE_PREFIX) {
            EntryKind::Alias
        } else {
            EntryKind::Binary
        }
    }

    /// Source with the alias marker stripped: the binary path or the alias command.
    pub fn display_source(&self) -> &str {
        self.source_path
            .strip_prefix(ALIAS_SOURCE_PREFIX)
            .unwrap_or(&self.source_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default = "default_format_version")]
    pub version: String,
    #[serde(default, deserialize_with = "deserialize_entries")]
    entries: BTreeMap<String, Entry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            entries: BTreeMap::new(),
        }
    }
}

impl Manifest {
    pub fn from_json_str(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let mut rendered = serde_json::to_string_pretty(self)?;
        rendered.push('\n');
        Ok(rendered)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Inserts or replaces by name. Callers check name availability first.
    pub fn put(&mut self, entry: Entry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn delete(&mut self, name: &str) -> Option<Entry> {
        self.entries.remove(name)
    }

    pub fn list(&self) -> Vec<Entry> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn owner_of_target(&self, target: &Path) -> Option<&Entry> {
        self.entries
            .values()
            .find(|entry| entry.target_path == target)
    }
}

fn default_format_version() -> String {
    MANIFEST_FORMAT_VERSION.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntriesRepr {
    Map(BTreeMap<String, Entry>),
    List(Vec<Entry>),
}

// Older manifests stored entries as a list, and may carry `null`.
fn deserialize_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, Entry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<EntriesRepr>::deserialize(deserializer)? {
        None => BTreeMap::new(),
        Some(EntriesRepr::Map(map)) => map,
        Some(EntriesRepr::List(list)) => list
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect(),
    };
    Ok(entries)
}
