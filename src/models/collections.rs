//! Ordered, duplicate-free option lists.
//!
//! Each list keeps insertion order because that order becomes argument order
//! in the compiled command. Adds report an [`AddOutcome`] instead of an error:
//! duplicates are an expected, silent no-op.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::fmt;

/// Result of adding an entry to one of the option lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The entry was appended
    Added,
    /// An equal entry already exists; nothing changed
    Duplicate,
    /// A precondition failed; nothing changed
    Rejected(RejectReason),
}

impl AddOutcome {
    pub fn is_added(self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

/// Why an add was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The value (or mapping target) was empty after trimming
    Empty,
    /// The mapping source does not exist on disk
    SourceMissing,
    /// The module is not listed in the module catalogue
    UnknownModule,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Empty => f.write_str("value is empty"),
            RejectReason::SourceMissing => f.write_str("source path does not exist"),
            RejectReason::UnknownModule => f.write_str("module is not in the catalogue"),
        }
    }
}

/// Search paths passed with `-p`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathList {
    paths: IndexSet<Utf8PathBuf>,
}

impl PathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<Utf8PathBuf>) -> AddOutcome {
        let path = path.into();
        if path.as_str().trim().is_empty() {
            return AddOutcome::Rejected(RejectReason::Empty);
        }
        if self.paths.insert(path) {
            AddOutcome::Added
        } else {
            AddOutcome::Duplicate
        }
    }

    /// Remove the entry at `index`; out-of-range indices are ignored
    pub fn remove(&mut self, index: usize) -> Option<Utf8PathBuf> {
        self.paths.shift_remove_index(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

/// One `source;target` pair for `--add-data` or `--add-binary`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceMapping {
    pub source: Utf8PathBuf,
    pub target: String,
}

impl ResourceMapping {
    /// The `source;target` value PyInstaller expects
    pub fn to_arg(&self) -> String {
        format!("{};{}", self.source, self.target)
    }
}

impl fmt::Display for ResourceMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Data or binary file mappings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMapping {
    entries: IndexSet<ResourceMapping>,
}

impl FileMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping.
    ///
    /// The source must exist (file or directory) and the trimmed target must
    /// be non-empty.
    pub fn add(&mut self, source: impl AsRef<Utf8Path>, target: &str) -> AddOutcome {
        let source = source.as_ref();
        let target = target.trim();

        if source.as_str().trim().is_empty() || target.is_empty() {
            return AddOutcome::Rejected(RejectReason::Empty);
        }
        if !source.exists() {
            return AddOutcome::Rejected(RejectReason::SourceMissing);
        }

        let mapping = ResourceMapping {
            source: source.to_path_buf(),
            target: target.to_string(),
        };

        if self.entries.insert(mapping) {
            AddOutcome::Added
        } else {
            AddOutcome::Duplicate
        }
    }

    /// Remove the entry at `index`; out-of-range indices are ignored
    pub fn remove(&mut self, index: usize) -> Option<ResourceMapping> {
        self.entries.shift_remove_index(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceMapping> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Unique module names (hidden imports, excluded modules)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
    names: IndexSet<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str) -> AddOutcome {
        let name = name.trim();
        if name.is_empty() {
            return AddOutcome::Rejected(RejectReason::Empty);
        }
        if self.names.insert(name.to_string()) {
            AddOutcome::Added
        } else {
            AddOutcome::Duplicate
        }
    }

    /// Remove the entry at `index`; out-of-range indices are ignored
    pub fn remove(&mut self, index: usize) -> Option<String> {
        self.names.shift_remove_index(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}
