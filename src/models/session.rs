use super::collections::{FileMapping, NameSet, PathList};
use super::options::BuildOptions;

/// Everything the user has entered for one build.
///
/// This is the single source of truth for the command compiler. It is owned by
/// [`crate::state::SessionManager`], which wraps it in `Arc<RwLock<_>>` and
/// emits [`crate::state::SessionChange`] events whenever it is modified.
/// Nothing in it is persisted; a session lives as long as the process.
///
/// # Related Types
///
/// - [`crate::services::CommandCompiler`]: turns a session into a command line
/// - [`crate::services::IconService`]: produces the icon referenced by `options.icon`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildSession {
    pub options: BuildOptions,

    // Ordered option lists
    pub search_paths: PathList,
    pub data_files: FileMapping,
    pub binary_files: FileMapping,
    pub hidden_imports: NameSet,
    pub excluded_modules: NameSet,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the session has enough input to compile a command
    pub fn is_ready(&self) -> bool {
        self.options.script.is_some()
    }

    /// Restore every field and list to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total number of entries across all option lists
    pub fn list_entry_count(&self) -> usize {
        self.search_paths.len()
            + self.data_files.len()
            + self.binary_files.len()
            + self.hidden_imports.len()
            + self.excluded_modules.len()
    }
}
