// Session management module
//
// This module provides the SessionManager which wraps BuildSession with shared access
// using Arc<RwLock<T>> and emits change events for front-end updates.

use crate::models::options::absolutize;
use crate::models::{
    AddOutcome, BuildMode, BuildOptions, BuildSession, LogLevel, ModuleCatalog, RejectReason,
    WindowMode,
};
use crate::services::{CommandCompiler, CompileError, IconError, IconService, ResourceKind};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when the session is modified
///
/// These events notify interested parties (a GUI, a logger) about session
/// changes without requiring them to poll. No-op mutations such as duplicate
/// adds emit nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionChange {
    /// The entry script has changed
    ScriptChanged { script: Option<Utf8PathBuf> },

    /// Any other scalar option has changed
    OptionsChanged,

    /// The stored icon path has changed
    IconChanged { icon: Option<Utf8PathBuf> },

    SearchPathsChanged { len: usize },
    DataFilesChanged { len: usize },
    BinaryFilesChanged { len: usize },
    HiddenImportsChanged { len: usize },
    ExcludedModulesChanged { len: usize },

    /// A command was compiled from the session
    CommandCompiled { command: String },

    /// Session has been reset to defaults
    SessionReset,
}

/// Shared session manager with event emission
///
/// This is the central state component that:
/// - Provides shared access to [`BuildSession`] via `Arc<RwLock<T>>`
/// - Detects session changes and emits [`SessionChange`] events
/// - Exposes the add/remove/set operations a front-end drives
/// - Supports subscribing to changes via tokio broadcast channels
///
/// Every operation runs to completion before returning; nothing is queued
/// or executed in the background.
///
/// # Related Types
///
/// - [`crate::models::BuildSession`]: The underlying session structure
/// - [`crate::services::CommandCompiler`]: Compiles a session snapshot
/// - [`crate::services::IconService`]: Produces the canonical icon for [`Self::apply_icon`]
pub struct SessionManager {
    /// The build session protected by RwLock
    session: Arc<RwLock<BuildSession>>,

    /// Broadcast channel for emitting session change events
    change_tx: broadcast::Sender<SessionChange>,
}

impl SessionManager {
    /// Create a new SessionManager with an empty session
    ///
    /// # Returns
    /// A new SessionManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(100);
        Self {
            session: Arc::new(RwLock::new(BuildSession::default())),
            change_tx,
        }
    }

    /// Get a copy of the current session
    pub fn snapshot(&self) -> BuildSession {
        self.read_guard().clone()
    }

    /// Execute a function with read access to the session
    ///
    /// # Example
    /// ```ignore
    /// let ready = session_manager.read(|session| session.is_ready());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&BuildSession) -> R,
    {
        let session = self.read_guard();
        f(&session)
    }

    /// Update the session and emit change events
    ///
    /// This is the primary way to modify the session. It:
    /// 1. Captures the old session
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// The SessionChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<SessionChange>
    where
        F: FnOnce(&mut BuildSession),
    {
        let changes = {
            let mut session = self.write_guard();
            let old_session = session.clone();

            update_fn(&mut session);

            detect_changes(&old_session, &session)
        };

        for change in &changes {
            self.emit(change.clone());
        }

        changes
    }

    /// Subscribe to session change events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.change_tx.subscribe()
    }

    fn emit(&self, change: SessionChange) {
        // Ignore send errors - it's OK if no one is listening
        let _ = self.change_tx.send(change);
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, BuildSession> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, BuildSession> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an add to the session, returning its outcome
    fn add_with<F>(&self, add_fn: F) -> AddOutcome
    where
        F: FnOnce(&mut BuildSession) -> AddOutcome,
    {
        let mut outcome = AddOutcome::Duplicate;
        self.update(|session| outcome = add_fn(session));
        outcome
    }

    // Scalar options

    pub fn set_script(&self, script: impl Into<Utf8PathBuf>) -> Vec<SessionChange> {
        let script = script.into();
        self.update(|session| session.options.set_script(script))
    }

    pub fn set_mode(&self, mode: BuildMode) -> Vec<SessionChange> {
        self.update(|session| session.options.mode = mode)
    }

    pub fn set_window_mode(&self, window: WindowMode) -> Vec<SessionChange> {
        self.update(|session| session.options.window = window)
    }

    pub fn set_name(&self, name: &str) -> Vec<SessionChange> {
        self.update(|session| session.options.set_name(name))
    }

    pub fn set_dist_path(&self, path: impl Into<Utf8PathBuf>) -> Vec<SessionChange> {
        let path = path.into();
        self.update(|session| session.options.set_dist_path(path))
    }

    pub fn set_work_path(&self, path: impl Into<Utf8PathBuf>) -> Vec<SessionChange> {
        let path = path.into();
        self.update(|session| session.options.set_work_path(path))
    }

    pub fn set_collect_submodules(&self, module: &str) -> Vec<SessionChange> {
        self.update(|session| session.options.set_collect_submodules(module))
    }

    pub fn set_key(&self, key: &str) -> Vec<SessionChange> {
        self.update(|session| session.options.set_key(key))
    }

    pub fn set_splash(&self, path: impl Into<Utf8PathBuf>) -> Vec<SessionChange> {
        let path = path.into();
        self.update(|session| session.options.set_splash(path))
    }

    pub fn set_log_level(&self, level: LogLevel) -> Vec<SessionChange> {
        self.update(|session| session.options.log_level = level)
    }

    /// Set the comma separated list of modules excluded from UPX compression
    pub fn set_upx_exclude(&self, text: &str) -> Vec<SessionChange> {
        self.update(|session| session.options.upx_exclude = text.to_string())
    }

    /// Update scalar options (typically the boolean flags)
    pub fn update_options<F>(&self, options_fn: F) -> Vec<SessionChange>
    where
        F: FnOnce(&mut BuildOptions),
    {
        self.update(|session| options_fn(&mut session.options))
    }

    /// Store an icon path without normalizing it; ignored unless the file exists
    pub fn set_icon_path(&self, path: impl Into<Utf8PathBuf>) -> Vec<SessionChange> {
        let path = path.into();
        self.update(|session| {
            if !session.options.set_icon(path.clone()) {
                tracing::warn!("Icon file does not exist, keeping previous icon: {}", path);
            }
        })
    }

    /// Normalize `source` into the project's canonical icon and store it
    ///
    /// The project directory is derived from the current script. On failure the
    /// stored icon path is left unchanged and the error is returned for the
    /// caller to report.
    pub fn apply_icon(
        &self,
        source: &Utf8Path,
        icons: &IconService,
    ) -> Result<Utf8PathBuf, IconError> {
        let project_root = self
            .read(|session| session.options.project_root())
            .map_err(|e| IconError::Io {
                path: source.to_path_buf(),
                source: e,
            })?;

        let source = absolutize(source).map_err(|e| IconError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;

        let (icon, action) = icons.normalize(&source, &project_root)?;
        tracing::info!("Icon applied ({:?}): {}", action, icon);

        self.update(|session| session.options.icon = Some(icon.clone()));
        Ok(icon)
    }

    // Search paths

    /// Add a search path; relative paths are resolved against the current directory
    pub fn add_search_path(&self, path: impl AsRef<Utf8Path>) -> AddOutcome {
        let path = path.as_ref();
        if path.as_str().trim().is_empty() {
            return AddOutcome::Rejected(RejectReason::Empty);
        }
        let path = absolutize(path).unwrap_or_else(|_| path.to_path_buf());
        self.add_with(|session| session.search_paths.add(path))
    }

    pub fn remove_search_path(&self, index: usize) -> Vec<SessionChange> {
        self.update(|session| {
            session.search_paths.remove(index);
        })
    }

    // Resource mappings

    pub fn add_data_file(&self, source: impl AsRef<Utf8Path>, target: &str) -> AddOutcome {
        self.add_with(|session| session.data_files.add(source, target))
    }

    pub fn remove_data_file(&self, index: usize) -> Vec<SessionChange> {
        self.update(|session| {
            session.data_files.remove(index);
        })
    }

    pub fn add_binary_file(&self, source: impl AsRef<Utf8Path>, target: &str) -> AddOutcome {
        self.add_with(|session| session.binary_files.add(source, target))
    }

    pub fn remove_binary_file(&self, index: usize) -> Vec<SessionChange> {
        self.update(|session| {
            session.binary_files.remove(index);
        })
    }

    /// Add a data mapping, defaulting the target by resource kind when `target` is `None`
    pub fn add_data_path(&self, source: &Utf8Path, target: Option<&str>) -> AddOutcome {
        match resolve_target(source, target) {
            Some(target) => self.add_data_file(source, &target),
            None => AddOutcome::Rejected(RejectReason::SourceMissing),
        }
    }

    /// Add a binary mapping, defaulting the target by resource kind when `target` is `None`
    pub fn add_binary_path(&self, source: &Utf8Path, target: Option<&str>) -> AddOutcome {
        match resolve_target(source, target) {
            Some(target) => self.add_binary_file(source, &target),
            None => AddOutcome::Rejected(RejectReason::SourceMissing),
        }
    }

    // Module lists

    pub fn add_hidden_import(&self, module: &str) -> AddOutcome {
        self.add_with(|session| session.hidden_imports.add(module))
    }

    pub fn remove_hidden_import(&self, index: usize) -> Vec<SessionChange> {
        self.update(|session| {
            session.hidden_imports.remove(index);
        })
    }

    /// Add a hidden import picked from the module catalogue
    pub fn add_common_module(&self, module: &str, catalog: &ModuleCatalog) -> AddOutcome {
        if !catalog.contains(module) {
            tracing::warn!("Module is not in the catalogue: {}", module);
            return AddOutcome::Rejected(RejectReason::UnknownModule);
        }
        self.add_hidden_import(module)
    }

    pub fn add_excluded_module(&self, module: &str) -> AddOutcome {
        self.add_with(|session| session.excluded_modules.add(module))
    }

    pub fn remove_excluded_module(&self, index: usize) -> Vec<SessionChange> {
        self.update(|session| {
            session.excluded_modules.remove(index);
        })
    }

    /// Compile the current session into a command line
    ///
    /// Emits [`SessionChange::CommandCompiled`] on success.
    pub fn compile(&self, compiler: &CommandCompiler) -> Result<String, CompileError> {
        let snapshot = self.snapshot();
        let command = compiler.compile(&snapshot)?;

        self.emit(SessionChange::CommandCompiled {
            command: command.clone(),
        });

        Ok(command)
    }

    /// Reset every option and list to its default
    pub fn reset(&self) -> Vec<SessionChange> {
        let mut changes = self.update(|session| session.reset());

        let reset_event = SessionChange::SessionReset;
        self.emit(reset_event.clone());
        changes.push(reset_event);

        changes
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            change_tx: self.change_tx.clone(),
        }
    }
}

/// Pick the explicit target, or the default for the resource kind
fn resolve_target(source: &Utf8Path, target: Option<&str>) -> Option<String> {
    let kind = ResourceKind::of(source)?;
    match target {
        Some(target) => Some(target.to_string()),
        None => Some(kind.default_target(source)),
    }
}

/// Detect what changed between two sessions and generate events
fn detect_changes(old: &BuildSession, new: &BuildSession) -> Vec<SessionChange> {
    let mut changes = Vec::new();

    if old.options.script != new.options.script {
        changes.push(SessionChange::ScriptChanged {
            script: new.options.script.clone(),
        });
    }

    if old.options.icon != new.options.icon {
        changes.push(SessionChange::IconChanged {
            icon: new.options.icon.clone(),
        });
    }

    // Remaining scalar fields, compared with script and icon masked out
    let mask = |options: &BuildOptions| BuildOptions {
        script: None,
        icon: None,
        ..options.clone()
    };
    if mask(&old.options) != mask(&new.options) {
        changes.push(SessionChange::OptionsChanged);
    }

    if old.search_paths != new.search_paths {
        changes.push(SessionChange::SearchPathsChanged {
            len: new.search_paths.len(),
        });
    }

    if old.data_files != new.data_files {
        changes.push(SessionChange::DataFilesChanged {
            len: new.data_files.len(),
        });
    }

    if old.binary_files != new.binary_files {
        changes.push(SessionChange::BinaryFilesChanged {
            len: new.binary_files.len(),
        });
    }

    if old.hidden_imports != new.hidden_imports {
        changes.push(SessionChange::HiddenImportsChanged {
            len: new.hidden_imports.len(),
        });
    }

    if old.excluded_modules != new.excluded_modules {
        changes.push(SessionChange::ExcludedModulesChanged {
            len: new.excluded_modules.len(),
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_dir_utf8() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_new_session_manager() {
        let manager = SessionManager::new();
        let session = manager.snapshot();

        assert!(!session.is_ready());
        assert!(session.options.no_confirm);
        assert_eq!(session.list_entry_count(), 0);
    }

    #[test]
    fn test_set_script_emits_event() {
        let manager = SessionManager::new();

        let changes = manager.set_script("/p/app.py");

        assert_eq!(
            changes,
            vec![SessionChange::ScriptChanged {
                script: Some(Utf8PathBuf::from("/p/app.py"))
            }]
        );
    }

    #[test]
    fn test_unchanged_value_emits_nothing() {
        let manager = SessionManager::new();
        manager.set_name("App");

        assert!(manager.set_name("App").is_empty());
        assert!(manager.set_mode(BuildMode::OneDir).is_empty());
    }

    #[test]
    fn test_flag_update_emits_options_changed() {
        let manager = SessionManager::new();

        let changes = manager.update_options(|options| {
            options.clean = true;
            options.strip = true;
        });

        assert_eq!(changes, vec![SessionChange::OptionsChanged]);
        assert!(manager.read(|s| s.options.clean && s.options.strip));
    }

    #[test]
    fn test_duplicate_add_is_silent() {
        let manager = SessionManager::new();
        let mut rx = manager.subscribe();

        assert_eq!(manager.add_hidden_import("numpy"), AddOutcome::Added);
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionChange::HiddenImportsChanged { len: 1 }
        ));

        assert_eq!(manager.add_hidden_import("numpy"), AddOutcome::Duplicate);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_remove_out_of_range_is_silent() {
        let manager = SessionManager::new();
        manager.add_excluded_module("tkinter");

        let changes = manager.remove_excluded_module(3);

        assert!(changes.is_empty());
        assert_eq!(manager.read(|s| s.excluded_modules.len()), 1);
    }

    #[test]
    fn test_add_search_path_resolves_relative() {
        let manager = SessionManager::new();

        assert_eq!(manager.add_search_path("lib"), AddOutcome::Added);
        let stored = manager.read(|s| s.search_paths.iter().next().cloned()).unwrap();
        assert!(stored.is_absolute());
        assert!(stored.ends_with("lib"));

        assert_eq!(
            manager.add_search_path("  "),
            AddOutcome::Rejected(RejectReason::Empty)
        );
    }

    #[test]
    fn test_add_data_path_default_targets() {
        let (_temp_dir, dir) = temp_dir_utf8();
        let assets = dir.join("assets");
        std::fs::create_dir(&assets).unwrap();
        let readme = dir.join("README.txt");
        std::fs::write(&readme, "hello").unwrap();

        let manager = SessionManager::new();
        assert!(manager.add_data_path(&assets, None).is_added());
        assert!(manager.add_data_path(&readme, None).is_added());
        assert!(manager.add_binary_path(&readme, Some("bin")).is_added());
        assert_eq!(
            manager.add_data_path(&dir.join("missing"), None),
            AddOutcome::Rejected(RejectReason::SourceMissing)
        );

        let session = manager.snapshot();
        let targets: Vec<_> = session.data_files.iter().map(|m| m.target.clone()).collect();
        assert_eq!(targets, vec!["assets", "."]);
        assert_eq!(session.binary_files.iter().next().unwrap().target, "bin");
    }

    #[test]
    fn test_common_module_must_be_in_catalog() {
        let manager = SessionManager::new();
        let catalog = ModuleCatalog::default();

        assert_eq!(manager.add_common_module("pandas", &catalog), AddOutcome::Added);
        assert_eq!(
            manager.add_common_module("leftpad", &catalog),
            AddOutcome::Rejected(RejectReason::UnknownModule)
        );
        assert_eq!(manager.read(|s| s.hidden_imports.len()), 1);
    }

    #[test]
    fn test_compile_emits_command() {
        let manager = SessionManager::new();
        manager.set_script("/p/app.py");
        let mut rx = manager.subscribe();

        let command = manager.compile(&CommandCompiler::new()).unwrap();

        assert_eq!(command, r#"pyinstaller -D -c -y "/p/app.py""#);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionChange::CommandCompiled { command }
        );
    }

    #[test]
    fn test_compile_without_script_fails() {
        let manager = SessionManager::new();
        let mut rx = manager.subscribe();

        let result = manager.compile(&CommandCompiler::new());

        assert!(matches!(result, Err(CompileError::MissingScript)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reset() {
        let manager = SessionManager::new();
        manager.set_script("/p/app.py");
        manager.add_hidden_import("numpy");
        manager.set_log_level(LogLevel::Error);

        let changes = manager.reset();

        assert!(changes.contains(&SessionChange::SessionReset));
        assert!(changes.contains(&SessionChange::ScriptChanged { script: None }));
        let session = manager.snapshot();
        assert_eq!(session.options.log_level, LogLevel::Info);
        assert!(session.hidden_imports.is_empty());
    }

    #[test]
    fn test_set_icon_path_requires_file() {
        let (_temp_dir, dir) = temp_dir_utf8();
        let icon = dir.join("app.ico");
        std::fs::write(&icon, b"ico").unwrap();

        let manager = SessionManager::new();
        assert!(manager.set_icon_path(dir.join("nope.ico")).is_empty());

        let changes = manager.set_icon_path(icon.clone());
        assert_eq!(changes, vec![SessionChange::IconChanged { icon: Some(icon) }]);
    }

    #[test]
    fn test_apply_icon_failure_keeps_icon() {
        let (_temp_dir, dir) = temp_dir_utf8();
        let manager = SessionManager::new();
        manager.set_script(dir.join("main.py"));

        let broken = dir.join("broken.png");
        std::fs::write(&broken, b"garbage").unwrap();

        let result = manager.apply_icon(&broken, &IconService::new());

        assert!(matches!(result, Err(IconError::Conversion { .. })));
        assert!(manager.read(|s| s.options.icon.is_none()));
    }

    #[test]
    fn test_clone_shares_session() {
        let manager1 = SessionManager::new();
        let manager2 = manager1.clone();

        manager1.add_hidden_import("requests");

        assert_eq!(manager2.read(|s| s.hidden_imports.len()), 1);
    }
}
