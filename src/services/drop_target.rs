//! Path acceptance rules for each kind of input field.
//!
//! A front-end asks [`DropTarget::accepts`] before taking a dropped or typed
//! path, and [`ResourceKind::default_target`] for the mapping target to
//! suggest when a data or binary resource is added.

use camino::Utf8Path;

/// Extensions accepted for the entry script
pub const SCRIPT_EXTENSIONS: &[&str] = &["py"];

/// Extensions accepted for the application icon
pub const ICON_EXTENSIONS: &[&str] = &["ico", "png", "jpg", "jpeg", "bmp", "gif"];

/// Extensions accepted for the splash screen image
pub const SPLASH_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// The input a path is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Script,
    Icon,
    Splash,
    /// Output, work and search directories
    Folder,
    /// Data and binary resources (file or directory)
    Resource,
}

impl DropTarget {
    /// Check whether `path` is acceptable for this input.
    ///
    /// Extension checks are case-insensitive and do not require the file to
    /// exist; folder and resource inputs do.
    pub fn accepts(self, path: &Utf8Path) -> bool {
        match self {
            DropTarget::Script => has_extension(path, SCRIPT_EXTENSIONS),
            DropTarget::Icon => has_extension(path, ICON_EXTENSIONS),
            DropTarget::Splash => has_extension(path, SPLASH_EXTENSIONS),
            DropTarget::Folder => path.is_dir(),
            DropTarget::Resource => ResourceKind::of(path).is_some(),
        }
    }
}

/// Whether a resource is a single file or a whole directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
}

impl ResourceKind {
    /// Classify an existing path; `None` if it does not exist
    pub fn of(path: &Utf8Path) -> Option<Self> {
        if path.is_file() {
            Some(ResourceKind::File)
        } else if path.is_dir() {
            Some(ResourceKind::Directory)
        } else {
            None
        }
    }

    /// Suggested target inside the bundle.
    ///
    /// Files go to the bundle root (`.`); directories keep their own name.
    pub fn default_target(self, path: &Utf8Path) -> String {
        match self {
            ResourceKind::File => ".".to_string(),
            ResourceKind::Directory => path
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| ".".to_string()),
        }
    }
}

fn has_extension(path: &Utf8Path, allowed: &[&str]) -> bool {
    path.extension()
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}
