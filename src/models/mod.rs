//! Data models for PyiBuilder.
//!
//! This module contains all the core data structures used throughout the application:
//! - [`BuildSession`]: The aggregate holding every option the user has entered for one build
//! - [`BuildOptions`]: Scalar fields (script, modes, icon, paths, flags)
//! - [`PathList`], [`FileMapping`], [`NameSet`]: Ordered, duplicate-free option lists
//! - [`UserConfig`]: Application preferences loaded from `PyiBuilder Config.yaml`
//! - [`ModuleCatalog`]: Common hidden-import modules loaded from `PyiBuilder Modules.yaml`
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Plain data**: Mutation goes through the list `add`/`remove` methods, which enforce
//!   the no-duplicate and precondition rules and report an [`AddOutcome`]
//! - **Cloneable**: BuildSession is wrapped in `Arc<RwLock<>>` by
//!   [`SessionManager`](crate::state::SessionManager), which snapshots it for compilation
//! - **Session-only**: Only the two config structs are serializable; build options are never saved

pub mod collections;
pub mod config;
pub mod options;
pub mod session;

pub use collections::{AddOutcome, FileMapping, NameSet, PathList, RejectReason, ResourceMapping};
pub use config::{BuilderSettings, ModuleCatalog, UserConfig};
pub use options::{
    BuildMode, BuildOptions, CANONICAL_ICON_NAME, LogLevel, OptionParseError, TASKBAR_ICON_NAME,
    WindowMode,
};
pub use session::BuildSession;
