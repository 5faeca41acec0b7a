//! Services module - Pure business logic for building PyInstaller commands.
//!
//! The services are **framework-agnostic** and have no dependencies on any UI layer,
//! making them testable and reusable from the CLI or a GUI front-end.
//!
//! # Components
//!
//! - [`CommandCompiler`]: Turns a [`BuildSession`](crate::models::BuildSession) into a
//!   command line. Handles:
//!   - Fixed flag ordering (mode, window, icon, name, paths, resources, modules, flags, script)
//!   - Double-quoting of path and string values
//!   - Taskbar icon override (`icon1.ico` next to the script)
//!
//! - [`IconService`]: Places a canonical `icon.ico` next to the script, either by copying an
//!   existing `.ico` or by converting a raster image to a multi-size icon
//!
//! - [`DropTarget`] / [`ResourceKind`]: Which paths each input accepts, and the default
//!   bundle target for data and binary resources
//!
//! # Usage Example
//!
//! ```ignore
//! use pyibuilder::services::{CommandCompiler, IconService};
//!
//! let icons = IconService::new();
//! let (icon, _) = icons.normalize("logo.png".into(), project_root)?;
//! session.options.icon = Some(icon);
//!
//! let command = CommandCompiler::new().compile(&session)?;
//! // pyinstaller -F -w -i "/project/icon.ico" -y "/project/main.py"
//! ```
//!
//! See the [PyInstaller documentation](https://pyinstaller.org/en/stable/usage.html) for the
//! meaning of each flag.

pub mod compiler;
pub mod drop_target;
pub mod icon;

pub use compiler::{CommandCompiler, CompileError};
pub use drop_target::{DropTarget, ResourceKind};
pub use icon::{ICON_SIZES, IconAction, IconError, IconService};
