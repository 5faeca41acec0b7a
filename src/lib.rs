// PyiBuilder - PyInstaller command line builder
//
// This is the library crate containing the option model, the command compiler and icon handling.
// The binary crate (main.rs) provides the command line entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{BuildOptions, BuildSession, ModuleCatalog, UserConfig};
pub use services::{CommandCompiler, CompileError, IconService};
pub use state::{SessionChange, SessionManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
