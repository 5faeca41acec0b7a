//! PyiBuilder - PyInstaller command line builder
//!
//! Main entry point for the command line application.
//!
//! # Overview
//!
//! This binary parses packaging options, applies them to a [`SessionManager`] and prints
//! the resulting PyInstaller command on stdout. It initializes:
//! - Logging infrastructure (daily rotating file, optional stderr output)
//! - Configuration loading ([`ConfigManager`])
//! - Session management ([`SessionManager`])
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Load YAML configuration from `PyiBuilder Data/`
//!    - `PyiBuilder Config.yaml` → tool command, taskbar icon preference, logging
//!    - `PyiBuilder Modules.yaml` → common module catalogue
//! 3. Initialize logging → logs/pyibuilder.<date>
//! 4. Handle `--init-config` / `--list-modules`, or apply options and compile
//!
//! Icon problems and refused inputs are reported on stderr without stopping the build.
//! The process exits non-zero when configuration cannot be read or no script was given.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use pyibuilder::cli::{self, Cli};
use pyibuilder::{
    APP_NAME, CommandCompiler, ConfigManager, IconService, ModuleCatalog, SessionManager, VERSION,
};

fn main() -> Result<()> {
    let args = Cli::parse();

    let config_manager = ConfigManager::new(&args.app.config_dir)?;

    if args.app.init_config {
        let written = config_manager.init_defaults()?;
        if written.is_empty() {
            println!("Configuration already present in {}", config_manager.config_dir());
        }
        for path in written {
            println!("Wrote {}", path);
        }
        return Ok(());
    }

    let user_config = config_manager.load_user_config()?;
    let settings = &user_config.builder_settings;

    // Logging setup; the guard keeps the file writer alive until exit
    let log_dir = args
        .app
        .log_dir
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from(&settings.log_directory));
    let _guard = pyibuilder::logging::setup_logging_with_console(
        &log_dir,
        APP_NAME,
        settings.debug_logging || args.app.verbose,
        args.app.verbose,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let catalog = config_manager.load_module_catalog()?;

    if args.app.list_modules {
        print_catalog(&catalog);
        return Ok(());
    }

    let session_manager = SessionManager::new();
    let issues = cli::apply_to_session(&args, &session_manager, &catalog, &IconService::new());
    for issue in &issues {
        eprintln!("warning: {}", issue);
    }

    let compiler = CommandCompiler::from_settings(settings);
    let command = session_manager
        .compile(&compiler)
        .context("Cannot build a PyInstaller command")?;

    println!("{}", command);
    Ok(())
}

fn print_catalog(catalog: &ModuleCatalog) {
    for (category, modules) in &catalog.categories {
        println!("{}:", category);
        for module in modules {
            println!("  {}", module);
        }
    }
}
