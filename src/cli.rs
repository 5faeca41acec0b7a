use crate::models::options::absolutize;
use crate::models::{AddOutcome, BuildMode, LogLevel, ModuleCatalog, RejectReason, WindowMode};
use crate::services::{DropTarget, IconError, IconService};
use crate::state::SessionManager;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};
use std::fmt;

// Top-level CLI parser. Sub-sections are flattened from sub-Args structs.
#[derive(Parser, Debug)]
#[command(author, version, about = "Compose a PyInstaller command line from packaging options")]
pub struct Cli {
    /// Python script to package
    #[arg(value_name = "SCRIPT")]
    pub script: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub general: GeneralArgs,

    #[command(flatten)]
    pub bundle: BundleArgs,

    #[command(flatten)]
    pub modules: ModuleArgs,

    #[command(flatten)]
    pub flags: FlagArgs,

    #[command(flatten)]
    pub app: AppArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GeneralArgs {
    #[arg(short = 'F', long, help = "Create a one-file bundled executable")]
    pub onefile: bool,

    #[arg(short = 'w', long, help = "Do not open a console window for standard i/o")]
    pub windowed: bool,

    #[arg(
        short = 'i',
        long,
        value_name = "FILE",
        help = "Icon image (ico, png, jpg, jpeg, bmp, gif), converted to icon.ico by the script",
    )]
    pub icon: Option<Utf8PathBuf>,

    #[arg(short = 'n', long, value_name = "NAME", help = "Name of the bundled app")]
    pub name: Option<String>,

    #[arg(long, value_name = "DIR", help = "Where to put the bundled app")]
    pub distpath: Option<Utf8PathBuf>,

    #[arg(long, value_name = "DIR", help = "Where to put temporary work files")]
    pub workpath: Option<Utf8PathBuf>,

    #[arg(long, value_name = "FILE", help = "Splash screen image (png, jpg, jpeg, bmp)")]
    pub splash: Option<Utf8PathBuf>,

    #[arg(long, value_name = "KEY", help = "Bytecode encryption key")]
    pub key: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BundleArgs {
    #[arg(
        short = 'p',
        long = "paths",
        value_name = "DIR",
        help = "Extra module search path (repeatable)",
    )]
    pub paths: Vec<Utf8PathBuf>,

    #[arg(
        long = "add-data",
        value_name = "SRC[;DEST]",
        help = "Data file or directory to bundle (repeatable)",
    )]
    pub add_data: Vec<String>,

    #[arg(
        long = "add-binary",
        value_name = "SRC[;DEST]",
        help = "Binary file or directory to bundle (repeatable)",
    )]
    pub add_binary: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ModuleArgs {
    #[arg(
        long = "hidden-import",
        value_name = "MODULE",
        help = "Module to import implicitly (repeatable)",
    )]
    pub hidden_imports: Vec<String>,

    #[arg(
        long = "common-module",
        value_name = "MODULE",
        help = "Hidden import picked from the module catalogue (repeatable)",
    )]
    pub common_modules: Vec<String>,

    #[arg(
        long = "collect-submodules",
        value_name = "MODULE",
        help = "Collect all submodules of a package",
    )]
    pub collect_submodules: Option<String>,

    #[arg(
        long = "exclude-module",
        value_name = "MODULE",
        help = "Module to leave out (repeatable)",
    )]
    pub exclude_modules: Vec<String>,

    #[arg(
        long = "upx-exclude",
        value_name = "LIST",
        help = "Comma separated modules to exclude from UPX compression",
    )]
    pub upx_exclude: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FlagArgs {
    #[arg(long, help = "Build a debug bootloader")]
    pub debug: bool,

    #[arg(long, help = "Clean the PyInstaller cache before building")]
    pub clean: bool,

    #[arg(long, help = "Do not use UPX")]
    pub noupx: bool,

    #[arg(long = "ask-overwrite", help = "Omit -y so PyInstaller asks before replacing output")]
    pub ask_overwrite: bool,

    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        help = "PyInstaller log level (DEBUG, INFO, WARN or ERROR)",
    )]
    pub log_level: Option<LogLevel>,

    #[arg(long = "uac-admin", help = "Request elevation on start (Windows)")]
    pub uac_admin: bool,

    #[arg(long, help = "Strip symbols from the executable and libraries")]
    pub strip: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AppArgs {
    #[arg(
        long = "config-dir",
        value_name = "DIR",
        default_value = "PyiBuilder Data",
        help = "Directory holding the YAML configuration files",
    )]
    pub config_dir: Utf8PathBuf,

    #[arg(long = "log-dir", value_name = "DIR", help = "Log directory (overrides the config file)")]
    pub log_dir: Option<Utf8PathBuf>,

    #[arg(short = 'v', long, help = "Debug logging, also mirrored to stderr")]
    pub verbose: bool,

    #[arg(long = "list-modules", help = "Print the module catalogue and exit")]
    pub list_modules: bool,

    #[arg(long = "init-config", help = "Write default configuration files and exit")]
    pub init_config: bool,
}

/// An input the session refused
#[derive(Debug)]
pub enum ArgIssue {
    /// A list entry was not added
    Rejected { input: String, reason: RejectReason },
    /// A path with the wrong extension for its option
    WrongKind { option: &'static str, path: Utf8PathBuf },
    /// Icon normalization failed; the icon is left unset
    Icon(IconError),
}

impl fmt::Display for ArgIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgIssue::Rejected { input, reason } => write!(f, "ignored '{}': {}", input, reason),
            ArgIssue::WrongKind { option, path } => {
                write!(f, "ignored {} '{}': unsupported file type", option, path)
            }
            ArgIssue::Icon(e) => write!(f, "icon not applied: {}", e),
        }
    }
}

/// Split `SRC[;DEST]` into source and optional target
pub fn split_mapping(entry: &str) -> (&str, Option<&str>) {
    match entry.split_once(';') {
        Some((source, target)) => (source.trim(), Some(target)),
        None => (entry.trim(), None),
    }
}

/// Apply parsed arguments to the session.
///
/// The script is set first so the icon lands in its directory. Every refused
/// input is returned; none of them stop the remaining arguments.
pub fn apply_to_session(
    cli: &Cli,
    session: &SessionManager,
    catalog: &ModuleCatalog,
    icons: &IconService,
) -> Vec<ArgIssue> {
    let mut issues = Vec::new();

    if let Some(script) = &cli.script {
        if DropTarget::Script.accepts(script) {
            session.set_script(absolutize(script).unwrap_or_else(|_| script.clone()));
        } else {
            issues.push(ArgIssue::WrongKind {
                option: "script",
                path: script.clone(),
            });
        }
    }

    apply_general(&cli.general, session, icons, &mut issues);
    apply_bundle(&cli.bundle, session, &mut issues);
    apply_modules(&cli.modules, session, catalog, &mut issues);
    apply_flags(&cli.flags, session);

    for issue in &issues {
        tracing::warn!("{}", issue);
    }

    issues
}

fn apply_general(
    args: &GeneralArgs,
    session: &SessionManager,
    icons: &IconService,
    issues: &mut Vec<ArgIssue>,
) {
    if args.onefile {
        session.set_mode(BuildMode::OneFile);
    }
    if args.windowed {
        session.set_window_mode(WindowMode::Windowed);
    }

    if let Some(icon) = &args.icon {
        if !DropTarget::Icon.accepts(icon) {
            issues.push(ArgIssue::WrongKind {
                option: "icon",
                path: icon.clone(),
            });
        } else if let Err(e) = session.apply_icon(icon, icons) {
            issues.push(ArgIssue::Icon(e));
        }
    }

    if let Some(name) = &args.name {
        session.set_name(name);
    }
    if let Some(dist) = &args.distpath {
        session.set_dist_path(dist.clone());
    }
    if let Some(work) = &args.workpath {
        session.set_work_path(work.clone());
    }

    if let Some(splash) = &args.splash {
        if DropTarget::Splash.accepts(splash) {
            session.set_splash(splash.clone());
        } else {
            issues.push(ArgIssue::WrongKind {
                option: "splash",
                path: splash.clone(),
            });
        }
    }

    if let Some(key) = &args.key {
        session.set_key(key);
    }
}

fn apply_bundle(args: &BundleArgs, session: &SessionManager, issues: &mut Vec<ArgIssue>) {
    for path in &args.paths {
        record(issues, path.as_str(), session.add_search_path(path));
    }

    for entry in &args.add_data {
        let (source, target) = split_mapping(entry);
        record(issues, entry, session.add_data_path(Utf8Path::new(source), target));
    }

    for entry in &args.add_binary {
        let (source, target) = split_mapping(entry);
        record(issues, entry, session.add_binary_path(Utf8Path::new(source), target));
    }
}

fn apply_modules(
    args: &ModuleArgs,
    session: &SessionManager,
    catalog: &ModuleCatalog,
    issues: &mut Vec<ArgIssue>,
) {
    for module in &args.hidden_imports {
        record(issues, module, session.add_hidden_import(module));
    }
    for module in &args.common_modules {
        record(issues, module, session.add_common_module(module, catalog));
    }
    if let Some(module) = &args.collect_submodules {
        session.set_collect_submodules(module);
    }
    for module in &args.exclude_modules {
        record(issues, module, session.add_excluded_module(module));
    }
    if let Some(text) = &args.upx_exclude {
        session.set_upx_exclude(text);
    }
}

fn apply_flags(args: &FlagArgs, session: &SessionManager) {
    if let Some(level) = args.log_level {
        session.set_log_level(level);
    }

    session.update_options(|options| {
        options.debug = args.debug;
        options.clean = args.clean;
        options.no_upx = args.noupx;
        options.no_confirm = !args.ask_overwrite;
        options.uac_admin = args.uac_admin;
        options.strip = args.strip;
    });
}

fn record(issues: &mut Vec<ArgIssue>, input: &str, outcome: AddOutcome) {
    match outcome {
        AddOutcome::Added => {}
        AddOutcome::Duplicate => tracing::debug!("Duplicate entry ignored: {}", input),
        AddOutcome::Rejected(reason) => issues.push(ArgIssue::Rejected {
            input: input.to_string(),
            reason,
        }),
    }
}
