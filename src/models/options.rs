use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// File name of the canonical icon written next to the build script.
pub const CANONICAL_ICON_NAME: &str = "icon.ico";

/// File name of the taskbar icon that overrides the selected icon at compile time.
pub const TASKBAR_ICON_NAME: &str = "icon1.ico";

/// Errors raised when parsing option values from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionParseError {
    #[error("Unknown build mode: {0} (expected onefile or onedir)")]
    BuildMode(String),

    #[error("Unknown window mode: {0} (expected console or windowed)")]
    WindowMode(String),

    #[error("Unknown log level: {0} (expected DEBUG, INFO, WARN or ERROR)")]
    LogLevel(String),
}

/// Bundle layout produced by PyInstaller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Single self-extracting executable (`-F`)
    OneFile,
    /// Folder containing the executable and its dependencies (`-D`)
    #[default]
    OneDir,
}

impl BuildMode {
    pub fn flag(self) -> &'static str {
        match self {
            BuildMode::OneFile => "-F",
            BuildMode::OneDir => "-D",
        }
    }
}

impl FromStr for BuildMode {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onefile" => Ok(BuildMode::OneFile),
            "onedir" => Ok(BuildMode::OneDir),
            _ => Err(OptionParseError::BuildMode(s.to_string())),
        }
    }
}

/// Whether the packaged program opens a console window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// Console subsystem (`-c`)
    #[default]
    Console,
    /// Windowed subsystem, no console (`-w`)
    Windowed,
}

impl WindowMode {
    pub fn flag(self) -> &'static str {
        match self {
            WindowMode::Console => "-c",
            WindowMode::Windowed => "-w",
        }
    }
}

impl FromStr for WindowMode {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(WindowMode::Console),
            "windowed" => Ok(WindowMode::Windowed),
            _ => Err(OptionParseError::WindowMode(s.to_string())),
        }
    }
}

/// PyInstaller build log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| OptionParseError::LogLevel(s.to_string()))
    }
}

/// Scalar packaging options.
///
/// Optional text fields are `None` when unset; the setters on
/// [`BuildOptions`] collapse blank input to `None` so the compiler only has
/// to check for presence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    pub script: Option<Utf8PathBuf>,
    pub mode: BuildMode,
    pub window: WindowMode,
    pub icon: Option<Utf8PathBuf>,
    pub name: Option<String>,
    pub dist_path: Option<Utf8PathBuf>,
    pub work_path: Option<Utf8PathBuf>,
    pub collect_submodules: Option<String>,
    pub key: Option<String>,
    pub splash: Option<Utf8PathBuf>,
    pub log_level: LogLevel,

    /// Raw comma separated module list for `--upx-exclude`
    pub upx_exclude: String,

    // Flags
    pub clean: bool,
    pub no_confirm: bool,
    pub uac_admin: bool,
    pub debug: bool,
    pub no_upx: bool,
    pub strip: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            script: None,
            mode: BuildMode::default(),
            window: WindowMode::default(),
            icon: None,
            name: None,
            dist_path: None,
            work_path: None,
            collect_submodules: None,
            key: None,
            splash: None,
            log_level: LogLevel::default(),
            upx_exclude: String::new(),

            clean: false,
            // Overwriting previous output without asking is on by default
            no_confirm: true,
            uac_admin: false,
            debug: false,
            no_upx: false,
            strip: false,
        }
    }
}

impl BuildOptions {
    /// Create options for a script with every other field at its default
    pub fn for_script(script: impl Into<Utf8PathBuf>) -> Self {
        Self {
            script: non_blank_path(script.into()),
            ..Self::default()
        }
    }

    pub fn set_script(&mut self, script: impl Into<Utf8PathBuf>) {
        self.script = non_blank_path(script.into());
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = non_blank(name);
    }

    pub fn set_dist_path(&mut self, path: impl Into<Utf8PathBuf>) {
        self.dist_path = non_blank_path(path.into());
    }

    pub fn set_work_path(&mut self, path: impl Into<Utf8PathBuf>) {
        self.work_path = non_blank_path(path.into());
    }

    pub fn set_collect_submodules(&mut self, module: &str) {
        self.collect_submodules = non_blank(module);
    }

    pub fn set_key(&mut self, key: &str) {
        self.key = non_blank(key);
    }

    pub fn set_splash(&mut self, path: impl Into<Utf8PathBuf>) {
        self.splash = non_blank_path(path.into());
    }

    /// Store an icon path if it points at an existing file.
    ///
    /// Returns false (and leaves the current icon untouched) otherwise.
    pub fn set_icon(&mut self, path: impl Into<Utf8PathBuf>) -> bool {
        let path = path.into();
        if path.as_str().trim().is_empty() || !path.is_file() {
            return false;
        }
        self.icon = Some(path);
        true
    }

    /// Modules excluded from UPX compression, parsed from [`Self::upx_exclude`]
    pub fn compression_exclusions(&self) -> Vec<String> {
        parse_compression_exclusions(&self.upx_exclude)
    }

    /// Directory that receives the canonical icon files.
    ///
    /// This is the script's containing directory, or the current working
    /// directory when no script is set.
    pub fn project_root(&self) -> std::io::Result<Utf8PathBuf> {
        let script = match &self.script {
            Some(script) => absolutize(script)?,
            None => return current_dir_utf8(),
        };

        match script.parent() {
            Some(parent) if !parent.as_str().is_empty() => Ok(parent.to_path_buf()),
            _ => current_dir_utf8(),
        }
    }
}

/// Split a comma separated module list into trimmed, non-empty names
pub fn parse_compression_exclusions(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|module| !module.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve `path` against the current working directory if it is relative
pub fn absolutize(path: &Utf8Path) -> std::io::Result<Utf8PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(current_dir_utf8()?.join(path))
    }
}

fn current_dir_utf8() -> std::io::Result<Utf8PathBuf> {
    let dir = std::env::current_dir()?;
    Utf8PathBuf::try_from(dir).map_err(|e| e.into_io_error())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn non_blank_path(path: Utf8PathBuf) -> Option<Utf8PathBuf> {
    if path.as_str().trim().is_empty() {
        None
    } else {
        Some(path)
    }
}
