use crate::models::options::{TASKBAR_ICON_NAME, absolutize};
use crate::models::{BuildSession, BuilderSettings, LogLevel};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that prevent a command from being produced
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("No Python script selected")]
    MissingScript,
}

/// Service that turns a [`BuildSession`] into a PyInstaller command line
///
/// The token order is fixed and is the whole observable contract of this
/// service. Values that may contain spaces are wrapped in double quotes;
/// nothing else is escaped, so a value containing a double quote produces a
/// command the shell will split differently.
///
/// The only filesystem access is the icon lookup: the configured icon must
/// exist, and a taskbar icon (`icon1.ico`) in the project directory replaces
/// it when `prefer_taskbar_icon` is set.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    /// First token of every command (normally `pyinstaller`)
    tool_command: String,

    /// Replace the selected icon with `icon1.ico` from the project directory if present
    prefer_taskbar_icon: bool,
}

impl CommandCompiler {
    /// Create a compiler with the default tool command and taskbar icon override enabled
    pub fn new() -> Self {
        Self::from_settings(&BuilderSettings::default())
    }

    pub fn from_settings(settings: &BuilderSettings) -> Self {
        Self {
            tool_command: settings.tool_command.clone(),
            prefer_taskbar_icon: settings.prefer_taskbar_icon,
        }
    }

    /// Build the command and join it into a single line
    pub fn compile(&self, session: &BuildSession) -> Result<String, CompileError> {
        let command = self.tokens(session)?.join(" ");
        tracing::info!("Generated command: {}", command);
        Ok(command)
    }

    /// Build the ordered command tokens.
    ///
    /// Each flag and its value form one token (`-n "App"`), matching how the
    /// joined command reads.
    pub fn tokens(&self, session: &BuildSession) -> Result<Vec<String>, CompileError> {
        let options = &session.options;
        let script = options.script.as_ref().ok_or(CompileError::MissingScript)?;

        let mut parts = vec![self.tool_command.clone()];

        parts.push(options.mode.flag().to_string());
        parts.push(options.window.flag().to_string());

        if let Some(icon) = self.resolve_icon(session) {
            parts.push(format!("-i {}", quoted(icon.as_str())));
        }

        if let Some(name) = &options.name {
            parts.push(format!("-n {}", quoted(name)));
        }

        if let Some(dist) = &options.dist_path {
            parts.push(format!("--distpath {}", quoted(dist.as_str())));
        }

        if let Some(work) = &options.work_path {
            parts.push(format!("--workpath {}", quoted(work.as_str())));
        }

        for path in session.search_paths.iter() {
            parts.push(format!("-p {}", quoted(path.as_str())));
        }

        for mapping in session.data_files.iter() {
            parts.push(format!("--add-data {}", quoted(&mapping.to_arg())));
        }

        for mapping in session.binary_files.iter() {
            parts.push(format!("--add-binary {}", quoted(&mapping.to_arg())));
        }

        for module in session.hidden_imports.iter() {
            parts.push(format!("--hidden-import {}", module));
        }

        if let Some(module) = &options.collect_submodules {
            parts.push(format!("--collect-submodules {}", module));
        }

        for module in session.excluded_modules.iter() {
            parts.push(format!("--exclude-module {}", module));
        }

        if options.debug {
            parts.push("--debug".to_string());
        }

        if options.clean {
            parts.push("--clean".to_string());
        }

        if options.no_upx {
            parts.push("--noupx".to_string());
        }

        if options.no_confirm {
            parts.push("-y".to_string());
        }

        if options.log_level != LogLevel::default() {
            parts.push(format!("--log-level {}", options.log_level));
        }

        if options.uac_admin {
            parts.push("--uac-admin".to_string());
        }

        if options.strip {
            parts.push("--strip".to_string());
        }

        for module in options.compression_exclusions() {
            parts.push(format!("--upx-exclude {}", quoted(&module)));
        }

        if let Some(key) = &options.key {
            parts.push(format!("--key {}", quoted(key)));
        }

        if let Some(splash) = &options.splash {
            parts.push(format!("--splash {}", quoted(splash.as_str())));
        }

        parts.push(quoted(script.as_str()));

        Ok(parts)
    }

    /// Determine which icon file the `-i` flag should reference.
    ///
    /// Returns `None` (with a warning) when the configured icon no longer
    /// exists. When it does, a taskbar icon in the project directory wins over
    /// the configured one.
    pub fn resolve_icon(&self, session: &BuildSession) -> Option<Utf8PathBuf> {
        let icon = session.options.icon.as_ref()?;

        if !icon.exists() {
            tracing::warn!("Icon file does not exist, skipping -i: {}", icon);
            return None;
        }

        if self.prefer_taskbar_icon {
            match session.options.project_root() {
                Ok(root) => {
                    let taskbar_icon = root.join(TASKBAR_ICON_NAME);
                    if taskbar_icon.is_file() {
                        tracing::debug!("Using taskbar icon: {}", taskbar_icon);
                        return Some(taskbar_icon);
                    }
                }
                Err(e) => {
                    tracing::warn!("Could not determine project directory: {}", e);
                }
            }
        }

        match absolutize(icon) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Could not resolve icon path {}: {}", icon, e);
                Some(icon.clone())
            }
        }
    }
}

impl Default for CommandCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a value in double quotes without escaping
fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}
