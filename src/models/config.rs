use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Module catalogue from PyiBuilder Modules.yaml
///
/// Lists commonly hidden-imported modules grouped by category, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleCatalog {
    #[serde(rename = "Module_Catalog")]
    pub categories: IndexMap<String, Vec<String>>,
}

/// User configuration from PyiBuilder Config.yaml
///
/// Contains application preferences. Build options are never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Builder_Settings")]
    pub builder_settings: BuilderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderSettings {
    #[serde(rename = "Tool Command", default = "default_tool_command")]
    pub tool_command: String,

    #[serde(rename = "Prefer Taskbar Icon", default = "default_prefer_taskbar_icon")]
    pub prefer_taskbar_icon: bool,

    #[serde(rename = "Debug Logging", default)]
    pub debug_logging: bool,

    #[serde(rename = "Log Directory", default = "default_log_directory")]
    pub log_directory: String,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            tool_command: default_tool_command(),
            prefer_taskbar_icon: default_prefer_taskbar_icon(),
            debug_logging: false,
            log_directory: default_log_directory(),
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            builder_settings: BuilderSettings::default(),
        }
    }
}

fn default_tool_command() -> String {
    "pyinstaller".to_string()
}

fn default_prefer_taskbar_icon() -> bool {
    true
}

fn default_log_directory() -> String {
    "logs".to_string()
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        let mut categories = IndexMap::new();

        categories.insert(
            "AI/ML".to_string(),
            to_strings(&[
                "tensorflow",
                "torch",
                "sklearn",
                "transformers",
                "opencv-python",
                "keras",
            ]),
        );
        categories.insert(
            "Data".to_string(),
            to_strings(&["numpy", "pandas", "matplotlib", "seaborn", "plotly", "scipy"]),
        );
        categories.insert(
            "GUI".to_string(),
            to_strings(&["tkinter", "PyQt5", "PyQt6", "PySide2", "PySide6"]),
        );
        categories.insert(
            "Network".to_string(),
            to_strings(&["requests", "urllib3", "flask", "fastapi"]),
        );
        categories.insert(
            "Other".to_string(),
            to_strings(&["psutil", "sqlite3", "json", "yaml"]),
        );

        Self { categories }
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl ModuleCatalog {
    /// Check if a module is listed under any category
    pub fn contains(&self, module: &str) -> bool {
        self.category_of(module).is_some()
    }

    /// Get the category a module is listed under
    pub fn category_of(&self, module: &str) -> Option<&str> {
        let module = module.trim();
        self.categories
            .iter()
            .find(|(_, modules)| modules.iter().any(|m| m == module))
            .map(|(category, _)| category.as_str())
    }

    /// Iterate every module in catalogue order
    pub fn all_modules(&self) -> impl Iterator<Item = &str> {
        self.categories.values().flatten().map(String::as_str)
    }
}
