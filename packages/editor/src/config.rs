use crate::{Breakpoint, EditorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "gbn.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Breakpoint whose edits land directly in a block's base config
    #[serde(default = "default_base_breakpoint")]
    pub base_breakpoint: Breakpoint,

    /// Breakpoints offered by the viewport switcher
    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,

    /// Presentation classes that simulate hover/focus on the active block
    #[serde(default = "default_simulated_state_classes")]
    pub simulated_state_classes: Vec<String>,

    /// Prefix for the per-mode class applied to the panel root
    #[serde(default = "default_panel_class_prefix")]
    pub panel_class_prefix: String,
}

fn default_base_breakpoint() -> Breakpoint {
    Breakpoint::Desktop
}

fn default_breakpoints() -> Vec<Breakpoint> {
    vec![Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile]
}

fn default_simulated_state_classes() -> Vec<String> {
    vec![
        "gbn-simulate-hover".to_string(),
        "gbn-simulate-focus".to_string(),
    ]
}

fn default_panel_class_prefix() -> String {
    "gbn-panel-".to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(cwd: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = cwd.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EditorError> {
        if !self.breakpoints.contains(&self.base_breakpoint) {
            return Err(EditorError::Config(format!(
                "base breakpoint '{}' is not listed in breakpoints",
                self.base_breakpoint
            )));
        }
        if self.panel_class_prefix.trim().is_empty() {
            return Err(EditorError::Config(
                "panelClassPrefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a breakpoint is one the viewport switcher knows about
    pub fn knows_breakpoint(&self, breakpoint: &Breakpoint) -> bool {
        self.breakpoints.contains(breakpoint)
    }

    /// Path of the config file inside `cwd`
    pub fn path_in(cwd: impl AsRef<Path>) -> PathBuf {
        cwd.as_ref().join(DEFAULT_CONFIG_NAME)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_breakpoint: default_base_breakpoint(),
            breakpoints: default_breakpoints(),
            simulated_state_classes: default_simulated_state_classes(),
            panel_class_prefix: default_panel_class_prefix(),
        }
    }
}
