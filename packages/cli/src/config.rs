use blockmail_compiler_html::CompileOptions;
use blockmail_editor::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "blockmail.config.json";

/// Blockmail configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTML export options
    #[serde(default)]
    pub export: ExportConfig,

    /// Editing session tunables
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Document `<title>`
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Emit `data-block-id` attributes
    #[serde(default = "default_true")]
    pub block_ids: bool,

    #[serde(default)]
    pub escape_text: bool,

    /// Output directory for directory exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

fn default_title() -> String {
    "Email Template".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            pretty: true,
            block_ids: true,
            escape_text: false,
            out_dir: None,
        }
    }
}

impl ExportConfig {
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            pretty: self.pretty,
            title: self.title.clone(),
            block_ids: self.block_ids,
            escape_text: self.escape_text,
            ..Default::default()
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the export output directory
    pub fn get_out_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(self.export.out_dir.as_deref().unwrap_or("dist"))
    }
}
