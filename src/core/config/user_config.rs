//! User configuration file handling
//!
//! Manages settings from ~/.config/thaikern/settings.json

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::errors::ThaikernContext;
use crate::rules::{PresetCatalog, PresetKind};

/// Sample text scanned when no `--text` is given
pub const DEFAULT_SAMPLE_TEXT: &str = "ปิ่น อื้อ จี๊ด อื้ม ปรื๋อ ผื่น ลิ้น
ติ๋ม ปริ่ม หั่น ปั้น ตั๊ก ป้า ม๊า
ฝ่า ป่า ฟ้า ผ่า ผ้า จ๋า สิทธิ์
ย่ำ ถ้ำ ฎุ ฎูำ";

pub const DEFAULT_LOG_FILTER: &str = "thaikern=info";

/// A user delta added on top of a preset's derived default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetOverride {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// User configuration from ~/.config/thaikern/settings.json
///
/// These settings override built-in defaults but are overridden by CLI arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Text scanned for pairs by `generate --text` and `scan`
    pub sample_text: Option<String>,
    /// Tracing filter, e.g. "thaikern=debug"
    pub log_filter: Option<String>,
    /// Also write logs to ~/.config/thaikern/logs
    pub log_to_file: Option<bool>,
    /// Offsets keyed by preset id
    #[serde(default)]
    pub preset_offsets: BTreeMap<String, OffsetOverride>,
}

impl ConfigFile {
    /// Get the path to the thaikern config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join("thaikern")
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Load configuration from the user config file
    pub fn load() -> anyhow::Result<Option<Self>> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`. A missing file yields `None` so the
    /// built-in defaults apply; a file that cannot be read or parsed is an
    /// error for the caller to report.
    pub fn load_from(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path).with_file_context("read", path)?;
        let config = serde_json::from_str(&contents).with_file_context("parse", path)?;
        debug!("Loaded user settings from {:?}", path);
        Ok(Some(config))
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_file_context("create", parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).with_file_context("write", path)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Settings written by `--new-config`, with every default spelled out
    pub fn example() -> Self {
        let preset_offsets = PresetKind::ALL
            .iter()
            .map(|kind| (kind.id().to_string(), OffsetOverride::default()))
            .collect();

        Self {
            sample_text: Some(DEFAULT_SAMPLE_TEXT.to_string()),
            log_filter: Some(DEFAULT_LOG_FILTER.to_string()),
            log_to_file: Some(false),
            preset_offsets,
        }
    }

    pub fn sample_text(&self) -> &str {
        self.sample_text.as_deref().unwrap_or(DEFAULT_SAMPLE_TEXT)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn log_to_file(&self) -> bool {
        self.log_to_file.unwrap_or(false)
    }

    /// Copy the configured offsets into `catalog`. Unknown preset ids are
    /// reported and ignored.
    pub fn apply_offsets(&self, catalog: &mut PresetCatalog) {
        for (id, offset) in &self.preset_offsets {
            match id.parse::<PresetKind>() {
                Ok(kind) => {
                    catalog.set_offset(kind, offset.x, offset.y);
                    debug!("Using offset from config file for {}: {:?}", id, offset);
                }
                Err(e) => warn!("Ignoring offset in settings.json: {}", e),
            }
        }
    }

    /// Initialize the user configuration directory
    ///
    /// This creates:
    /// 1. The ~/.config/thaikern directory
    /// 2. A settings.json file with default values
    /// 3. A logs/ directory for file logging
    pub fn initialize_config_directory() -> anyhow::Result<()> {
        let config_dir = Self::config_dir();

        fs::create_dir_all(&config_dir).with_file_context("create", &config_dir)?;
        println!("Created config directory: {:?}", config_dir);

        let logs_dir = crate::logging::logs_dir();
        fs::create_dir_all(&logs_dir).with_file_context("create", &logs_dir)?;
        println!("Created logs directory: {:?}", logs_dir);

        let settings_path = Self::config_path();
        if !settings_path.exists() {
            Self::example().save_to(&settings_path)?;
            println!("Created settings file: {:?}", settings_path);
        } else {
            println!("Settings file already exists: {:?}", settings_path);
        }

        println!("\nConfiguration initialized successfully!");
        println!("You can now:");
        println!("  - Edit settings at: {:?}", settings_path);
        println!("  - View application logs in: {:?}", logs_dir);

        Ok(())
    }
}
