//! Runtime configuration, loaded from TOML.
//!
//! Every key is optional; missing keys fall back to the defaults below.
//!
//! ```toml
//! [display]
//! width = 1280
//! height = 800
//!
//! [windows]
//! max_open = 4
//!
//! [progression]
//! suppressed_level_ups = [5]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HexError, Result};
use crate::session::{Difficulty, Role};

/// Top-level hexdesk configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HexdeskConfig {
    pub display: DisplayConfig,
    pub windows: WindowConfig,
    pub progression: ProgressionConfig,
    pub vfs: VfsConfig,
    pub storage: StorageConfig,
}

/// Viewport geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: i32,
    pub height: i32,
    /// Viewports narrower than this use the mobile layout.
    pub mobile_breakpoint: i32,
    /// Height reserved at the bottom of the screen for the taskbar.
    pub taskbar_height: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            mobile_breakpoint: 768,
            taskbar_height: 48,
        }
    }
}

/// Window manager limits and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub max_open: usize,
    pub cascade_origin: i32,
    pub cascade_step: i32,
    pub default_width: i32,
    pub default_height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_open: 4,
            cascade_origin: 50,
            cascade_step: 30,
            default_width: 640,
            default_height: 480,
        }
    }
}

/// Experience curve and level-up presentation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub xp_per_level: u32,
    pub max_level: u32,
    /// Levels whose generic level-up signal is acknowledged immediately
    /// because a dedicated screen handles them.
    pub suppressed_level_ups: Vec<u32>,
    pub level_up_delay_ms: u64,
    /// Role whose events count toward quests.
    pub tracked_role: Role,
    /// Difficulty whose events count toward quests.
    pub tracked_difficulty: Difficulty,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_level: 250,
            max_level: 5,
            suppressed_level_ups: vec![5],
            level_up_delay_ms: 1500,
            tracked_role: Role::Guest,
            tracked_difficulty: Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsConfig {
    /// Directory `~` expands to.
    pub home: String,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            home: "/home/guest".to_string(),
        }
    }
}

/// Where persisted state lives. `None` keeps everything in memory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
}

impl HexdeskConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loading config from {}", path.display());
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.progression.xp_per_level == 0 {
            return Err(HexError::Config("xp_per_level must be positive".into()));
        }
        if self.progression.max_level == 0 {
            return Err(HexError::Config("max_level must be at least 1".into()));
        }
        if self.windows.max_open == 0 {
            return Err(HexError::Config("windows.max_open must be at least 1".into()));
        }
        if !self.vfs.home.starts_with('/') {
            return Err(HexError::Config(format!(
                "vfs.home must be absolute: {}",
                self.vfs.home
            )));
        }
        Ok(())
    }
}
