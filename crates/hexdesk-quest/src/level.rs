//! Experience curve.

use hexdesk_types::config::ProgressionConfig;

/// Linear XP curve with a level cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCurve {
    pub xp_per_level: u32,
    pub max_level: u32,
}

impl LevelCurve {
    pub fn from_config(config: &ProgressionConfig) -> Self {
        Self {
            xp_per_level: config.xp_per_level.max(1),
            max_level: config.max_level.max(1),
        }
    }

    /// `min(xp / xp_per_level + 1, max_level)`.
    pub fn level_for(&self, xp: u32) -> u32 {
        (xp / self.xp_per_level + 1).min(self.max_level)
    }

    /// XP earned inside the current level and the XP a level spans. At the
    /// cap the bar reads full.
    pub fn progress_in_level(&self, xp: u32) -> (u32, u32) {
        if self.level_for(xp) >= self.max_level {
            return (self.xp_per_level, self.xp_per_level);
        }
        (xp % self.xp_per_level, self.xp_per_level)
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::from_config(&ProgressionConfig::default())
    }
}
