//! Skill level handling and icon lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const ICON_BASE: &str = "https://cdn-frontend.faceit-cdn.net/web/static/media";

const LEVEL_ICONS: [&str; 10] = [
    "assets_images_skill-icons_skill_level_1_svg.svg",
    "assets_images_skill-icons_skill_level_2_svg.svg",
    "assets_images_skill-icons_skill_level_3_svg.svg",
    "assets_images_skill-icons_skill_level_4_svg.svg",
    "assets_images_skill-icons_skill_level_5_svg.svg",
    "assets_images_skill-icons_skill_level_6_svg.svg",
    "assets_images_skill-icons_skill_level_7_svg.svg",
    "assets_images_skill-icons_skill_level_8_svg.svg",
    "assets_images_skill-icons_skill_level_9_svg.svg",
    "assets_images_skill-icons_skill_level_10_svg.svg",
];

/// A player's skill level for one game. Levels run 1 through 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillLevel(u32);

impl SkillLevel {
    pub const LOWEST: SkillLevel = SkillLevel(1);

    pub fn new(level: u32) -> Self {
        Self(level)
    }

    /// Read a level from an upstream JSON value. Absent or non-numeric values yield level 1.
    pub fn from_value(value: Option<&Value>) -> Self {
        let parsed = match value {
            Some(Value::Number(n)) => n.as_u64().map(|n| n as u32),
            Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
            _ => None,
        };
        parsed.map(Self).unwrap_or(Self::LOWEST)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Icon URL for this level; unknown levels use the level 1 icon.
    pub fn icon(self) -> String {
        let file = match self.0 {
            1..=10 => LEVEL_ICONS[(self.0 - 1) as usize],
            _ => LEVEL_ICONS[0],
        };
        format!("{}/{}", ICON_BASE, file)
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display form of an elo rating; `"-"` when unknown.
pub fn display_elo(elo: Option<u32>) -> String {
    match elo {
        Some(elo) => elo.to_string(),
        None => "-".to_string(),
    }
}
