//! Player identity and search models.

use serde::{Deserialize, Serialize};

use super::{display_elo, SkillLevel};

/// Player identity resolved for the configured game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: String,
    pub nickname: String,
    pub avatar: String,
    pub country: String,

    /// Level for the configured game (1 when the player has no entry for it)
    pub level: SkillLevel,

    /// Elo for the configured game, if known
    pub elo: Option<u32>,
}

/// Lifetime totals for the configured game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub matches: u32,

    /// Win rate percentage as reported upstream
    pub win_rate: String,
}

/// One raw hit from the upstream player search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub player_id: String,
    pub nickname: String,
    pub avatar: String,
    pub country: String,

    /// Level listed on the hit itself, when the game entry is present
    pub level: Option<SkillLevel>,
}

/// A search result as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub player_id: String,
    pub nickname: String,
    pub avatar: String,
    pub country: String,
    pub level: SkillLevel,
    pub level_icon: String,
    pub elo: String,
}

impl PlayerSummary {
    /// Merge a search hit with the resolved profile for its player.
    pub fn from_profile(hit: &SearchHit, profile: &PlayerProfile) -> Self {
        Self {
            player_id: hit.player_id.clone(),
            nickname: hit.nickname.clone(),
            avatar: if profile.avatar.is_empty() {
                hit.avatar.clone()
            } else {
                profile.avatar.clone()
            },
            country: hit.country.clone(),
            level: profile.level,
            level_icon: profile.level.icon(),
            elo: display_elo(profile.elo),
        }
    }

    /// Summary for a hit whose detail lookup failed.
    ///
    /// Keeps the level listed on the hit itself, or level 1 when the hit has
    /// no entry for the game. Elo is unknown.
    pub fn degraded(hit: &SearchHit) -> Self {
        let level = hit.level.unwrap_or(SkillLevel::LOWEST);
        Self {
            player_id: hit.player_id.clone(),
            nickname: hit.nickname.clone(),
            avatar: hit.avatar.clone(),
            country: hit.country.clone(),
            level,
            level_icon: level.icon(),
            elo: display_elo(None),
        }
    }
}
