//! The per-player report served to the overlay.

use serde::{Deserialize, Serialize};

use super::SkillLevel;

/// Aggregated stats for one player, built once per request and cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub username: String,
    pub avatar: String,
    pub level: SkillLevel,
    pub level_icon: String,

    /// Elo rating, `"-"` when unknown
    pub elo: String,

    /// Lifetime match count
    pub matches: u32,

    /// Lifetime win rate percentage
    pub win_rate: String,

    /// Wins in the current session
    pub wins: u32,

    /// Losses in the current session
    pub losses: u32,

    pub avg_kills: String,

    #[serde(rename = "avgADR")]
    pub avg_adr: String,

    #[serde(rename = "avgKD")]
    pub avg_kd: String,

    /// Consecutive wins from the most recent match
    pub streak: u32,
}
