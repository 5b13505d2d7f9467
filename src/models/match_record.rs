//! Per-match records taken from a player's recent history.

use serde::{Deserialize, Serialize};

/// Timestamps above this are milliseconds (seconds would be past the year 2286).
const MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// Outcome of a single match for the tracked player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
}

impl MatchResult {
    /// Upstream encodes a win as `1`; anything else counts as a loss.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 1 {
            MatchResult::Win
        } else {
            MatchResult::Loss
        }
    }

    pub fn is_win(self) -> bool {
        self == MatchResult::Win
    }
}

/// One completed match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Completion time, seconds since the Unix epoch
    pub finished_at: i64,

    pub result: MatchResult,

    #[serde(default)]
    pub kills: u32,

    /// Average damage per round
    #[serde(default)]
    pub adr: f64,

    #[serde(default)]
    pub kd_ratio: f64,
}

impl MatchRecord {
    /// Build a record, normalizing the timestamp to seconds.
    pub fn new(finished_at: i64, result: MatchResult) -> Self {
        Self {
            finished_at: normalize_timestamp(finished_at),
            result,
            kills: 0,
            adr: 0.0,
            kd_ratio: 0.0,
        }
    }

    pub fn with_kills(mut self, kills: u32) -> Self {
        self.kills = kills;
        self
    }

    pub fn with_adr(mut self, adr: f64) -> Self {
        self.adr = adr.max(0.0);
        self
    }

    pub fn with_kd_ratio(mut self, kd_ratio: f64) -> Self {
        self.kd_ratio = kd_ratio.max(0.0);
        self
    }

    pub fn is_win(&self) -> bool {
        self.result.is_win()
    }
}

/// Convert an upstream timestamp that may be in seconds or milliseconds to seconds.
pub fn normalize_timestamp(raw: i64) -> i64 {
    if raw > MILLIS_THRESHOLD {
        raw / 1000
    } else {
        raw
    }
}
