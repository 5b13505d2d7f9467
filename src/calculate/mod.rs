//! Statistics calculation engine.
//!
//! Computes derived metrics from a player's recent matches:
//! - Current win streak
//! - Average kills, ADR and K/D over the recent window
//! - Session inference (see [`session`])

pub mod session;

use serde::Serialize;

use crate::models::MatchRecord;

pub use session::{partition_sessions, select_session, SessionRecord, SessionWindow};

/// Count consecutive wins from the most recent match.
///
/// `matches` must be in upstream order (most recent first). Counting stops
/// at the first loss.
pub fn current_streak(matches: &[MatchRecord]) -> u32 {
    matches.iter().take_while(|m| m.is_win()).count() as u32
}

/// Averages over the recent match window, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentForm {
    pub avg_kills: String,
    pub avg_adr: String,
    pub avg_kd: String,
}

impl RecentForm {
    pub fn from_matches(matches: &[MatchRecord]) -> Self {
        if matches.is_empty() {
            return Self {
                avg_kills: "0".to_string(),
                avg_adr: "0".to_string(),
                avg_kd: "0.00".to_string(),
            };
        }

        let count = matches.len() as f64;
        let kills: f64 = matches.iter().map(|m| m.kills as f64).sum();
        let adr: f64 = matches.iter().map(|m| m.adr).sum();
        let kd: f64 = matches.iter().map(|m| m.kd_ratio).sum();

        Self {
            avg_kills: format!("{:.1}", kills / count),
            avg_adr: format!("{:.1}", adr / count),
            avg_kd: format!("{:.2}", kd / count),
        }
    }
}
