//! # FACEIT Overlay
//!
//! A FACEIT stats proxy that derives session records and win streaks for
//! stream overlays.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (matches, players, reports)
//! - **calculate**: Session inference, streaks and recent-form averages
//! - **aggregate**: Per-player stats pipeline
//! - **search**: Player search with concurrent enrichment
//! - **upstream**: FACEIT Data API client
//! - **cache**: TTL cache with an injectable clock
//! - **api**: REST API endpoints and static pages
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod models;
pub mod search;
pub mod upstream;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "24h", "5m", "90s").
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
