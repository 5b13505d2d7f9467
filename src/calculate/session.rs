//! Session inference from match timestamps.
//!
//! The upstream API has no notion of a play session. A session here is a
//! run of matches, sorted by completion time, where every neighbouring pair
//! finished less than `gap_threshold` apart. Only matches inside the
//! lookback window take part.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::MatchRecord;

/// Time bounds used to chain matches into sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    /// How far back from now a match may have finished
    pub lookback: Duration,

    /// Largest idle time (exclusive) between two matches of one session
    pub gap_threshold: Duration,
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            lookback: Duration::from_secs(24 * 3600),
            gap_threshold: Duration::from_secs(6 * 3600),
        }
    }
}

impl SessionWindow {
    fn lookback_secs(&self) -> i64 {
        i64::try_from(self.lookback.as_secs()).unwrap_or(i64::MAX)
    }

    fn gap_secs(&self) -> i64 {
        i64::try_from(self.gap_threshold.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Win/loss tally for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub wins: u32,
    pub losses: u32,
}

impl SessionRecord {
    pub fn from_session(session: &[MatchRecord]) -> Self {
        let wins = session.iter().filter(|m| m.is_win()).count() as u32;
        Self {
            wins,
            losses: session.len() as u32 - wins,
        }
    }
}

/// Matches inside the lookback window, stably sorted by completion time.
fn windowed(
    matches: &[MatchRecord],
    now: DateTime<Utc>,
    window: &SessionWindow,
) -> Vec<MatchRecord> {
    let cutoff = now.timestamp().saturating_sub(window.lookback_secs());
    let mut recent: Vec<MatchRecord> = matches
        .iter()
        .filter(|m| m.finished_at >= cutoff)
        .cloned()
        .collect();
    recent.sort_by_key(|m| m.finished_at);
    recent
}

/// Split the windowed matches into consecutive sessions, oldest first.
///
/// Every match inside the lookback window lands in exactly one session.
pub fn partition_sessions(
    matches: &[MatchRecord],
    now: DateTime<Utc>,
    window: &SessionWindow,
) -> Vec<Vec<MatchRecord>> {
    let mut sessions: Vec<Vec<MatchRecord>> = Vec::new();
    let mut current: Vec<MatchRecord> = Vec::new();

    for record in windowed(matches, now, window) {
        let extends = current.last().is_some_and(|prev| {
            record.finished_at.saturating_sub(prev.finished_at) < window.gap_secs()
        });

        if !extends && !current.is_empty() {
            sessions.push(std::mem::take(&mut current));
        }
        current.push(record);
    }

    if !current.is_empty() {
        sessions.push(current);
    }

    sessions
}

/// Pick the session to report as "today".
///
/// The longest session wins; between sessions of equal length the earlier
/// one is kept. Returns an empty vec when no match is inside the window.
pub fn select_session(
    matches: &[MatchRecord],
    now: DateTime<Utc>,
    window: &SessionWindow,
) -> Vec<MatchRecord> {
    let mut best: Vec<MatchRecord> = Vec::new();

    for session in partition_sessions(matches, now, window) {
        // Strict comparison keeps the first of equally long sessions
        if session.len() > best.len() {
            best = session;
        }
    }

    best
}
