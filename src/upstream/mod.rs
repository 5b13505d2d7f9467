//! Upstream statistics API.
//!
//! All player and match data comes from a [`StatsSource`]. The production
//! source is [`faceit::FaceitClient`]; tests use an in-memory mock.

pub mod faceit;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{LifetimeStats, MatchRecord, PlayerProfile, SearchHit};

pub use faceit::FaceitClient;

/// Errors talking to the upstream API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Read access to player and match data.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Resolve a player by nickname.
    async fn player_by_nickname(&self, nickname: &str) -> Result<PlayerProfile, UpstreamError>;

    /// Resolve a player by upstream id.
    async fn player_by_id(&self, player_id: &str) -> Result<PlayerProfile, UpstreamError>;

    /// Lifetime totals for the configured game.
    async fn lifetime_stats(&self, player_id: &str) -> Result<LifetimeStats, UpstreamError>;

    /// Up to `limit` recent matches, most recent first.
    async fn recent_matches(
        &self,
        player_id: &str,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, UpstreamError>;

    /// Search players by nickname fragment.
    async fn search_players(&self, query: &str, limit: u32)
        -> Result<Vec<SearchHit>, UpstreamError>;
}

/// In-memory source that counts calls and can fail on demand.
#[cfg(test)]
pub struct MockStatsSource {
    pub profiles: Vec<PlayerProfile>,
    pub lifetime: LifetimeStats,
    pub matches: Vec<MatchRecord>,
    pub hits: Vec<SearchHit>,
    /// Player ids whose detail lookup fails
    pub failing_ids: Vec<String>,
    /// Operations that fail, by trait method name
    pub failing_ops: Vec<&'static str>,
    /// Fail every call
    pub offline: bool,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockStatsSource {
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            lifetime: LifetimeStats::default(),
            matches: Vec::new(),
            hits: Vec::new(),
            failing_ids: Vec::new(),
            failing_ops: Vec::new(),
            offline: false,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn record_call(&self, op: &str) -> Result<(), UpstreamError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.offline {
            return Err(UpstreamError::HttpStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        if self.failing_ops.contains(&op) {
            return Err(UpstreamError::HttpStatus {
                status: 502,
                message: format!("{} failed", op),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
impl Default for MockStatsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[async_trait]
impl StatsSource for MockStatsSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn player_by_nickname(&self, nickname: &str) -> Result<PlayerProfile, UpstreamError> {
        self.record_call("player_by_nickname")?;
        self.profiles
            .iter()
            .find(|p| p.nickname == nickname)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(nickname.to_string()))
    }

    async fn player_by_id(&self, player_id: &str) -> Result<PlayerProfile, UpstreamError> {
        self.record_call("player_by_id")?;
        if self.failing_ids.iter().any(|id| id == player_id) {
            return Err(UpstreamError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        self.profiles
            .iter()
            .find(|p| p.player_id == player_id)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(player_id.to_string()))
    }

    async fn lifetime_stats(&self, _player_id: &str) -> Result<LifetimeStats, UpstreamError> {
        self.record_call("lifetime_stats")?;
        Ok(self.lifetime.clone())
    }

    async fn recent_matches(
        &self,
        _player_id: &str,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, UpstreamError> {
        self.record_call("recent_matches")?;
        Ok(self.matches.iter().take(limit as usize).cloned().collect())
    }

    async fn search_players(
        &self,
        _query: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, UpstreamError> {
        self.record_call("search_players")?;
        Ok(self.hits.iter().take(limit as usize).cloned().collect())
    }
}
