//! Per-player stats aggregation.
//!
//! Resolves the player, pulls lifetime totals and recent matches from the
//! upstream source, derives session and recent-form figures, and caches the
//! merged report.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{Clock, TtlCache};
use crate::calculate::{current_streak, select_session, RecentForm, SessionRecord, SessionWindow};
use crate::models::{display_elo, AggregateStats};
use crate::upstream::{StatsSource, UpstreamError};

/// Errors building a stats report.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Player lookup failed for {username}: {source}")]
    PlayerLookup {
        username: String,
        #[source]
        source: UpstreamError,
    },

    #[error("Stats fetch failed for {username}: {source}")]
    Upstream {
        username: String,
        #[source]
        source: UpstreamError,
    },
}

impl StatsError {
    /// The underlying upstream failure.
    pub fn upstream(&self) -> &UpstreamError {
        match self {
            StatsError::PlayerLookup { source, .. } | StatsError::Upstream { source, .. } => source,
        }
    }
}

/// Settings the aggregator needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub default_player: String,
    pub match_limit: u32,
    pub window: SessionWindow,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            default_player: "piK".to_string(),
            match_limit: 30,
            window: SessionWindow::default(),
        }
    }
}

/// Builds [`AggregateStats`] reports.
pub struct StatsAggregator {
    source: Arc<dyn StatsSource>,
    cache: Arc<TtlCache<AggregateStats>>,
    clock: Arc<dyn Clock>,
    settings: AggregatorSettings,
}

impl StatsAggregator {
    pub fn new(
        source: Arc<dyn StatsSource>,
        cache: Arc<TtlCache<AggregateStats>>,
        clock: Arc<dyn Clock>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            source,
            cache,
            clock,
            settings,
        }
    }

    /// Cache key for a player's report.
    pub fn cache_key(username: &str) -> String {
        format!("stats_{}", username)
    }

    /// Player used when a request names none (or only whitespace).
    pub fn resolve_username<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(self.settings.default_player.as_str())
    }

    /// Build the report for `username`, or the default player.
    ///
    /// A cached report short-circuits every upstream call. Any upstream
    /// failure aborts the whole report and nothing is cached.
    pub async fn get_stats(&self, username: Option<&str>) -> Result<AggregateStats, StatsError> {
        let username = self.resolve_username(username).to_string();
        let key = Self::cache_key(&username);

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Serving stats for {} from cache", username);
            return Ok(cached);
        }

        info!("Fetching stats for {} from {}", username, self.source.name());

        let profile = self
            .source
            .player_by_nickname(&username)
            .await
            .map_err(|source| StatsError::PlayerLookup {
                username: username.clone(),
                source,
            })?;

        let (lifetime, matches) = tokio::try_join!(
            self.source.lifetime_stats(&profile.player_id),
            self.source
                .recent_matches(&profile.player_id, self.settings.match_limit),
        )
        .map_err(|source| StatsError::Upstream {
            username: username.clone(),
            source,
        })?;

        let session = select_session(&matches, self.clock.now(), &self.settings.window);
        let record = SessionRecord::from_session(&session);
        let form = RecentForm::from_matches(&matches);
        let streak = current_streak(&matches);

        debug!(
            "{}: {} recent matches, session {}W/{}L, streak {}",
            username,
            matches.len(),
            record.wins,
            record.losses,
            streak
        );

        let stats = AggregateStats {
            username: profile.nickname.clone(),
            avatar: profile.avatar,
            level: profile.level,
            level_icon: profile.level.icon(),
            elo: display_elo(profile.elo),
            matches: lifetime.matches,
            win_rate: lifetime.win_rate,
            wins: record.wins,
            losses: record.losses,
            avg_kills: form.avg_kills,
            avg_adr: form.avg_adr,
            avg_kd: form.avg_kd,
            streak,
        };

        self.cache.insert(key, stats.clone()).await;
        Ok(stats)
    }
}
