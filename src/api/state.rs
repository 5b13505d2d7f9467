use std::sync::Arc;

use crate::aggregate::{AggregatorSettings, StatsAggregator};
use crate::cache::{Clock, TtlCache};
use crate::config::{AppConfig, ConfigError};
use crate::search::PlayerSearch;
use crate::upstream::StatsSource;

#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StatsAggregator>,
    pub search: Arc<PlayerSearch>,
    /// Search result count when the request sets none
    pub search_limit: u32,
}

impl AppState {
    /// Wire the aggregator and search component to one source and clock.
    pub fn from_config(
        config: &AppConfig,
        source: Arc<dyn StatsSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let stats_cache = Arc::new(TtlCache::new(config.cache.stats_ttl()?, clock.clone()));
        let search_cache = Arc::new(TtlCache::new(config.cache.search_ttl()?, clock.clone()));

        let settings = AggregatorSettings {
            default_player: config.faceit.default_player.clone(),
            match_limit: config.faceit.match_limit,
            window: config.session.window()?,
        };

        Ok(Self {
            stats: Arc::new(StatsAggregator::new(
                source.clone(),
                stats_cache,
                clock,
                settings,
            )),
            search: Arc::new(PlayerSearch::new(source, search_cache)),
            search_limit: config.faceit.search_limit,
        })
    }
}
