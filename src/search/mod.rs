//! Player search with per-hit enrichment.
//!
//! Upstream search hits carry no elo, so every hit is resolved to a full
//! profile concurrently. A failed lookup only degrades its own entry.

use std::cmp::Ordering;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::models::{PlayerSummary, SearchHit};
use crate::upstream::{StatsSource, UpstreamError};

/// Queries shorter than this return nothing without calling upstream.
pub const MIN_QUERY_LEN: usize = 2;

/// Errors from player search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Player search failed for {query:?}: {source}")]
    Upstream {
        query: String,
        #[source]
        source: UpstreamError,
    },
}

/// Searches players and resolves their level and elo.
pub struct PlayerSearch {
    source: Arc<dyn StatsSource>,
    cache: Arc<TtlCache<Vec<PlayerSummary>>>,
}

impl PlayerSearch {
    pub fn new(source: Arc<dyn StatsSource>, cache: Arc<TtlCache<Vec<PlayerSummary>>>) -> Self {
        Self { source, cache }
    }

    pub fn cache_key(query: &str, limit: u32) -> String {
        format!("search_{}_{}", limit, query)
    }

    /// Search for up to `limit` players matching `query`, best matches first.
    pub async fn search_players(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<PlayerSummary>, SearchError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let key = Self::cache_key(query, limit);
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Serving search {:?} from cache", query);
            return Ok(cached);
        }

        let hits = self
            .source
            .search_players(query, limit)
            .await
            .map_err(|source| SearchError::Upstream {
                query: query.to_string(),
                source,
            })?;

        info!("Search {:?} returned {} hits", query, hits.len());

        let mut results = self.enrich(&hits).await;
        sort_by_relevance(&mut results, query);
        results.truncate(limit as usize);

        self.cache.insert(key, results.clone()).await;
        Ok(results)
    }

    /// Resolve every hit concurrently; failures fall back to a default summary.
    async fn enrich(&self, hits: &[SearchHit]) -> Vec<PlayerSummary> {
        let lookups = hits.iter().map(|hit| async move {
            match self.source.player_by_id(&hit.player_id).await {
                Ok(profile) => PlayerSummary::from_profile(hit, &profile),
                Err(e) => {
                    warn!("Detail lookup failed for {}: {}", hit.nickname, e);
                    PlayerSummary::degraded(hit)
                }
            }
        });

        join_all(lookups).await
    }
}

/// Order results: prefix matches first, then exact matches, then by name.
///
/// All comparisons ignore case. Names equal ignoring case fall back to a
/// case-sensitive comparison so the order is deterministic.
pub fn sort_by_relevance(results: &mut [PlayerSummary], query: &str) {
    let query = query.to_lowercase();
    results.sort_by(|a, b| compare_relevance(&a.nickname, &b.nickname, &query));
}

fn compare_relevance(a: &str, b: &str, query: &str) -> Ordering {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();

    let a_starts = a_lower.starts_with(query);
    let b_starts = b_lower.starts_with(query);
    let a_exact = a_lower == query;
    let b_exact = b_lower == query;

    b_starts
        .cmp(&a_starts)
        .then_with(|| b_exact.cmp(&a_exact))
        .then_with(|| a_lower.cmp(&b_lower))
        .then_with(|| a.cmp(b))
}
