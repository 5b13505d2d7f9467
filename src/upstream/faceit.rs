//! FACEIT Data API v4 client.
//!
//! Maps the upstream JSON into domain models. The API is loose about types:
//! numbers often arrive as strings, game sub-objects may be missing and
//! timestamps come in milliseconds. Anything with a safe default is
//! defaulted rather than rejected.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{StatsSource, UpstreamError};
use crate::config::FaceitConfig;
use crate::models::{
    LifetimeStats, MatchRecord, MatchResult, PlayerProfile, SearchHit, SkillLevel,
};

/// HTTP client for the FACEIT Data API.
pub struct FaceitClient {
    client: Client,
    base_url: Url,
    api_key: String,
    game: String,
}

impl FaceitClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        game: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("faceit-overlay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            game: game.into(),
        })
    }

    pub fn from_config(config: &FaceitConfig) -> Result<Self, UpstreamError> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            config.game.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// GET a JSON document with bearer auth.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
            return Err(UpstreamError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl StatsSource for FaceitClient {
    fn name(&self) -> &'static str {
        "faceit"
    }

    async fn player_by_nickname(&self, nickname: &str) -> Result<PlayerProfile, UpstreamError> {
        let response: PlayerResponse = self
            .get_json("/players", &[("nickname", nickname.to_string())])
            .await?;
        Ok(response.into_profile(&self.game))
    }

    async fn player_by_id(&self, player_id: &str) -> Result<PlayerProfile, UpstreamError> {
        let response: PlayerResponse = self
            .get_json(&format!("/players/{}", player_id), &[])
            .await?;
        Ok(response.into_profile(&self.game))
    }

    async fn lifetime_stats(&self, player_id: &str) -> Result<LifetimeStats, UpstreamError> {
        let response: StatsResponse = self
            .get_json(&format!("/players/{}/stats/{}", player_id, self.game), &[])
            .await?;
        Ok(response.into_lifetime())
    }

    async fn recent_matches(
        &self,
        player_id: &str,
        limit: u32,
    ) -> Result<Vec<MatchRecord>, UpstreamError> {
        let response: MatchHistoryResponse = self
            .get_json(
                &format!("/players/{}/games/{}/stats", player_id, self.game),
                &[("offset", "0".to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(response.into_matches())
    }

    async fn search_players(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, UpstreamError> {
        let response: SearchResponse = self
            .get_json(
                "/search/players",
                &[
                    ("nickname", query.to_string()),
                    ("game", self.game.clone()),
                    ("offset", "0".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(response.into_hits(&self.game))
    }
}

// ── Upstream response shapes ────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    player_id: String,
    nickname: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    games: HashMap<String, GameEntry>,
}

#[derive(Debug, Deserialize)]
struct GameEntry {
    #[serde(default)]
    skill_level: Option<Value>,
    #[serde(default)]
    faceit_elo: Option<Value>,
}

impl PlayerResponse {
    fn into_profile(self, game: &str) -> PlayerProfile {
        let entry = self.games.get(game);
        PlayerProfile {
            player_id: self.player_id,
            nickname: self.nickname,
            avatar: self.avatar.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            level: SkillLevel::from_value(entry.and_then(|g| g.skill_level.as_ref())),
            elo: entry
                .and_then(|g| as_f64(g.faceit_elo.as_ref()))
                .filter(|elo| *elo >= 0.0)
                .map(|elo| elo as u32),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    lifetime: HashMap<String, Value>,
}

impl StatsResponse {
    fn into_lifetime(self) -> LifetimeStats {
        let matches = as_f64(self.lifetime.get("Matches"))
            .map(|m| m.max(0.0) as u32)
            .unwrap_or(0);

        let win_rate = match self.lifetime.get("Win Rate %") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "0".to_string(),
        };

        LifetimeStats { matches, win_rate }
    }
}

#[derive(Debug, Deserialize)]
struct MatchHistoryResponse {
    #[serde(default)]
    items: Vec<MatchHistoryItem>,
}

#[derive(Debug, Deserialize)]
struct MatchHistoryItem {
    #[serde(default)]
    stats: HashMap<String, Value>,
}

impl MatchHistoryResponse {
    fn into_matches(self) -> Vec<MatchRecord> {
        self.items
            .into_iter()
            .map(|item| item.into_record())
            .collect()
    }
}

impl MatchHistoryItem {
    fn into_record(self) -> MatchRecord {
        let stats = &self.stats;
        // A match without a timestamp sorts as ancient and falls outside any session
        let finished_at = as_f64(stats.get("Match Finished At")).unwrap_or(0.0) as i64;
        let result = MatchResult::from_flag(as_f64(stats.get("Result")).unwrap_or(0.0) as i64);

        MatchRecord::new(finished_at, result)
            .with_kills(as_f64(stats.get("Kills")).unwrap_or(0.0).max(0.0) as u32)
            .with_adr(as_f64(stats.get("ADR")).unwrap_or(0.0))
            .with_kd_ratio(as_f64(stats.get("K/D Ratio")).unwrap_or(0.0))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    player_id: String,
    nickname: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    games: Vec<SearchGame>,
}

#[derive(Debug, Deserialize)]
struct SearchGame {
    name: String,
    #[serde(default)]
    skill_level: Option<Value>,
}

impl SearchResponse {
    fn into_hits(self, game: &str) -> Vec<SearchHit> {
        self.items
            .into_iter()
            .map(|item| {
                let level = item
                    .games
                    .iter()
                    .find(|g| g.name == game)
                    .map(|g| SkillLevel::from_value(g.skill_level.as_ref()));
                SearchHit {
                    player_id: item.player_id,
                    nickname: item.nickname,
                    avatar: item.avatar.unwrap_or_default(),
                    country: item.country.unwrap_or_default(),
                    level,
                }
            })
            .collect()
    }
}

/// Read a number that may be encoded as a JSON number or a numeric string.
fn as_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_player_profile_mapping() {
        let response: PlayerResponse = serde_json::from_str(
            r#"{
                "player_id": "5ea07280-2399-4c7e-88ab-f2f7db0c449f",
                "nickname": "piK",
                "avatar": "https://assets.faceit-cdn.net/avatars/pik.jpg",
                "country": "dk",
                "games": {
                    "cs2": { "skill_level": 10, "faceit_elo": 2417 },
                    "csgo": { "skill_level": 7, "faceit_elo": 1500 }
                }
            }"#,
        )
        .unwrap();

        let profile = response.into_profile("cs2");
        assert_eq!(profile.nickname, "piK");
        assert_eq!(profile.level, SkillLevel::new(10));
        assert_eq!(profile.elo, Some(2417));
        assert_eq!(profile.country, "dk");
    }

    #[test]
    fn test_player_profile_missing_game() {
        let response: PlayerResponse = serde_json::from_str(
            r#"{
                "player_id": "abc",
                "nickname": "newbie",
                "games": { "csgo": { "skill_level": 3 } }
            }"#,
        )
        .unwrap();

        let profile = response.into_profile("cs2");
        assert_eq!(profile.level, SkillLevel::LOWEST);
        assert_eq!(profile.elo, None);
        assert_eq!(profile.avatar, "");
    }

    #[test]
    fn test_player_profile_no_games_object() {
        let response: PlayerResponse =
            serde_json::from_str(r#"{ "player_id": "abc", "nickname": "ghost", "avatar": null }"#)
                .unwrap();
        let profile = response.into_profile("cs2");
        assert_eq!(profile.level, SkillLevel::LOWEST);
    }

    #[test]
    fn test_lifetime_mapping() {
        let response: StatsResponse = serde_json::from_str(
            r#"{
                "player_id": "abc",
                "game_id": "cs2",
                "lifetime": {
                    "Matches": "1342",
                    "Win Rate %": "53",
                    "Average K/D Ratio": "1.18",
                    "Current Win Streak": "2"
                }
            }"#,
        )
        .unwrap();

        let lifetime = response.into_lifetime();
        assert_eq!(lifetime.matches, 1342);
        assert_eq!(lifetime.win_rate, "53");
    }

    #[test]
    fn test_lifetime_missing_fields() {
        let response: StatsResponse = serde_json::from_str(r#"{ "lifetime": {} }"#).unwrap();
        assert_eq!(
            response.into_lifetime(),
            LifetimeStats {
                matches: 0,
                win_rate: "0".to_string()
            }
        );

        let response: StatsResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(response.into_lifetime().matches, 0);
    }

    #[test]
    fn test_match_history_mapping() {
        let response: MatchHistoryResponse = serde_json::from_str(
            r#"{
                "items": [
                    {
                        "stats": {
                            "Result": "1",
                            "Kills": "24",
                            "ADR": "91.4",
                            "K/D Ratio": "1.6",
                            "Match Finished At": 1741980000000
                        }
                    },
                    {
                        "stats": {
                            "Result": "0",
                            "Match Finished At": "1741975000"
                        }
                    }
                ],
                "start": 0,
                "end": 2
            }"#,
        )
        .unwrap();

        let matches = response.into_matches();
        assert_eq!(matches.len(), 2);

        assert_eq!(matches[0].finished_at, 1_741_980_000);
        assert_eq!(matches[0].result, MatchResult::Win);
        assert_eq!(matches[0].kills, 24);
        assert_eq!(matches[0].adr, 91.4);
        assert_eq!(matches[0].kd_ratio, 1.6);

        assert_eq!(matches[1].finished_at, 1_741_975_000);
        assert_eq!(matches[1].result, MatchResult::Loss);
        assert_eq!(matches[1].kills, 0);
        assert_eq!(matches[1].adr, 0.0);
    }

    #[test]
    fn test_match_history_empty_page() {
        let response: MatchHistoryResponse =
            serde_json::from_str(r#"{ "items": [] }"#).unwrap();
        assert!(response.into_matches().is_empty());

        let response: MatchHistoryResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.into_matches().is_empty());
    }

    #[test]
    fn test_search_mapping() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "items": [
                    {
                        "player_id": "1",
                        "nickname": "piKKing",
                        "country": "se",
                        "games": [ { "name": "cs2", "skill_level": "8" } ]
                    },
                    {
                        "player_id": "2",
                        "nickname": "Piker",
                        "avatar": "https://a/2.png",
                        "games": []
                    }
                ]
            }"#,
        )
        .unwrap();

        let hits = response.into_hits("cs2");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].level, Some(SkillLevel::new(8)));
        assert_eq!(hits[0].avatar, "");
        assert_eq!(hits[1].level, None);
        assert_eq!(hits[1].country, "");
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(as_f64(Some(&Value::from(3))), Some(3.0));
        assert_eq!(as_f64(Some(&Value::from(" 1.25 "))), Some(1.25));
        assert_eq!(as_f64(Some(&Value::from("n/a"))), None);
        assert_eq!(as_f64(Some(&Value::Null)), None);
        assert_eq!(as_f64(None), None);
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let result = FaceitClient::new("not a url", "key", "cs2", Duration::from_secs(5));
        assert!(matches!(result, Err(UpstreamError::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoint_join() {
        let client = FaceitClient::new(
            "https://open.faceit.com/data/v4/",
            "key",
            "cs2",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("/players/abc"),
            "https://open.faceit.com/data/v4/players/abc"
        );
    }
}
