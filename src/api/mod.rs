//! REST API endpoints.
//!
//! Axum-based HTTP API serving player stats, player search and the static
//! search/overlay pages.

pub mod routes;
pub mod state;

use std::path::Path;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

use crate::aggregate::StatsError;
use crate::config::ServerConfig;
use crate::search::SearchError;
use crate::upstream::UpstreamError;

use self::state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{context}: {details}")]
    Upstream {
        context: &'static str,
        details: String,
    },
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Upstream { context, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: context.to_string(),
                    details,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Client-facing detail for an upstream failure: the upstream message when
/// there is one, the error text otherwise.
fn upstream_details(err: &UpstreamError) -> String {
    match err {
        UpstreamError::HttpStatus { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::Upstream {
            context: "Failed to fetch FACEIT stats",
            details: upstream_details(err.upstream()),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let SearchError::Upstream { source, .. } = &err;
        ApiError::Upstream {
            context: "Failed to search players",
            details: upstream_details(source),
        }
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Invalid CORS origin {:?}, allowing any origin", origin);
                AllowOrigin::from(Any)
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// Build the HTTP router.
///
/// `/`, `/overlay` and `/test` map to the pages in the static directory;
/// any other unmatched path is served from that directory as a file.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let static_dir = Path::new(&server.static_dir);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/stats", get(routes::stats::get_stats))
        .route("/api/search-users", get(routes::search::search_users))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/overlay", ServeFile::new(static_dir.join("overlay.html")))
        .route_service("/test", ServeFile::new(static_dir.join("test.html")))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors_layer(&server.cors_origin))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::cache::ManualClock;
    use crate::config::AppConfig;
    use crate::models::{
        LifetimeStats, MatchRecord, MatchResult, PlayerProfile, SearchHit, SkillLevel,
    };
    use crate::upstream::MockStatsSource;

    fn mock_source() -> MockStatsSource {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 22, 0, 0).unwrap().timestamp();
        let mut source = MockStatsSource::new();
        source.profiles = vec![PlayerProfile {
            player_id: "p-1".to_string(),
            nickname: "piK".to_string(),
            avatar: String::new(),
            country: "dk".to_string(),
            level: SkillLevel::new(9),
            elo: Some(1999),
        }];
        source.lifetime = LifetimeStats {
            matches: 10,
            win_rate: "60".to_string(),
        };
        source.matches = vec![
            MatchRecord::new(now - 600, MatchResult::Win).with_kills(21),
            MatchRecord::new(now - 3000, MatchResult::Loss).with_kills(9),
        ];
        source
    }

    fn app(source: Arc<MockStatsSource>, static_dir: &Path) -> Router {
        let mut config = AppConfig::default();
        config.faceit.api_key = "test".to_string();
        config.server.static_dir = static_dir.to_string_lossy().to_string();

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 14, 22, 0, 0).unwrap(),
        ));
        let state = AppState::from_config(&config, source, clock).unwrap();
        build_router(state, &config.server)
    }

    async fn send_get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send_get(app(Arc::new(mock_source()), dir.path()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send_get(
            app(Arc::new(mock_source()), dir.path()),
            "/api/stats?username=piK",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["username"], "piK");
        assert_eq!(json["elo"], "1999");
        assert_eq!(json["wins"], 1);
        assert_eq!(json["losses"], 1);
        assert_eq!(json["streak"], 1);
        assert_eq!(json["avgKills"], "15.0");
    }

    #[tokio::test]
    async fn test_stats_endpoint_error_shape() {
        let mut source = mock_source();
        source.offline = true;
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send_get(app(Arc::new(source), dir.path()), "/api/stats").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Failed to fetch FACEIT stats");
        assert_eq!(json["details"], "Service Unavailable");
    }

    #[tokio::test]
    async fn test_stats_endpoint_match_fetch_failure() {
        let mut source = mock_source();
        source.failing_ops = vec!["recent_matches"];
        let source = Arc::new(source);
        let dir = tempfile::tempdir().unwrap();
        let app = app(source.clone(), dir.path());

        let (status, body) = send_get(app.clone(), "/api/stats?username=piK").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Failed to fetch FACEIT stats");
        assert_eq!(json["details"], "recent_matches failed");

        // Nothing cached: the next request goes upstream again
        let calls = source.call_count();
        let (status, _) = send_get(app, "/api/stats?username=piK").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(source.call_count() > calls);
    }

    #[tokio::test]
    async fn test_stats_endpoint_cached_between_requests() {
        let source = Arc::new(mock_source());
        let dir = tempfile::tempdir().unwrap();
        let app = app(source.clone(), dir.path());

        let (_, first) = send_get(app.clone(), "/api/stats?username=piK").await;
        let calls = source.call_count();
        let (_, second) = send_get(app, "/api/stats?username=piK").await;

        assert_eq!(first, second);
        assert_eq!(source.call_count(), calls);
    }

    #[tokio::test]
    async fn test_search_short_query() {
        let source = Arc::new(mock_source());
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            send_get(app(source.clone(), dir.path()), "/api/search-users?q=p").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"result":[]}"#);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_search_missing_query() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            send_get(app(Arc::new(mock_source()), dir.path()), "/api/search-users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"result":[]}"#);
    }

    #[tokio::test]
    async fn test_search_malformed_limit_uses_default() {
        let mut source = mock_source();
        source.hits = vec![SearchHit {
            player_id: "p-1".to_string(),
            nickname: "piK".to_string(),
            avatar: String::new(),
            country: "dk".to_string(),
            level: None,
        }];
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(source), dir.path());

        for uri in [
            "/api/search-users?q=pik&limit=abc",
            "/api/search-users?q=pik&limit=-3",
            "/api/search-users?q=pik&limit=",
        ] {
            let (status, body) = send_get(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            let json: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["result"][0]["nickname"], "piK", "{}", uri);
            assert_eq!(json["result"][0]["elo"], "1999", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_search_error_shape() {
        let mut source = mock_source();
        source.offline = true;
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            send_get(app(Arc::new(source), dir.path()), "/api/search-users?q=pik").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Failed to search players");
    }

    #[tokio::test]
    async fn test_static_pages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>search</h1>").unwrap();
        std::fs::write(dir.path().join("overlay.html"), "<h1>overlay</h1>").unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();

        let source = Arc::new(mock_source());
        let (status, body) = send_get(app(source.clone(), dir.path()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>search</h1>");

        let (status, body) = send_get(app(source.clone(), dir.path()), "/overlay").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>overlay</h1>");

        let (status, _) = send_get(app(source.clone(), dir.path()), "/style.css").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send_get(app(source, dir.path()), "/missing.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_stats_error_conversion() {
        let err = StatsError::Upstream {
            username: "piK".to_string(),
            source: UpstreamError::NotFound("/players".to_string()),
        };
        let ApiError::Upstream { context, details } = ApiError::from(err);
        assert_eq!(context, "Failed to fetch FACEIT stats");
        assert_eq!(details, "Not found: /players");
    }
}
