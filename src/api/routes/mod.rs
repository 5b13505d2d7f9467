pub mod search;
pub mod stats;

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}
