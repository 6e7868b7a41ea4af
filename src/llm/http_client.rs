use reqwest::Client;
use std::time::Duration;

pub const PROVIDER_USER_AGENT: &str = concat!("itinera/", env!("CARGO_PKG_VERSION"));

/// HTML search endpoints serve a stripped page to unknown agents.
pub const BROWSER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; itinera/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for one outbound service. Falls back to reqwest defaults if the
/// tuned builder fails.
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs.max(1))))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "http client builder failed; using defaults");
            Client::new()
        })
}
