//! Keep-alive pinger
//!
//! Free hosting tiers put idle services to sleep; a GET against our own root
//! every few minutes keeps the webhook reachable. Failures are only logged.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Timeout for a single ping
const PING_TIMEOUT_SECS: u64 = 30;

/// Sends one GET to `url` and returns the response status.
///
/// # Errors
///
/// Returns the transport error if no response was received.
pub async fn ping_once(client: &Client, url: &str) -> Result<StatusCode, reqwest::Error> {
    client.get(url).send().await.map(|response| response.status())
}

/// Spawns the endless ping loop. The first ping fires immediately.
#[must_use]
pub fn spawn_keep_alive(url: String, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = Client::builder()
            .timeout(Duration::from_secs(PING_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        let mut ticker = tokio::time::interval(interval);
        info!(url = %url, interval_secs = interval.as_secs(), "Keep-alive started");

        loop {
            ticker.tick().await;
            match ping_once(&client, &url).await {
                Ok(status) => info!(status = status.as_u16(), "Keep-alive ping"),
                Err(e) => warn!(error = %e, "Keep-alive error"),
            }
        }
    })
}
