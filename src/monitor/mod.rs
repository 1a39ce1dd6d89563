//! Token monitoring loop
//!
//! Placeholder for the eventual trading engine: announces itself on a fixed
//! interval and does nothing else. There is no cancellation path; the loop
//! runs until the process exits.

use crate::notify::Notifier;
use std::time::Duration;

/// Memecoin tickers on the watchlist
pub const MEMECOIN_TICKERS: &[&str] = &[
    "$DOGE", "$SHIB", "$PEPE", "$SAFEMOON", "$CYN", "$HOGE", "$FLOKI", "$KISHU",
];

/// Minimum safety score a token would need before trading.
/// Scoring itself is not implemented.
pub const SAFETY_THRESHOLD: u32 = 85;

const MONITOR_INTERVAL: Duration = Duration::from_secs(30);

/// Placeholder monitoring loop
pub struct TokenMonitor {
    notifier: Notifier,
    interval: Duration,
}

impl TokenMonitor {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            interval: MONITOR_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_interval(notifier: Notifier, interval: Duration) -> Self {
        Self { notifier, interval }
    }

    /// Run forever, announcing every tick
    pub async fn run(self) {
        tracing::info!(
            "Token monitor started, watching {} tickers",
            MEMECOIN_TICKERS.len()
        );

        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            let _ = self
                .notifier
                .send("📡 Monitoring tokens for trading opportunities...")
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watchlist_is_nonempty() {
        assert!(!MEMECOIN_TICKERS.is_empty());
        assert!(MEMECOIN_TICKERS.iter().all(|t| t.starts_with('$')));
    }

    #[tokio::test]
    async fn test_monitor_announces_on_tick() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok": true, "result": {}}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let notifier = crate::notify::Notifier::with_api_url("123:abc", "42", &server.url());
        let monitor = TokenMonitor::with_interval(notifier, Duration::from_millis(10));

        let handle = tokio::spawn(monitor.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        mock.assert_async().await;
    }
}
