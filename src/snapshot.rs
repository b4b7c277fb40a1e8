use crate::market_data::MarketDataProvider;
use crate::valuation::{QuoteMap, quote_map};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Holds the last completed quote snapshot.
///
/// A refresh fetches a complete new map and swaps it in only when the whole
/// fetch succeeded; a failed or abandoned refresh leaves the previous
/// snapshot untouched, so readers always see a consistent last-known-good
/// view and never block on an in-flight fetch.
#[derive(Clone, Default)]
pub struct QuoteCell {
    inner: Arc<RwLock<QuoteMap>>,
}

impl QuoteCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently completed snapshot. Empty until the first
    /// successful refresh, which reads as cost-basis pricing downstream.
    pub fn snapshot(&self) -> QuoteMap {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Fetches quotes for `ids` and atomically installs the result.
    /// Returns whether the snapshot was replaced.
    pub async fn refresh(&self, provider: &dyn MarketDataProvider, ids: &[String]) -> bool {
        match provider.fetch_quotes(ids).await {
            Ok(quotes) => {
                debug!(count = quotes.len(), "Installing fresh quote snapshot");
                *self.inner.write().unwrap_or_else(|e| e.into_inner()) = quote_map(quotes);
                true
            }
            Err(e) => {
                warn!(error = %e, "Quote refresh failed, keeping last snapshot");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{CoinDetail, Quote};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakyProvider {
        healthy: AtomicBool,
        price: f64,
    }

    #[async_trait]
    impl MarketDataProvider for FlakyProvider {
        async fn fetch_quotes(&self, ids: &[String]) -> Result<Vec<Quote>> {
            if !self.healthy.load(Ordering::SeqCst) {
                return Err(anyhow!("upstream down"));
            }
            Ok(ids
                .iter()
                .map(|id| Quote {
                    id: id.clone(),
                    symbol: id.to_uppercase(),
                    name: id.clone(),
                    current_price: self.price,
                    change_24h: 0.0,
                    market_cap: 0.0,
                    volume_24h: 0.0,
                    image: None,
                })
                .collect())
        }

        async fn fetch_detail(&self, _id: &str) -> Result<CoinDetail> {
            Err(anyhow!("not used"))
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_snapshot() {
        let provider = FlakyProvider {
            healthy: AtomicBool::new(true),
            price: 100.0,
        };
        let cell = QuoteCell::new();
        let ids = vec!["bitcoin".to_string()];

        assert!(cell.refresh(&provider, &ids).await);
        assert_eq!(cell.snapshot()["bitcoin"].current_price, 100.0);

        provider.healthy.store(false, Ordering::SeqCst);
        assert!(!cell.refresh(&provider, &ids).await);
        // Reads still use the last completed snapshot.
        assert_eq!(cell.snapshot()["bitcoin"].current_price, 100.0);
    }

    #[tokio::test]
    async fn test_successful_refresh_replaces_wholesale() {
        let provider = FlakyProvider {
            healthy: AtomicBool::new(true),
            price: 100.0,
        };
        let cell = QuoteCell::new();

        cell.refresh(&provider, &["bitcoin".to_string(), "ethereum".to_string()])
            .await;
        assert_eq!(cell.snapshot().len(), 2);

        // A narrower fetch replaces the whole map, not a partial merge.
        cell.refresh(&provider, &["bitcoin".to_string()]).await;
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("bitcoin"));
    }

    #[tokio::test]
    async fn test_empty_until_first_refresh() {
        let cell = QuoteCell::new();
        assert!(cell.snapshot().is_empty());
    }
}
