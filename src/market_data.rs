use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A transient market snapshot for one asset. Never persisted; a fresh set
/// is fetched on every refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    /// Percent change over the last 24h. Zero when the upstream omits it.
    pub change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    /// Upstream timestamp in milliseconds.
    pub timestamp: i64,
    pub price: f64,
    /// ISO calendar date derived from the timestamp.
    pub date: String,
}

/// Per-asset detail with a 7-day daily price series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub description: String,
    pub price_history: Vec<PricePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: String,
    pub source: String,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches current quotes for the given coin ids, ordered by market cap
    /// descending as supplied upstream.
    async fn fetch_quotes(&self, ids: &[String]) -> Result<Vec<Quote>>;

    /// Fetches per-coin detail plus a 7-day daily price history.
    async fn fetch_detail(&self, id: &str) -> Result<CoinDetail>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetches up to 10 headlines, newest first.
    async fn fetch_headlines(&self) -> Result<Vec<NewsArticle>>;
}

/// Hardcoded two-asset quote set shown when the quote source is down.
/// Valuations computed from it are illustrative only; the ledger itself is
/// untouched by quote failures.
pub fn fallback_quotes() -> Vec<Quote> {
    vec![
        Quote {
            id: "bitcoin".into(),
            symbol: "BTC".into(),
            name: "Bitcoin".into(),
            current_price: 43200.0,
            change_24h: 2.5,
            market_cap: 847_000_000_000.0,
            volume_24h: 15_600_000_000.0,
            image: None,
        },
        Quote {
            id: "ethereum".into(),
            symbol: "ETH".into(),
            name: "Ethereum".into(),
            current_price: 2650.0,
            change_24h: -1.2,
            market_cap: 318_000_000_000.0,
            volume_24h: 8_900_000_000.0,
            image: None,
        },
    ]
}

/// Placeholder articles returned with a success status when the news
/// upstream fails. News failures are non-fatal to the dashboard.
pub fn fallback_headlines() -> Vec<NewsArticle> {
    let now = chrono::Utc::now();
    vec![
        NewsArticle {
            id: "1".into(),
            title: "Bitcoin Reaches New Heights".into(),
            description: "Bitcoin continues its upward trend as institutional adoption grows."
                .into(),
            url: "#".into(),
            published_at: now.to_rfc3339(),
            source: "Crypto News".into(),
        },
        NewsArticle {
            id: "2".into(),
            title: "Ethereum 2.0 Updates".into(),
            description: "Latest developments in Ethereum network improvements.".into(),
            url: "#".into(),
            published_at: (now - chrono::Duration::hours(1)).to_rfc3339(),
            source: "Blockchain Today".into(),
        },
    ]
}
