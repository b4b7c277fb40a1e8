use super::util::RetryPolicy;
use crate::cache::Cache;
use crate::market_data::{CoinDetail, MarketDataProvider, PricePoint, Quote};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// CoinGecko markets row. Nullable numeric fields show up for thinly
/// traded coins; the reshape maps them to zero.
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    id: String,
    symbol: String,
    name: String,
    market_data: CoinMarketData,
    description: CoinDescription,
    image: Option<CoinImage>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    current_price: UsdValue,
    price_change_percentage_24h: Option<f64>,
    market_cap: UsdValue,
    total_volume: UsdValue,
}

#[derive(Debug, Deserialize)]
struct UsdValue {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CoinDescription {
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoinImage {
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

fn quote_from_row(row: MarketRow) -> Quote {
    Quote {
        id: row.id,
        symbol: row.symbol.to_uppercase(),
        name: row.name,
        current_price: row.current_price.unwrap_or(0.0),
        change_24h: row.price_change_percentage_24h.unwrap_or(0.0),
        market_cap: row.market_cap.unwrap_or(0.0),
        volume_24h: row.total_volume.unwrap_or(0.0),
        image: row.image,
    }
}

fn price_point(timestamp_ms: f64, price: f64) -> PricePoint {
    let timestamp = timestamp_ms as i64;
    let date = Utc
        .timestamp_millis_opt(timestamp)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    PricePoint {
        timestamp,
        price,
        date,
    }
}

pub struct CoinGeckoProvider {
    base_url: String,
    client: reqwest::Client,
    quote_cache: Cache<String, Vec<Quote>>,
    detail_cache: Cache<String, CoinDetail>,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str) -> Self {
        CoinGeckoProvider {
            base_url: base_url.to_string(),
            client: reqwest::Client::new(),
            // Mirrors the upstream cache windows: 1 minute for the batch
            // quote list, 5 minutes for per-coin detail.
            quote_cache: Cache::with_max_age(std::time::Duration::from_secs(60)),
            detail_cache: Cache::with_max_age(std::time::Duration::from_secs(300)),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Requesting market data from {}", url);
        let response = RetryPolicy::default()
            .run(|| self.client.get(url).send())
            .await
            .context("Market data request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Market data upstream returned status {} for {}",
                response.status(),
                url
            ));
        }

        let text = response.text().await.context("Failed to read response body")?;
        match serde_json::from_str(&text) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse market data response");
                Err(e).context("Failed to parse market data response")
            }
        }
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    #[instrument(name = "QuoteFetch", skip(self), fields(coins = ids.len()))]
    async fn fetch_quotes(&self, ids: &[String]) -> Result<Vec<Quote>> {
        let key = ids.join(",");
        if let Some(cached) = self.quote_cache.get(&key).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/api/v3/coins/markets?vs_currency=usd&ids={}&order=market_cap_desc&per_page=10&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url, key
        );
        let rows: Vec<MarketRow> = self.get_json(&url).await?;
        let quotes: Vec<Quote> = rows.into_iter().map(quote_from_row).collect();

        self.quote_cache.put(key, quotes.clone()).await;
        Ok(quotes)
    }

    #[instrument(name = "CoinDetailFetch", skip(self), fields(coin = %id))]
    async fn fetch_detail(&self, id: &str) -> Result<CoinDetail> {
        if let Some(cached) = self.detail_cache.get(&id.to_string()).await {
            return Ok(cached);
        }

        let coin_url = format!(
            "{}/api/v3/coins/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false",
            self.base_url, id
        );
        let chart_url = format!(
            "{}/api/v3/coins/{}/market_chart?vs_currency=usd&days=7&interval=daily",
            self.base_url, id
        );

        let (coin, chart) = tokio::try_join!(
            self.get_json::<CoinResponse>(&coin_url),
            self.get_json::<MarketChartResponse>(&chart_url)
        )?;

        let detail = CoinDetail {
            quote: Quote {
                id: coin.id,
                symbol: coin.symbol.to_uppercase(),
                name: coin.name,
                current_price: coin.market_data.current_price.usd.unwrap_or(0.0),
                change_24h: coin.market_data.price_change_percentage_24h.unwrap_or(0.0),
                market_cap: coin.market_data.market_cap.usd.unwrap_or(0.0),
                volume_24h: coin.market_data.total_volume.usd.unwrap_or(0.0),
                image: coin.image.and_then(|i| i.large),
            },
            description: coin.description.en.unwrap_or_default(),
            price_history: chart
                .prices
                .into_iter()
                .map(|(ts, price)| price_point(ts, price))
                .collect(),
        };

        self.detail_cache.put(id.to_string(), detail.clone()).await;
        Ok(detail)
    }
}
