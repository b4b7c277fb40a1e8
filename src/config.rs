use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// A coin the dashboard tracks. `symbol` and `name` are display
/// identifiers denormalized from the coin id.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackedCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NewsProviderConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_news_query")]
    pub query: String,
}

fn default_news_query() -> String {
    "cryptocurrency bitcoin ethereum".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub market: Option<MarketProviderConfig>,
    pub news: Option<NewsProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            market: Some(MarketProviderConfig {
                base_url: "https://api.coingecko.com".to_string(),
            }),
            news: Some(NewsProviderConfig {
                base_url: "https://newsapi.org".to_string(),
                api_key: "demo".to_string(),
                query: default_news_query(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "AppConfig::default_coins")]
    pub coins: Vec<TrackedCoin>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "AppConfig::default_currency")]
    pub currency: String,
    pub data_path: Option<String>,
    /// Seconds between quote refreshes in watch mode.
    #[serde(default = "AppConfig::default_quote_refresh_secs")]
    pub quote_refresh_secs: u64,
    /// Seconds between news refreshes in watch mode.
    #[serde(default = "AppConfig::default_news_refresh_secs")]
    pub news_refresh_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            coins: Self::default_coins(),
            providers: ProvidersConfig::default(),
            currency: Self::default_currency(),
            data_path: None,
            quote_refresh_secs: Self::default_quote_refresh_secs(),
            news_refresh_secs: Self::default_news_refresh_secs(),
        }
    }
}

impl AppConfig {
    fn default_currency() -> String {
        "USD".to_string()
    }

    fn default_quote_refresh_secs() -> u64 {
        60
    }

    fn default_news_refresh_secs() -> u64 {
        1800
    }

    fn default_coins() -> Vec<TrackedCoin> {
        let coin = |id: &str, symbol: &str, name: &str| TrackedCoin {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        };
        vec![
            coin("bitcoin", "BTC", "Bitcoin"),
            coin("ethereum", "ETH", "Ethereum"),
            coin("cardano", "ADA", "Cardano"),
            coin("solana", "SOL", "Solana"),
        ]
    }

    pub fn coin_ids(&self) -> Vec<String> {
        self.coins.iter().map(|c| c.id.clone()).collect()
    }

    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
coins:
  - id: "bitcoin"
    symbol: "BTC"
    name: "Bitcoin"
  - id: "dogecoin"
    symbol: "DOGE"
    name: "Dogecoin"
providers:
  market:
    base_url: "http://example.com/market"
  news:
    base_url: "http://example.com/news"
    api_key: "k"
currency: "EUR"
quote_refresh_secs: 15
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.coins.len(), 2);
        assert_eq!(config.coins[1].id, "dogecoin");
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.quote_refresh_secs, 15);
        // Unset interval falls back to the default cadence.
        assert_eq!(config.news_refresh_secs, 1800);
        assert_eq!(
            config.providers.market.unwrap().base_url,
            "http://example.com/market"
        );
        let news = config.providers.news.unwrap();
        assert_eq!(news.base_url, "http://example.com/news");
        assert_eq!(news.query, "cryptocurrency bitcoin ethereum");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: /tmp/finboard").unwrap();
        assert_eq!(config.coins.len(), 4);
        assert_eq!(config.coins[0].id, "bitcoin");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.quote_refresh_secs, 60);
        assert!(config.providers.market.is_some());
        assert_eq!(config.data_path.as_deref(), Some("/tmp/finboard"));
    }
}
