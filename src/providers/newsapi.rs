use super::util::RetryPolicy;
use crate::market_data::{NewsArticle, NewsProvider, fallback_headlines};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<ArticleRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleRow {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    source: SourceRow,
}

#[derive(Debug, Deserialize)]
struct SourceRow {
    name: Option<String>,
}

/// News headlines from a NewsAPI-shaped upstream. Any upstream failure
/// degrades to the fixed placeholder list; callers never see an error.
pub struct NewsApiProvider {
    base_url: String,
    api_key: String,
    query: String,
    client: reqwest::Client,
}

impl NewsApiProvider {
    pub fn new(base_url: &str, api_key: &str, query: &str) -> Self {
        NewsApiProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            query: query.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_upstream(&self) -> Result<Vec<NewsArticle>> {
        let url = format!(
            "{}/v2/everything?q={}&sortBy=publishedAt&pageSize=10&apiKey={}",
            self.base_url,
            self.query.replace(' ', "+"),
            self.api_key
        );
        debug!("Requesting headlines");

        let response = RetryPolicy::default()
            .run(|| self.client.get(&url).send())
            .await
            .context("News request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("News upstream returned status {}", response.status());
        }

        let data: NewsApiResponse = response
            .json()
            .await
            .context("Failed to parse news response")?;

        Ok(data
            .articles
            .into_iter()
            .take(10)
            .enumerate()
            .map(|(index, article)| NewsArticle {
                id: index.to_string(),
                title: article.title.unwrap_or_default(),
                description: article.description.unwrap_or_default(),
                url: article.url.unwrap_or_default(),
                published_at: article.published_at.unwrap_or_default(),
                source: article.source.name.unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    #[instrument(name = "NewsFetch", skip(self))]
    async fn fetch_headlines(&self) -> Result<Vec<NewsArticle>> {
        match self.fetch_upstream().await {
            Ok(articles) => Ok(articles),
            Err(e) => {
                warn!(error = %e, "News upstream unavailable, serving placeholders");
                Ok(fallback_headlines())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NEWS_JSON: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": null, "name": "Coin Desk"},
                "title": "Markets rally",
                "description": "A broad rally across majors.",
                "url": "https://news.example/a",
                "publishedAt": "2024-01-15T12:00:00Z"
            },
            {
                "source": {"id": null, "name": "The Block"},
                "title": "ETF flows continue",
                "description": null,
                "url": "https://news.example/b",
                "publishedAt": "2024-01-15T09:30:00Z"
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_fetch_headlines_reshapes_articles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("sortBy", "publishedAt"))
            .and(query_param("pageSize", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NEWS_JSON))
            .mount(&server)
            .await;

        let provider = NewsApiProvider::new(&server.uri(), "demo", "cryptocurrency");
        let articles = provider.fetch_headlines().await.unwrap();

        assert_eq!(articles.len(), 2);
        // Ids are stringified ordinal indexes.
        assert_eq!(articles[0].id, "0");
        assert_eq!(articles[1].id, "1");
        assert_eq!(articles[0].title, "Markets rally");
        assert_eq!(articles[0].source, "Coin Desk");
        assert_eq!(articles[0].published_at, "2024-01-15T12:00:00Z");
        // Null description passes through as empty, not an error.
        assert_eq!(articles[1].description, "");
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_placeholders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"status":"error"}"#))
            .mount(&server)
            .await;

        let provider = NewsApiProvider::new(&server.uri(), "demo", "cryptocurrency");
        let articles = provider.fetch_headlines().await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Bitcoin Reaches New Heights");
        assert_eq!(articles[0].url, "#");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_returns_placeholders() {
        // Port 9 is discard; nothing is listening.
        let provider = NewsApiProvider::new("http://127.0.0.1:9", "demo", "cryptocurrency");
        let articles = provider.fetch_headlines().await.unwrap();
        assert!(!articles.is_empty());
    }
}
