//! NewsAPI source.
//!
//! With a search query the `everything` endpoint is used, which searches all
//! categories.  Without one, `top-headlines` is restricted to the **first**
//! configured category: the provider accepts exactly one category per
//! request.  NewsAPI has no end-of-results code, so an empty page is the only
//! exhaustion signal.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{provider_error, ContentItem, DataSource, NewsItem, PageRequest, SourcePage, Variant};
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Used when the category list is empty, mirroring the provider's default.
const FALLBACK_CATEGORY: &str = "general";

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: Vec<NewsItem>,
}

pub struct NewsApiSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Endpoint path and query parameters for a request.
    pub fn endpoint(request: &PageRequest) -> (&'static str, Vec<(&'static str, String)>) {
        let mut params = vec![
            ("language", "en".to_string()),
            ("pageSize", request.page_size.to_string()),
            ("page", request.page.to_string()),
        ];
        match request.query() {
            Some(q) => {
                params.push(("q", q.to_string()));
                ("/v2/everything", params)
            }
            None => {
                let category = request
                    .categories
                    .first()
                    .map(String::as_str)
                    .unwrap_or(FALLBACK_CATEGORY);
                params.push(("category", category.to_string()));
                ("/v2/top-headlines", params)
            }
        }
    }

    /// Decode a successful response body.
    ///
    /// Pure (no I/O) so tests can exercise it without the network.
    pub fn parse_page(body: &str) -> Result<SourcePage, FetchError> {
        let response: ArticlesResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Provider {
                provider: Variant::News,
                status: None,
                message: format!("malformed response: {e}"),
            })?;
        let items: Vec<ContentItem> = response.articles.into_iter().map(ContentItem::News).collect();
        Ok(SourcePage {
            has_more: !items.is_empty(),
            items,
        })
    }
}

#[async_trait]
impl DataSource for NewsApiSource {
    fn variant(&self) -> Variant {
        Variant::News
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, FetchError> {
        request.validate(Variant::News)?;
        let (path, params) = Self::endpoint(request);
        debug!(path, page = request.page, "fetching news");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&params)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::transport(Variant::News, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(Variant::News, e))?;

        if !status.is_success() {
            return Err(provider_error(Variant::News, status.as_u16(), &body, "message"));
        }
        Self::parse_page(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn headlines_use_first_category_only() {
        let cats = vec!["sports".to_string(), "finance".to_string()];
        let req = PageRequest::new(2, 5, None, &cats);
        let (path, params) = NewsApiSource::endpoint(&req);

        assert_eq!(path, "/v2/top-headlines");
        assert_eq!(param(&params, "category"), Some("sports"));
        assert_eq!(param(&params, "page"), Some("2"));
        assert_eq!(param(&params, "pageSize"), Some("5"));
        assert_eq!(param(&params, "q"), None);
    }

    #[test]
    fn query_searches_everything_without_category() {
        let req = PageRequest::new(1, 5, Some("rust"), &["sports".to_string()]);
        let (path, params) = NewsApiSource::endpoint(&req);

        assert_eq!(path, "/v2/everything");
        assert_eq!(param(&params, "q"), Some("rust"));
        assert_eq!(param(&params, "category"), None);
    }

    #[test]
    fn parse_page_extracts_articles() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "A"}, "title": "One", "url": "https://a/1",
                 "publishedAt": "2025-01-01T00:00:00Z"},
                {"source": {"id": "b", "name": "B"}, "title": "Two", "url": "https://b/2",
                 "urlToImage": "https://b/2.png", "publishedAt": "2025-01-02T00:00:00Z"}
            ]
        }"#;
        let page = NewsApiSource::parse_page(body).unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.items[0].id(), "https://a/1");
        assert_eq!(page.items[1].image_url().as_deref(), Some("https://b/2.png"));
    }

    #[test]
    fn empty_page_means_no_more() {
        let page = NewsApiSource::parse_page(r#"{"articles": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn malformed_body_is_provider_error() {
        let err = NewsApiSource::parse_page("not json").unwrap_err();
        assert!(matches!(err, FetchError::Provider { provider: Variant::News, .. }));
    }

    #[tokio::test]
    async fn invalid_request_never_hits_network() {
        let src = NewsApiSource::new(reqwest::Client::new(), "http://127.0.0.1:9", "key");
        let req = PageRequest::new(0, 5, None, &[]);
        let err = src.fetch_page(&req).await.unwrap_err();
        assert!(matches!(err, FetchError::Validation { .. }));
    }
}
