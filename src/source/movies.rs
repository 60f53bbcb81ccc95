//! TMDB source.
//!
//! Search-by-title when a query is present, otherwise the weekly trending
//! list.  Pagination uses TMDB's own page numbers and `total_pages`; the page
//! size is fixed by the provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{provider_error, ContentItem, DataSource, MovieItem, PageRequest, SourcePage, Variant};
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org";

#[derive(Debug, Deserialize)]
struct MoviesResponse {
    #[serde(default)]
    results: Vec<MovieItem>,
    #[serde(default)]
    total_pages: usize,
}

pub struct MovieSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MovieSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(request: &PageRequest) -> (&'static str, Vec<(&'static str, String)>) {
        let mut params = vec![("page", request.page.to_string())];
        match request.query() {
            Some(q) => {
                params.push(("query", q.to_string()));
                ("/3/search/movie", params)
            }
            None => ("/3/trending/movie/week", params),
        }
    }

    /// Decode a successful response body for the given page.
    pub fn parse_page(body: &str, page: usize) -> Result<SourcePage, FetchError> {
        let response: MoviesResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Provider {
                provider: Variant::Movie,
                status: None,
                message: format!("malformed response: {e}"),
            })?;
        Ok(SourcePage {
            has_more: page < response.total_pages,
            items: response.results.into_iter().map(ContentItem::Movie).collect(),
        })
    }
}

#[async_trait]
impl DataSource for MovieSource {
    fn variant(&self) -> Variant {
        Variant::Movie
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, FetchError> {
        request.validate(Variant::Movie)?;
        let (path, params) = Self::endpoint(request);
        debug!(path, page = request.page, "fetching movies");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::transport(Variant::Movie, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(Variant::Movie, e))?;

        if !status.is_success() {
            return Err(provider_error(
                Variant::Movie,
                status.as_u16(),
                &body,
                "status_message",
            ));
        }
        Self::parse_page(&body, request.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "page": 1,
        "total_pages": 3,
        "results": [
            {"id": 11, "title": "Star Wars", "overview": "space", "poster_path": "/sw.jpg",
             "release_date": "1977-05-25", "vote_average": 8.2},
            {"id": 12, "title": "Finding Nemo", "overview": "fish", "poster_path": null,
             "release_date": "2003-05-30", "vote_average": 7.8}
        ]
    }"#;

    #[test]
    fn trending_without_query() {
        let req = PageRequest::new(3, 10, None, &[]);
        let (path, params) = MovieSource::endpoint(&req);
        assert_eq!(path, "/3/trending/movie/week");
        assert_eq!(params, vec![("page", "3".to_string())]);
    }

    #[test]
    fn search_with_query() {
        let req = PageRequest::new(1, 10, Some("nemo"), &[]);
        let (path, params) = MovieSource::endpoint(&req);
        assert_eq!(path, "/3/search/movie");
        assert!(params.contains(&("query", "nemo".to_string())));
    }

    #[test]
    fn parse_page_reports_more_before_last_page() {
        let page = MovieSource::parse_page(BODY, 1).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.items[0].identity().key, "11");
        assert!(page.items[1].image_url().is_none());
    }

    #[test]
    fn parse_page_exhausted_on_last_page() {
        let page = MovieSource::parse_page(BODY, 3).unwrap();
        assert!(!page.has_more);
    }
}
