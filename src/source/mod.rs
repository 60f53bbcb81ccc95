//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait, the paginated request and
//! response types, and the common [`ContentItem`] type.  Concrete providers
//! live in sub-modules: [`news`] (NewsAPI), [`movies`] (TMDB) and [`social`]
//! (an in-memory corpus).
//!
//! ## For contributors — adding a new source
//!
//! 1. Add a variant to [`Variant`] and [`ContentItem`] in `content.rs`; the
//!    compiler will point at every `match` that needs an arm.
//! 2. Create a new file in this directory and implement [`DataSource`].
//! 3. Construct it in `main.rs` and add it to the poller's source list.
//!
//! The cache, aggregator and UI are provider-agnostic.

mod content;
pub mod movies;
pub mod news;
pub mod social;

pub use content::{ContentItem, Identity, MovieItem, NewsItem, SocialItem, Variant};
pub use movies::MovieSource;
pub use news::NewsApiSource;
pub use social::SocialSource;

#[cfg(test)]
pub(crate) use content::tests as fixtures;

use async_trait::async_trait;

use crate::error::FetchError;

/// Largest page size any provider accepts.
pub const MAX_PAGE_SIZE: usize = 100;
const MAX_QUERY_LEN: usize = 500;

/// One page request, shared by every provider.
///
/// Providers ignore the fields they have no use for (movies ignore the page
/// size and categories, social ignores categories).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    pub query: Option<String>,
    pub categories: Vec<String>,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize, query: Option<&str>, categories: &[String]) -> Self {
        Self {
            page,
            page_size,
            query: query.map(str::to_string),
            categories: categories.to_vec(),
        }
    }

    /// The search query, trimmed; `None` when blank.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Reject malformed parameters before anything reaches the network.
    pub fn validate(&self, provider: Variant) -> Result<(), FetchError> {
        if self.page == 0 {
            return Err(FetchError::validation(provider, "page must be at least 1"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(FetchError::validation(
                provider,
                format!("page size must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        if self.query().is_some_and(|q| q.chars().count() > MAX_QUERY_LEN) {
            return Err(FetchError::validation(provider, "search query is too long"));
        }
        if let Some(bad) = self
            .categories
            .iter()
            .find(|c| c.is_empty() || !c.chars().all(|ch| ch.is_ascii_lowercase()))
        {
            return Err(FetchError::validation(
                provider,
                format!("invalid category {bad:?}"),
            ));
        }
        Ok(())
    }
}

/// One page of results plus the continuation signal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourcePage {
    pub items: Vec<ContentItem>,
    pub has_more: bool,
}

/// Trait that every data source must implement.
///
/// The poller calls [`fetch_page()`](DataSource::fetch_page) on its own
/// thread, so implementations must be [`Send`] + [`Sync`].
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Which provider this is.
    fn variant(&self) -> Variant;

    /// Fetch one page.  Errors are reported per provider and never abort the
    /// other sources' fetches.
    async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, FetchError>;
}

/// Map a non-success HTTP response into a [`FetchError::Provider`].
///
/// `field` names the JSON key the provider uses for its error text; when the
/// body is absent or unparseable a generic message is synthesized.
pub(crate) fn provider_error(provider: Variant, status: u16, body: &str, field: &str) -> FetchError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get(field).and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("failed to fetch {}", provider.label().to_lowercase()));
    FetchError::Provider {
        provider,
        status: Some(status),
        message,
    }
}
