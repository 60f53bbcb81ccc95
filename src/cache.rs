//! Per-source page accumulation.
//!
//! Each source keeps one bucket per [`PageKey`] (provider + normalized
//! filter).  Page numbers are not part of the key: successive pages
//! accumulate in the same bucket.
//!
//! * page 1 replaces the bucket wholesale;
//! * page > 1 appends, without de-duplicating against earlier pages (the
//!   aggregator de-duplicates across sources when it renders).
//!
//! The network is only consulted when the key has no bucket yet or when the
//! requested page is beyond the highest page already fetched.  Anything else
//! is served from the bucket, so pagination never goes backwards.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::source::{ContentItem, DataSource, PageRequest, SourcePage, Variant};

/// Cache bucket identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub variant: Variant,
    pub filter: String,
}

impl PageKey {
    /// Only news varies with categories, and only when no query is present
    /// (a search covers every category).
    pub fn for_request(variant: Variant, request: &PageRequest) -> Self {
        let filter = match (variant, request.query()) {
            (_, Some(q)) => format!("q:{}", q.to_lowercase()),
            (Variant::News, None) => format!("c:{}", request.categories.join(",")),
            (_, None) => "q:".to_string(),
        };
        Self { variant, filter }
    }
}

/// Items accumulated for one key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CachedPageSet {
    pub items: Vec<ContentItem>,
    /// Highest page number merged into `items`.
    pub highest_page: usize,
    /// Continuation signal from the most recent fetch.
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePlan {
    Fetch,
    Hit,
}

#[derive(Debug, Default)]
pub struct FetchCache {
    buckets: HashMap<PageKey, CachedPageSet>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self, key: &PageKey, page: usize) -> CachePlan {
        match self.buckets.get(key) {
            Some(set) if page <= set.highest_page => CachePlan::Hit,
            _ => CachePlan::Fetch,
        }
    }

    /// Merge a freshly fetched page and return the resulting accumulation.
    pub fn store(&mut self, key: PageKey, page: usize, fetched: SourcePage) -> &CachedPageSet {
        let set = self.buckets.entry(key).or_default();
        if page <= 1 {
            set.items = fetched.items;
        } else {
            set.items.extend(fetched.items);
        }
        set.highest_page = page;
        set.has_more = fetched.has_more;
        set
    }

    pub fn get(&self, key: &PageKey) -> Option<&CachedPageSet> {
        self.buckets.get(key)
    }
}

/// A [`DataSource`] behind its [`FetchCache`].
pub struct CachedSource {
    source: Box<dyn DataSource>,
    cache: FetchCache,
}

impl CachedSource {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            cache: FetchCache::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.source.variant()
    }

    /// Resolve `request` through the cache.
    ///
    /// A failed fetch leaves the bucket as it was, so repeating the request
    /// goes back to the network.
    pub async fn get(&mut self, request: &PageRequest) -> Result<CachedPageSet, FetchError> {
        let variant = self.source.variant();
        let key = PageKey::for_request(variant, request);

        if self.cache.plan(&key, request.page) == CachePlan::Hit {
            debug!(%variant, page = request.page, filter = %key.filter, "cache hit");
            if let Some(set) = self.cache.get(&key) {
                return Ok(set.clone());
            }
        }

        match self.source.fetch_page(request).await {
            Ok(page) => {
                debug!(%variant, page = request.page, fetched = page.items.len(), "fetched page");
                Ok(self.cache.store(key, request.page, page).clone())
            }
            Err(e) => {
                warn!(%variant, page = request.page, error = %e, "fetch failed");
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::source::fixtures::{movie, news};

    /// A scripted source: `pages[n]` answers page `n + 1`, every call counted.
    pub struct ScriptedSource {
        pub variant: Variant,
        pub pages: Vec<Result<SourcePage, FetchError>>,
        pub calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        pub fn new(variant: Variant, pages: Vec<Result<SourcePage, FetchError>>) -> Self {
            Self {
                variant,
                pages,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl DataSource for ScriptedSource {
        fn variant(&self) -> Variant {
            self.variant
        }

        async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(request.page - 1)
                .cloned()
                .unwrap_or_else(|| Ok(SourcePage::default()))
        }
    }

    pub fn page(items: Vec<ContentItem>, has_more: bool) -> SourcePage {
        SourcePage { items, has_more }
    }

    fn cats(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // -- PageKey ---------------------------------------------------------------

    #[test]
    fn key_ignores_page_number() {
        let a = PageKey::for_request(Variant::Movie, &PageRequest::new(1, 5, Some("x"), &[]));
        let b = PageKey::for_request(Variant::Movie, &PageRequest::new(4, 5, Some("x"), &[]));
        assert_eq!(a, b);
    }

    #[test]
    fn key_normalizes_query() {
        let a = PageKey::for_request(Variant::Social, &PageRequest::new(1, 5, Some("  Rust "), &[]));
        let b = PageKey::for_request(Variant::Social, &PageRequest::new(1, 5, Some("rust"), &[]));
        assert_eq!(a, b);
    }

    #[test]
    fn news_key_tracks_categories_but_movies_do_not() {
        let tech = PageRequest::new(1, 5, None, &cats(&["technology"]));
        let sport = PageRequest::new(1, 5, None, &cats(&["sports"]));
        assert_ne!(
            PageKey::for_request(Variant::News, &tech),
            PageKey::for_request(Variant::News, &sport)
        );
        assert_eq!(
            PageKey::for_request(Variant::Movie, &tech),
            PageKey::for_request(Variant::Movie, &sport)
        );
    }

    // -- FetchCache --------------------------------------------------------------

    #[test]
    fn plan_fetches_unknown_key() {
        let cache = FetchCache::new();
        let key = PageKey::for_request(Variant::News, &PageRequest::new(1, 5, None, &[]));
        assert_eq!(cache.plan(&key, 1), CachePlan::Fetch);
    }

    #[test]
    fn plan_fetches_only_beyond_highest_page() {
        let mut cache = FetchCache::new();
        let key = PageKey::for_request(Variant::Movie, &PageRequest::new(1, 5, None, &[]));
        cache.store(key.clone(), 1, page(vec![movie(1, "a")], true));
        cache.store(key.clone(), 2, page(vec![movie(2, "b")], true));

        assert_eq!(cache.plan(&key, 1), CachePlan::Hit);
        assert_eq!(cache.plan(&key, 2), CachePlan::Hit);
        assert_eq!(cache.plan(&key, 3), CachePlan::Fetch);
    }

    #[test]
    fn page_one_replaces_and_later_pages_append() {
        let mut cache = FetchCache::new();
        let key = PageKey::for_request(Variant::News, &PageRequest::new(1, 5, None, &[]));

        cache.store(key.clone(), 1, page(vec![news("u1", "1")], true));
        let set = cache.store(key.clone(), 2, page(vec![news("u1", "1"), news("u2", "2")], false));
        assert_eq!(set.items.len(), 3, "appends without intra-source dedup");
        assert_eq!(set.highest_page, 2);
        assert!(!set.has_more);

        let set = cache.store(key, 1, page(vec![news("u9", "9")], true));
        assert_eq!(set.items, vec![news("u9", "9")]);
        assert_eq!(set.highest_page, 1);
    }

    // -- CachedSource ------------------------------------------------------------

    #[tokio::test]
    async fn cached_source_serves_hits_without_network() {
        let scripted = ScriptedSource::new(
            Variant::Movie,
            vec![Ok(page(vec![movie(1, "a")], true)), Ok(page(vec![movie(2, "b")], false))],
        );
        let calls = scripted.calls.clone();
        let mut src = CachedSource::new(Box::new(scripted));

        let req1 = PageRequest::new(1, 5, None, &[]);
        let req2 = PageRequest::new(2, 5, None, &[]);

        assert_eq!(src.get(&req1).await.unwrap().items.len(), 1);
        assert_eq!(src.get(&req2).await.unwrap().items.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Re-requesting an already fetched page is served from the bucket.
        let again = src.get(&req1).await.unwrap();
        assert_eq!(again.items.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn new_query_goes_to_network() {
        let scripted = ScriptedSource::new(Variant::Movie, vec![Ok(page(vec![movie(1, "a")], true))]);
        let calls = scripted.calls.clone();
        let mut src = CachedSource::new(Box::new(scripted));

        src.get(&PageRequest::new(1, 5, None, &[])).await.unwrap();
        src.get(&PageRequest::new(1, 5, Some("alien"), &[])).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_bucket_untouched() {
        let err = FetchError::Provider {
            provider: Variant::News,
            status: Some(500),
            message: "boom".into(),
        };
        let scripted = ScriptedSource::new(
            Variant::News,
            vec![Ok(page(vec![news("u1", "1")], true)), Err(err.clone())],
        );
        let calls = scripted.calls.clone();
        let mut src = CachedSource::new(Box::new(scripted));

        src.get(&PageRequest::new(1, 5, None, &[])).await.unwrap();
        assert_eq!(src.get(&PageRequest::new(2, 5, None, &[])).await, Err(err.clone()));
        // Retrying page 2 fetches again rather than serving a hit.
        assert_eq!(src.get(&PageRequest::new(2, 5, None, &[])).await, Err(err));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
