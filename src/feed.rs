//! The feed aggregator.
//!
//! [`Feed`] owns the visible, user-reorderable sequence of items and decides
//! which page to ask for next.  It never talks to the network itself: it
//! hands out [`FeedRequest`]s, and the poller answers each one with a
//! [`PageBatch`] holding every provider's outcome.
//!
//! ## Lifecycle of a request
//!
//! 1. [`Feed::reset`] (new search, new categories, view switch) always
//!    issues page 1 and supersedes anything in flight.
//! 2. [`Feed::next_page`] is suppressed while a request is in flight or once
//!    every provider reported exhaustion, so bursts of scroll events collapse
//!    into one fetch.
//! 3. [`Feed::complete`] discards batches that do not answer the request
//!    currently in flight (a slow response to a superseded search), then
//!    merges: page 1 replaces the visible items, later pages append only
//!    identities not already visible.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::cache::CachedPageSet;
use crate::error::FetchError;
use crate::source::{ContentItem, Identity, Variant};

/// Category used by the trending view.
pub const TRENDING_CATEGORY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// Follows the user's saved categories; reorderable.
    Personalized,
    /// Fixed general headlines.
    Trending,
}

/// Everything that selects *which* content a feed shows, excluding the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSignature {
    pub kind: FeedKind,
    /// Trimmed search query; empty when not searching.
    pub query: String,
    pub categories: Vec<String>,
}

impl FeedSignature {
    pub fn new(kind: FeedKind, query: &str, categories: &[String]) -> Self {
        let categories = match kind {
            FeedKind::Personalized => categories.to_vec(),
            FeedKind::Trending => vec![TRENDING_CATEGORY.to_string()],
        };
        Self {
            kind,
            query: query.trim().to_string(),
            categories,
        }
    }

    pub fn query(&self) -> Option<&str> {
        Some(self.query.as_str()).filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub signature: FeedSignature,
    pub page: usize,
}

/// One provider's settled outcome for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOutcome {
    pub variant: Variant,
    pub result: Result<CachedPageSet, FetchError>,
}

/// All providers' outcomes for one [`FeedRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch {
    pub request: FeedRequest,
    pub outcomes: Vec<SourceOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Merged; `added` items became visible.
    Applied { added: usize },
    /// Answered a superseded request and was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Waiting for the first batch of the current signature.
    Loading,
    /// Every provider returned nothing (or failed).
    Empty,
    /// Items are visible and at least one provider has more.
    More,
    /// Items are visible and every provider is exhausted.
    Exhausted,
}

/// Presentation-only permutation applied to each merged batch.
///
/// Interleaves providers so one source's items do not cluster.  The order
/// carries no meaning; tests use [`Shuffle::Preserve`] or a seed to pin it.
#[derive(Debug)]
pub enum Shuffle {
    Random(StdRng),
    #[cfg_attr(not(test), allow(dead_code))]
    Preserve,
}

impl Shuffle {
    pub fn random() -> Self {
        Shuffle::Random(StdRng::from_entropy())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn seeded(seed: u64) -> Self {
        Shuffle::Random(StdRng::seed_from_u64(seed))
    }

    pub fn apply(&mut self, items: &mut [ContentItem]) {
        match self {
            Shuffle::Random(rng) => items.shuffle(rng),
            Shuffle::Preserve => {}
        }
    }
}

pub struct Feed {
    items: Vec<ContentItem>,
    signature: Option<FeedSignature>,
    /// Last page merged for the current signature.
    page: usize,
    in_flight: Option<FeedRequest>,
    has_more: bool,
    /// Whether a batch for the current signature has been merged yet.
    loaded: bool,
    errors: Vec<FetchError>,
    shuffle: Shuffle,
}

impl Feed {
    pub fn new(shuffle: Shuffle) -> Self {
        Self {
            items: Vec::new(),
            signature: None,
            page: 0,
            in_flight: None,
            has_more: true,
            loaded: false,
            errors: Vec::new(),
            shuffle,
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn signature(&self) -> Option<&FeedSignature> {
        self.signature.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// `false` only when every provider's most recent answer was "no more".
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Providers that failed in the most recent batch.
    pub fn errors(&self) -> &[FetchError] {
        &self.errors
    }

    pub fn status(&self) -> FeedStatus {
        if !self.loaded {
            FeedStatus::Loading
        } else if self.items.is_empty() {
            FeedStatus::Empty
        } else if self.has_more {
            FeedStatus::More
        } else {
            FeedStatus::Exhausted
        }
    }

    /// Start over at page 1 for `signature`.  Always issues a request; any
    /// response still in flight becomes stale.
    pub fn reset(&mut self, signature: FeedSignature) -> FeedRequest {
        if self.signature.as_ref() != Some(&signature) {
            info!(query = %signature.query, categories = ?signature.categories, "feed filter changed");
            self.loaded = false;
        }
        self.signature = Some(signature.clone());
        self.has_more = true;
        self.errors.clear();
        self.issue(FeedRequest { signature, page: 1 })
    }

    /// Request the page after the last merged one, unless a request is in
    /// flight or nothing more exists.
    pub fn next_page(&mut self) -> Option<FeedRequest> {
        if self.in_flight.is_some() || !self.has_more || !self.loaded {
            return None;
        }
        let signature = self.signature.clone()?;
        Some(self.issue(FeedRequest {
            signature,
            page: self.page + 1,
        }))
    }

    /// Re-issue the current page (or page 1 before anything loaded).  Cached
    /// providers answer from their buckets; failed ones are fetched again.
    pub fn retry(&mut self) -> Option<FeedRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let signature = self.signature.clone()?;
        Some(self.issue(FeedRequest {
            signature,
            page: self.page.max(1),
        }))
    }

    fn issue(&mut self, request: FeedRequest) -> FeedRequest {
        debug!(page = request.page, "feed request issued");
        self.in_flight = Some(request.clone());
        request
    }

    /// Merge a settled batch.
    pub fn complete(&mut self, batch: PageBatch) -> Completion {
        if self.in_flight.as_ref() != Some(&batch.request) {
            debug!(page = batch.request.page, query = %batch.request.signature.query, "discarding stale batch");
            return Completion::Stale;
        }
        self.in_flight = None;

        let page = batch.request.page;
        let mut merged = Vec::new();
        let mut has_more = false;
        // A cached page 1 hands back every page its bucket holds.
        let mut reached: Option<usize> = None;
        self.errors.clear();

        for outcome in batch.outcomes {
            match outcome.result {
                Ok(set) => {
                    has_more |= set.has_more;
                    reached = Some(reached.map_or(set.highest_page, |r| r.min(set.highest_page)));
                    merged.extend(set.items);
                }
                Err(e) => {
                    warn!(provider = %outcome.variant, error = %e, "provider failed");
                    self.errors.push(e);
                }
            }
        }

        self.shuffle.apply(&mut merged);

        let mut seen: HashSet<Identity> = if page <= 1 {
            HashSet::new()
        } else {
            self.items.iter().map(ContentItem::identity).collect()
        };
        let fresh: Vec<ContentItem> = merged
            .into_iter()
            .filter(|item| seen.insert(item.identity()))
            .collect();
        let added = fresh.len();

        if page <= 1 {
            self.items = fresh;
        } else {
            self.items.extend(fresh);
        }

        self.page = reached.map_or(page, |r| r.max(page));
        self.has_more = has_more;
        self.loaded = true;
        info!(page, added, total = self.items.len(), has_more, "feed updated");
        Completion::Applied { added }
    }

    pub fn position(&self, identity: &Identity) -> Option<usize> {
        self.items.iter().position(|item| &item.identity() == identity)
    }

    /// Move the item `active` to the index currently held by `over`.
    ///
    /// Remove-then-insert: `[a, b, c]` with `move_item(a, c)` yields
    /// `[b, c, a]`.  Returns `false` (and changes nothing) when the two are
    /// the same or either is not visible.
    pub fn move_item(&mut self, active: &Identity, over: &Identity) -> bool {
        if active == over {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(active), self.position(over)) else {
            return false;
        };
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
