//! Social posts source.
//!
//! There is no upstream service: the provider is a finite corpus generated
//! deterministically from a fixed seed, so the same anchor time always
//! produces the same posts.  Search and pagination run in memory.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ContentItem, DataSource, PageRequest, SocialItem, SourcePage, Variant};
use crate::error::FetchError;

pub const CORPUS_SIZE: usize = 50;
const CORPUS_SEED: u64 = 0x5eed_50c1a1;

pub struct SocialSource {
    posts: Vec<SocialItem>,
}

impl SocialSource {
    /// Build the corpus.  Post `n` is timestamped `n - 1` hours before `anchor`.
    pub fn new(anchor: DateTime<Utc>) -> Self {
        let mut rng = StdRng::seed_from_u64(CORPUS_SEED);
        let posts = (1..=CORPUS_SIZE)
            .map(|n| SocialItem {
                id: format!("social-{n}"),
                author: format!("User{}", rng.gen_range(0..100)),
                content: format!(
                    "This is a mock social post number {n}. It's about a random topic to fill space. #mock #social #content"
                ),
                timestamp: (anchor - Duration::hours(n as i64 - 1))
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                likes: rng.gen_range(0..1000),
                comments: rng.gen_range(0..100),
            })
            .collect();
        Self { posts }
    }

    /// Case-insensitive match on body text or author, then slice out the page.
    pub fn page(&self, request: &PageRequest) -> SourcePage {
        let needle = request.query().map(str::to_lowercase);
        let matching: Vec<&SocialItem> = self
            .posts
            .iter()
            .filter(|post| match &needle {
                Some(q) => {
                    post.content.to_lowercase().contains(q) || post.author.to_lowercase().contains(q)
                }
                None => true,
            })
            .collect();

        let start = request.page.saturating_sub(1).saturating_mul(request.page_size);
        let end = start.saturating_add(request.page_size).min(matching.len());
        let items = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|post| ContentItem::Social((*post).clone()))
            .collect();

        SourcePage {
            items,
            has_more: end < matching.len(),
        }
    }
}

#[async_trait]
impl DataSource for SocialSource {
    fn variant(&self) -> Variant {
        Variant::Social
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, FetchError> {
        request.validate(Variant::Social)?;
        Ok(self.page(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn source() -> SocialSource {
        SocialSource::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    }

    fn ids(page: &SourcePage) -> Vec<String> {
        page.items.iter().map(ContentItem::id).collect()
    }

    #[test]
    fn corpus_is_deterministic() {
        let a = source();
        let b = source();
        assert_eq!(a.posts, b.posts);
        assert_eq!(a.posts.len(), CORPUS_SIZE);
    }

    #[test]
    fn timestamps_step_back_one_hour() {
        let src = source();
        assert_eq!(src.posts[0].timestamp, "2025-06-01T12:00:00.000Z");
        assert_eq!(src.posts[1].timestamp, "2025-06-01T11:00:00.000Z");
    }

    #[test]
    fn pages_are_contiguous_slices() {
        let src = source();
        let first = src.page(&PageRequest::new(1, 5, None, &[]));
        let second = src.page(&PageRequest::new(2, 5, None, &[]));

        assert_eq!(ids(&first), ["social-1", "social-2", "social-3", "social-4", "social-5"]);
        assert_eq!(ids(&second)[0], "social-6");
        assert!(first.has_more);
    }

    #[test]
    fn last_page_reports_exhaustion() {
        let src = source();
        let last = src.page(&PageRequest::new(10, 5, None, &[]));
        assert_eq!(last.items.len(), 5);
        assert!(!last.has_more);

        let beyond = src.page(&PageRequest::new(11, 5, None, &[]));
        assert!(beyond.items.is_empty());
        assert!(!beyond.has_more);
    }

    #[test]
    fn query_matches_content_case_insensitively() {
        let src = source();
        let page = src.page(&PageRequest::new(1, 10, Some("NUMBER 42."), &[]));
        assert_eq!(ids(&page), ["social-42"]);
        assert!(!page.has_more);
    }

    #[test]
    fn query_matches_author() {
        let src = source();
        let author = src.posts[3].author.to_uppercase();
        let page = src.page(&PageRequest::new(1, 50, Some(&author), &[]));
        assert!(page.items.iter().any(|i| i.id() == "social-4"));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let src = source();
        let page = src.page(&PageRequest::new(1, 5, Some("zzz-nothing"), &[]));
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }
}
