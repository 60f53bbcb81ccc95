//! The content types shared across all sources.
//!
//! Every provider converts its native payload into a [`ContentItem`] so the
//! cache, the aggregator and the UI never need to know which API produced an
//! item.  Variant-specific behavior (image, description, link) is resolved by
//! matching on the enum, never by probing for fields.
//!
//! ## Identity
//!
//! De-duplication and favorite lookup use [`Identity`]: the variant paired
//! with the provider identifier.  News articles carry no identifier upstream,
//! so their canonical URL stands in for one.  When even that is empty the
//! title is used instead.  Two distinct untitled-and-unlinked articles with the
//! same title will therefore collide; see `DESIGN.md`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// TMDB serves posters relative to this prefix.
const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Which upstream provider an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    News,
    Movie,
    Social,
}

impl Variant {
    /// Provider label used in status lines and error banners.
    pub fn label(self) -> &'static str {
        match self {
            Variant::News => "News",
            Variant::Movie => "Movies",
            Variant::Social => "Social",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The (variant, id-or-title) pair used for de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub variant: Variant,
    pub key: String,
}

impl Identity {
    pub fn new(variant: Variant, key: impl Into<String>) -> Self {
        Self {
            variant,
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A NewsAPI article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub source: ArticleSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical article URL, doubling as the identifier.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// A TMDB movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieItem {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
}

/// A post from the social corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialItem {
    pub id: String,
    pub author: String,
    pub content: String,
    pub timestamp: String,
    pub likes: u32,
    pub comments: u32,
}

/// A single feed entry from any provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    News(NewsItem),
    Movie(MovieItem),
    Social(SocialItem),
}

impl ContentItem {
    pub fn variant(&self) -> Variant {
        match self {
            ContentItem::News(_) => Variant::News,
            ContentItem::Movie(_) => Variant::Movie,
            ContentItem::Social(_) => Variant::Social,
        }
    }

    /// Provider-assigned identifier; empty when the provider gave none.
    pub fn id(&self) -> String {
        match self {
            ContentItem::News(n) => n.url.clone(),
            ContentItem::Movie(m) => m.id.to_string(),
            ContentItem::Social(s) => s.id.clone(),
        }
    }

    /// Display title.  Social posts have none upstream, so the author stands in.
    pub fn title(&self) -> &str {
        match self {
            ContentItem::News(n) => &n.title,
            ContentItem::Movie(m) => &m.title,
            ContentItem::Social(s) => &s.author,
        }
    }

    pub fn identity(&self) -> Identity {
        let id = self.id();
        let key = if id.trim().is_empty() {
            self.title().to_string()
        } else {
            id
        };
        Identity::new(self.variant(), key)
    }

    pub fn image_url(&self) -> Option<String> {
        match self {
            ContentItem::News(n) => n.url_to_image.clone().filter(|u| !u.is_empty()),
            ContentItem::Movie(m) => m
                .poster_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("{POSTER_BASE}{p}")),
            ContentItem::Social(_) => None,
        }
    }

    pub fn description(&self) -> &str {
        let text = match self {
            ContentItem::News(n) => n
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .or(n.content.as_deref()),
            ContentItem::Movie(m) => Some(m.overview.as_str()),
            ContentItem::Social(s) => Some(s.content.as_str()),
        };
        text.filter(|t| !t.is_empty())
            .unwrap_or("No description available.")
    }

    /// External link, only news articles have one.
    pub fn link(&self) -> Option<&str> {
        match self {
            ContentItem::News(n) if !n.url.is_empty() => Some(&n.url),
            _ => None,
        }
    }

    /// Short secondary line shown under the title.
    pub fn byline(&self) -> String {
        match self {
            ContentItem::News(n) => {
                let date = n.published_at.get(..10).unwrap_or(&n.published_at);
                format!("{} · {}", n.source.name, date)
            }
            ContentItem::Movie(m) => format!("★ {:.1} · {}", m.vote_average, m.release_date),
            ContentItem::Social(s) => format!("♥ {} · 💬 {}", s.likes, s.comments),
        }
    }

    /// Label of the variant's primary action.
    pub fn action_label(&self) -> &'static str {
        match self {
            ContentItem::News(_) => "Read More",
            ContentItem::Movie(_) => "Play Now",
            ContentItem::Social(_) => "Share",
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn news(url: &str, title: &str) -> ContentItem {
        ContentItem::News(NewsItem {
            source: ArticleSource {
                id: None,
                name: "Wire".into(),
            },
            author: None,
            title: title.into(),
            description: None,
            url: url.into(),
            url_to_image: None,
            published_at: "2025-03-01T10:00:00Z".into(),
            content: None,
        })
    }

    pub fn movie(id: u64, title: &str) -> ContentItem {
        ContentItem::Movie(MovieItem {
            id,
            title: title.into(),
            overview: format!("{title} overview"),
            poster_path: Some(format!("/{id}.jpg")),
            release_date: "2025-01-01".into(),
            vote_average: 7.5,
        })
    }

    pub fn social(id: &str) -> ContentItem {
        ContentItem::Social(SocialItem {
            id: id.into(),
            author: "User7".into(),
            content: format!("post {id}"),
            timestamp: "2025-03-01T10:00:00Z".into(),
            likes: 3,
            comments: 1,
        })
    }

    #[test]
    fn news_identity_is_its_url() {
        let item = news("https://example.com/a", "A");
        assert_eq!(item.identity(), Identity::new(Variant::News, "https://example.com/a"));
    }

    #[test]
    fn identity_falls_back_to_title_without_url() {
        let item = news("", "Headline");
        assert_eq!(item.identity(), Identity::new(Variant::News, "Headline"));
    }

    #[test]
    fn identity_includes_variant() {
        let m = movie(42, "Same");
        let s = social("42");
        assert_eq!(m.identity().key, s.identity().key);
        assert_ne!(m.identity(), s.identity());
    }

    #[test]
    fn movie_image_uses_poster_base() {
        let m = movie(7, "Seven");
        assert_eq!(
            m.image_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/7.jpg")
        );
    }

    #[test]
    fn news_description_falls_back_to_content_then_placeholder() {
        let mut item = news("u", "t");
        assert_eq!(item.description(), "No description available.");
        if let ContentItem::News(n) = &mut item {
            n.content = Some("body text".into());
        }
        assert_eq!(item.description(), "body text");
    }

    #[test]
    fn only_news_has_a_link() {
        assert_eq!(news("https://x", "t").link(), Some("https://x"));
        assert!(movie(1, "m").link().is_none());
        assert!(social("s").link().is_none());
    }

    #[test]
    fn news_deserializes_from_newsapi_shape() {
        let json = r#"{
            "source": {"id": null, "name": "BBC"},
            "author": "Jane",
            "title": "Hello",
            "description": "desc",
            "url": "https://bbc.co.uk/1",
            "urlToImage": "https://img/1.png",
            "publishedAt": "2025-05-05T12:00:00Z",
            "content": null
        }"#;
        let item: NewsItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.source.name, "BBC");
        assert_eq!(item.url_to_image.as_deref(), Some("https://img/1.png"));
        assert_eq!(
            ContentItem::News(item).byline(),
            "BBC · 2025-05-05"
        );
    }
}
