//! User-curated favorites.
//!
//! Favorites are a reduced projection of a [`ContentItem`]: enough to list
//! and open them later, independent of whatever the feed currently shows.
//! At most one entry exists per (id, variant).

use serde::{Deserialize, Serialize};

use crate::source::{ContentItem, Variant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub id: String,
    #[serde(rename = "type")]
    pub variant: Variant,
    pub title: String,
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&ContentItem> for FavoriteItem {
    fn from(item: &ContentItem) -> Self {
        let identity = item.identity();
        Self {
            id: identity.key,
            variant: identity.variant,
            title: item.title().to_string(),
            image_url: item.image_url(),
            url: item.link().map(str::to_string),
        }
    }
}

impl FavoriteItem {
    pub fn action_label(&self) -> &'static str {
        match self.variant {
            Variant::News => "Read More",
            Variant::Movie => "Play Now",
            Variant::Social => "Share",
        }
    }
}

/// Insertion-ordered favorites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesStore {
    items: Vec<FavoriteItem>,
}

impl FavoritesStore {
    /// Insert unless (id, variant) is already present.  Returns whether the
    /// store changed.
    pub fn add(&mut self, item: FavoriteItem) -> bool {
        if self.is_favorite(&item.id, item.variant) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove (id, variant) if present.  Returns whether the store changed.
    pub fn remove(&mut self, id: &str, variant: Variant) -> bool {
        let before = self.items.len();
        self.items.retain(|f| !(f.id == id && f.variant == variant));
        self.items.len() != before
    }

    pub fn is_favorite(&self, id: &str, variant: Variant) -> bool {
        self.items.iter().any(|f| f.id == id && f.variant == variant)
    }

    pub fn contains(&self, item: &ContentItem) -> bool {
        let identity = item.identity();
        self.is_favorite(&identity.key, identity.variant)
    }

    /// Favorite `item` if it isn't one yet, otherwise remove it.  Returns the
    /// new favorite state.
    pub fn toggle(&mut self, item: &ContentItem) -> bool {
        let identity = item.identity();
        if self.remove(&identity.key, identity.variant) {
            false
        } else {
            self.add(FavoriteItem::from(item))
        }
    }

    pub fn list(&self) -> &[FavoriteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fixtures::{movie, news, social};

    fn fav(id: &str, variant: Variant) -> FavoriteItem {
        FavoriteItem {
            id: id.into(),
            variant,
            title: format!("title {id}"),
            image_url: None,
            url: None,
        }
    }

    #[test]
    fn add_is_idempotent() {
        let mut store = FavoritesStore::default();
        assert!(store.add(fav("x", Variant::Movie)));
        assert!(!store.add(fav("x", Variant::Movie)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn same_id_different_variant_are_distinct() {
        let mut store = FavoritesStore::default();
        store.add(fav("1", Variant::Movie));
        store.add(fav("1", Variant::Social));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = FavoritesStore::default();
        assert!(!store.remove("nope", Variant::News));
        assert!(store.is_empty());
    }

    #[test]
    fn list_keeps_insertion_order() {
        let mut store = FavoritesStore::default();
        store.add(fav("b", Variant::News));
        store.add(fav("a", Variant::News));
        store.add(fav("c", Variant::Social));
        store.remove("a", Variant::News);
        let ids: Vec<&str> = store.list().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut store = FavoritesStore::default();
        let item = movie(603, "The Matrix");
        assert!(store.toggle(&item));
        assert!(store.contains(&item));
        assert!(store.is_favorite("603", Variant::Movie));
        assert!(!store.toggle(&item));
        assert!(store.is_empty());
    }

    #[test]
    fn projection_keeps_link_and_image() {
        let n = FavoriteItem::from(&news("https://a/1", "Headline"));
        assert_eq!(n.id, "https://a/1");
        assert_eq!(n.url.as_deref(), Some("https://a/1"));
        assert_eq!(n.action_label(), "Read More");

        let m = FavoriteItem::from(&movie(5, "Five"));
        assert!(m.image_url.is_some());
        assert!(m.url.is_none());

        let s = FavoriteItem::from(&social("social-3"));
        assert_eq!(s.variant, Variant::Social);
    }

    #[test]
    fn serializes_variant_as_type() {
        let json = serde_json::to_value(fav("1", Variant::Movie)).unwrap();
        assert_eq!(json["type"], "movie");
        assert_eq!(json["imageUrl"], serde_json::Value::Null);
        assert!(json.get("url").is_none());
    }
}
