//! User preferences: selected categories and the color scheme.

use serde::{Deserialize, Serialize};

use crate::error::PrefsError;

/// Categories offered on the settings screen.
pub const AVAILABLE_CATEGORIES: [&str; 7] = [
    "technology",
    "sports",
    "finance",
    "health",
    "science",
    "entertainment",
    "business",
];

pub const DEFAULT_CATEGORIES: [&str; 3] = ["technology", "sports", "finance"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    categories: Vec<String>,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            dark_mode: false,
        }
    }
}

impl UserPreferences {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Replace the category set.  Must be non-empty and drawn from
    /// [`AVAILABLE_CATEGORIES`]; duplicates are dropped, order is kept.
    pub fn set_categories(&mut self, categories: Vec<String>) -> Result<(), PrefsError> {
        if categories.is_empty() {
            return Err(PrefsError::EmptyCategories);
        }
        if let Some(unknown) = categories
            .iter()
            .find(|c| !AVAILABLE_CATEGORIES.contains(&c.as_str()))
        {
            return Err(PrefsError::UnknownCategory(unknown.clone()));
        }
        let mut deduped: Vec<String> = Vec::with_capacity(categories.len());
        for c in categories {
            if !deduped.contains(&c) {
                deduped.push(c);
            }
        }
        self.categories = deduped;
        Ok(())
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    /// Repair a record loaded from disk that violates the invariants.
    pub fn sanitized(mut self) -> Self {
        self.categories
            .retain(|c| AVAILABLE_CATEGORIES.contains(&c.as_str()));
        if self.categories.is_empty() {
            self.categories = Self::default().categories;
        }
        self
    }
}

/// Unsaved category selection on the settings screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    selected: Vec<String>,
}

impl CategoryDraft {
    pub fn from_prefs(prefs: &UserPreferences) -> Self {
        Self {
            selected: prefs.categories().to_vec(),
        }
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.selected.iter().any(|c| c == category)
    }

    pub fn toggle(&mut self, category: &str) {
        if self.is_selected(category) {
            self.selected.retain(|c| c != category);
        } else {
            self.selected.push(category.to_string());
        }
    }

    pub fn into_categories(self) -> Vec<String> {
        self.selected
    }
}
