//! Runtime configuration, read from the environment.
//!
//! | Variable              | Default                                  |
//! |-----------------------|------------------------------------------|
//! | `NEWS_API_KEY`        | empty (news requests will fail with 401) |
//! | `TMDB_API_KEY`        | empty (movie requests will fail with 401)|
//! | `DASHFEED_NEWS_URL`   | `https://newsapi.org`                    |
//! | `DASHFEED_TMDB_URL`   | `https://api.themoviedb.org`             |
//! | `DASHFEED_DATA_DIR`   | `<platform data dir>/dashfeed`           |
//! | `DASHFEED_PAGE_SIZE`  | `10`                                     |
//! | `RUST_LOG`            | `dashfeed=info`                          |

use std::path::PathBuf;
use std::time::Duration;

use crate::source::{movies, news, MAX_PAGE_SIZE};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub news_api_key: String,
    pub tmdb_api_key: String,
    pub news_base_url: String,
    pub tmdb_base_url: String,
    pub data_dir: PathBuf,
    /// Items per page across all providers; news and social each get half.
    pub page_size: usize,
    pub search_debounce: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty("DASHFEED_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("dashfeed")))
            .unwrap_or_else(|| PathBuf::from(".dashfeed"));

        let page_size = non_empty("DASHFEED_PAGE_SIZE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| (2..=MAX_PAGE_SIZE).contains(n))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            news_api_key: non_empty("NEWS_API_KEY").unwrap_or_default(),
            tmdb_api_key: non_empty("TMDB_API_KEY").unwrap_or_default(),
            news_base_url: non_empty("DASHFEED_NEWS_URL")
                .unwrap_or_else(|| news::DEFAULT_BASE_URL.to_string()),
            tmdb_base_url: non_empty("DASHFEED_TMDB_URL")
                .unwrap_or_else(|| movies::DEFAULT_BASE_URL.to_string()),
            data_dir,
            page_size,
            search_debounce: SEARCH_DEBOUNCE,
        }
    }

    /// Per-provider page size for the sources that honor one.
    pub fn source_page_size(&self) -> usize {
        (self.page_size / 2).max(1)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("dashfeed.log")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[("DASHFEED_DATA_DIR", "/tmp/df")]);
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.source_page_size(), 5);
        assert_eq!(cfg.news_base_url, "https://newsapi.org");
        assert_eq!(cfg.tmdb_base_url, "https://api.themoviedb.org");
        assert!(cfg.news_api_key.is_empty());
        assert_eq!(cfg.log_file(), PathBuf::from("/tmp/df/dashfeed.log"));
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("NEWS_API_KEY", "n-key"),
            ("TMDB_API_KEY", "t-key"),
            ("DASHFEED_PAGE_SIZE", "20"),
            ("DASHFEED_NEWS_URL", "http://localhost:8080"),
        ]);
        assert_eq!(cfg.news_api_key, "n-key");
        assert_eq!(cfg.tmdb_api_key, "t-key");
        assert_eq!(cfg.source_page_size(), 10);
        assert_eq!(cfg.news_base_url, "http://localhost:8080");
    }

    #[test]
    fn invalid_page_size_falls_back() {
        assert_eq!(config(&[("DASHFEED_PAGE_SIZE", "0")]).page_size, 10);
        assert_eq!(config(&[("DASHFEED_PAGE_SIZE", "lots")]).page_size, 10);
        assert_eq!(config(&[("DASHFEED_PAGE_SIZE", "1000")]).page_size, 10);
    }
}
