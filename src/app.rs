//! Application state.
//!
//! [`App`] is the one owner of everything the UI shows: the feed, favorites,
//! preferences and the selection state of each view.  It is passed by
//! `&mut` to the input handler and by reference to the renderer; nothing is
//! global.
//!
//! `App` never does I/O on the network itself.  Operations that need a fetch
//! queue a [`FeedRequest`]; the main loop drains them with
//! [`App::take_requests`] and forwards them to the poller.  Preferences and
//! favorites are written through the [`KeyValueStore`] on every change.

use std::time::{Duration, Instant};

use ratatui::widgets::ListState;
use tracing::{info, warn};

use crate::debounce::Debouncer;
use crate::favorites::{FavoriteItem, FavoritesStore};
use crate::feed::{Completion, Feed, FeedKind, FeedRequest, FeedSignature, PageBatch, Shuffle};
use crate::prefs::{CategoryDraft, UserPreferences, AVAILABLE_CATEGORIES};
use crate::source::ContentItem;
use crate::storage::{self, KeyValueStore, FAVORITES_KEY, PREFERENCES_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,
    Trending,
    Favorites,
    Settings,
}

impl View {
    pub const ALL: [View; 4] = [View::Feed, View::Trending, View::Favorites, View::Settings];

    pub fn title(self) -> &'static str {
        match self {
            View::Feed => "Feed",
            View::Trending => "Trending",
            View::Favorites => "Favorites",
            View::Settings => "Settings",
        }
    }

    fn feed_kind(self) -> Option<FeedKind> {
        match self {
            View::Feed => Some(FeedKind::Personalized),
            View::Trending => Some(FeedKind::Trending),
            View::Favorites | View::Settings => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App {
    pub view: View,
    pub feed: Feed,
    pub favorites: FavoritesStore,
    pub prefs: UserPreferences,
    /// Unsaved selection on the settings screen.
    pub draft: CategoryDraft,
    pub input_mode: InputMode,
    /// Text in the search box, possibly not yet applied.
    pub search_input: String,
    /// Query the feed is currently filtered by.
    pub query: String,
    pub list_state: ListState,
    pub favorites_state: ListState,
    pub settings_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    debouncer: Debouncer,
    store: Box<dyn KeyValueStore>,
    outbox: Vec<FeedRequest>,
}

impl App {
    /// Load persisted state (falling back to defaults) and build the app.
    pub fn new(store: Box<dyn KeyValueStore>, shuffle: Shuffle, search_debounce: Duration) -> Self {
        let prefs: UserPreferences =
            storage::load_or_default::<UserPreferences, _>(&*store, PREFERENCES_KEY).sanitized();
        let favorites: FavoritesStore = storage::load_or_default(&*store, FAVORITES_KEY);
        info!(
            categories = ?prefs.categories(),
            favorites = favorites.len(),
            "loaded preferences"
        );

        let mut settings_state = ListState::default();
        settings_state.select(Some(0));

        Self {
            view: View::Feed,
            feed: Feed::new(shuffle),
            draft: CategoryDraft::from_prefs(&prefs),
            favorites,
            prefs,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            query: String::new(),
            list_state: ListState::default(),
            favorites_state: ListState::default(),
            settings_state,
            quit: false,
            status: "Starting…".into(),
            debouncer: Debouncer::new(search_debounce),
            store,
            outbox: Vec::new(),
        }
    }

    /// Issue the first page for the initial view.
    pub fn start(&mut self) {
        self.refresh_feed(true);
    }

    /// Requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<FeedRequest> {
        std::mem::take(&mut self.outbox)
    }

    fn signature(&self, kind: FeedKind) -> FeedSignature {
        FeedSignature::new(kind, &self.query, self.prefs.categories())
    }

    /// Restart the feed at page 1 when the current view's signature differs
    /// from what the feed shows, or unconditionally when `force` is set.
    fn refresh_feed(&mut self, force: bool) {
        let Some(kind) = self.view.feed_kind() else {
            return;
        };
        let signature = self.signature(kind);
        if force || self.feed.signature() != Some(&signature) {
            let request = self.feed.reset(signature);
            self.outbox.push(request);
            self.status = "Loading…".into();
        }
    }

    // -- poller results ----------------------------------------------------------

    pub fn on_batch(&mut self, batch: PageBatch) {
        let requested = batch.request.page;
        match self.feed.complete(batch) {
            Completion::Stale => {}
            Completion::Applied { added } => {
                if requested <= 1 {
                    let first = (!self.feed.items().is_empty()).then_some(0);
                    self.list_state.select(first);
                } else if self.list_state.selected().is_none() && added > 0 {
                    self.list_state.select(Some(0));
                }
                let page = self.feed.page();
                self.status = if self.feed.errors().is_empty() {
                    format!("Loaded page {page} (+{added})")
                } else {
                    let failed: Vec<&str> =
                        self.feed.errors().iter().map(|e| e.provider().label()).collect();
                    format!("Loaded page {page} (+{added}), failed: {}", failed.join(", "))
                };
            }
        }
    }

    pub fn on_poller_failed(&mut self, reason: &str) {
        self.status = format!("Fetching unavailable: {reason}");
    }

    // -- views -------------------------------------------------------------------

    pub fn switch_view(&mut self, view: View) {
        if self.view == view {
            return;
        }
        let kind_changed = view.feed_kind().is_some() && view.feed_kind() != self.view.feed_kind();
        if kind_changed && self.view.feed_kind().is_some() {
            // Each feed view has its own search box.
            self.query.clear();
            self.search_input.clear();
        }
        if view == View::Settings {
            self.draft = CategoryDraft::from_prefs(&self.prefs);
        }
        self.view = view;
        self.input_mode = InputMode::Normal;
        self.debouncer.cancel();
        self.refresh_feed(false);
    }

    pub fn next_view(&mut self) {
        let idx = View::ALL.iter().position(|v| *v == self.view).unwrap_or(0);
        self.switch_view(View::ALL[(idx + 1) % View::ALL.len()]);
    }

    fn active_list_len(&self) -> usize {
        match self.view {
            View::Feed | View::Trending => self.feed.items().len(),
            View::Favorites => self.favorites.len(),
            View::Settings => AVAILABLE_CATEGORIES.len(),
        }
    }

    fn active_state(&mut self) -> &mut ListState {
        match self.view {
            View::Feed | View::Trending => &mut self.list_state,
            View::Favorites => &mut self.favorites_state,
            View::Settings => &mut self.settings_state,
        }
    }

    // -- navigation --------------------------------------------------------------

    /// Move down; reaching the last feed item asks for the next page.
    pub fn select_next(&mut self) {
        let len = self.active_list_len();
        if len == 0 {
            return;
        }
        let state = self.active_state();
        let i = match state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        state.select(Some(i));
        if i + 1 == len {
            self.load_more();
        }
    }

    pub fn select_previous(&mut self) {
        if self.active_list_len() == 0 {
            return;
        }
        let state = self.active_state();
        let i = match state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.active_list_len() > 0 {
            self.active_state().select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.active_list_len();
        if len > 0 {
            self.active_state().select(Some(len - 1));
            self.load_more();
        }
    }

    // -- feed actions ------------------------------------------------------------

    pub fn load_more(&mut self) {
        if self.view.feed_kind().is_none() {
            return;
        }
        if !self.feed.has_more() {
            self.status = "You've reached the end of the feed.".into();
            return;
        }
        if let Some(request) = self.feed.next_page() {
            self.status = format!("Loading page {}…", request.page);
            self.outbox.push(request);
        }
    }

    /// Whether typed search text is still waiting out the debounce window.
    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn retry(&mut self) {
        if self.view.feed_kind().is_none() {
            return;
        }
        if let Some(request) = self.feed.retry() {
            self.status = "Retrying…".into();
            self.outbox.push(request);
        }
    }

    pub fn selected_item(&self) -> Option<&ContentItem> {
        if self.view.feed_kind().is_none() {
            return None;
        }
        self.list_state.selected().and_then(|i| self.feed.items().get(i))
    }

    pub fn selected_favorite(&self) -> Option<&FavoriteItem> {
        if self.view != View::Favorites {
            return None;
        }
        self.favorites_state
            .selected()
            .and_then(|i| self.favorites.list().get(i))
    }

    /// Link of the selected feed item or favorite, if it has one.
    pub fn selected_link(&self) -> Option<String> {
        match self.view {
            View::Favorites => self.selected_favorite().and_then(|f| f.url.clone()),
            _ => self.selected_item().and_then(|i| i.link()).map(str::to_string),
        }
    }

    pub fn toggle_favorite(&mut self) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        let now_favorite = self.favorites.toggle(&item);
        self.status = if now_favorite {
            format!("Added to favorites: {}", item.title())
        } else {
            format!("Removed from favorites: {}", item.title())
        };
        self.persist_favorites();
    }

    pub fn remove_selected_favorite(&mut self) {
        let Some(fav) = self.selected_favorite().cloned() else {
            return;
        };
        if self.favorites.remove(&fav.id, fav.variant) {
            self.status = format!("Removed from favorites: {}", fav.title);
            let len = self.favorites.len();
            let selected = self.favorites_state.selected().map(|i| i.min(len.saturating_sub(1)));
            self.favorites_state.select(selected.filter(|_| len > 0));
            self.persist_favorites();
        }
    }

    /// Swap the selected item with its neighbor, personalized feed only.
    pub fn move_selected(&mut self, down: bool) {
        if self.view != View::Feed {
            return;
        }
        let Some(from) = self.list_state.selected() else {
            return;
        };
        let to = if down {
            from + 1
        } else {
            match from.checked_sub(1) {
                Some(to) => to,
                None => return,
            }
        };
        let items = self.feed.items();
        let (Some(active), Some(over)) = (items.get(from), items.get(to)) else {
            return;
        };
        let (active, over) = (active.identity(), over.identity());
        if self.feed.move_item(&active, &over) {
            self.list_state.select(Some(to));
        }
    }

    // -- search ------------------------------------------------------------------

    pub fn begin_search(&mut self) {
        if self.view.feed_kind().is_some() {
            self.input_mode = InputMode::Search;
        }
    }

    pub fn search_push(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.debouncer.input(self.search_input.clone(), now);
    }

    pub fn search_pop(&mut self, now: Instant) {
        self.search_input.pop();
        self.debouncer.input(self.search_input.clone(), now);
    }

    /// Enter: apply the typed query now and leave search mode.
    pub fn search_submit(&mut self) {
        self.debouncer.cancel();
        self.input_mode = InputMode::Normal;
        let query = self.search_input.clone();
        self.apply_query(&query);
    }

    /// Esc: leave search mode, keeping whatever query is applied.
    pub fn search_cancel(&mut self) {
        self.debouncer.cancel();
        self.input_mode = InputMode::Normal;
        self.search_input = self.query.clone();
    }

    /// Called every loop tick; fires a debounced query once typing pauses.
    pub fn tick(&mut self, now: Instant) {
        if let Some(query) = self.debouncer.poll(now) {
            self.apply_query(&query);
        }
    }

    fn apply_query(&mut self, query: &str) {
        let query = query.trim();
        if query == self.query {
            return;
        }
        info!(query, "search changed");
        self.query = query.to_string();
        self.refresh_feed(false);
    }

    // -- settings ----------------------------------------------------------------

    pub fn toggle_selected_category(&mut self) {
        if self.view != View::Settings {
            return;
        }
        if let Some(category) = self
            .settings_state
            .selected()
            .and_then(|i| AVAILABLE_CATEGORIES.get(i))
        {
            self.draft.toggle(category);
        }
    }

    pub fn save_settings(&mut self) {
        if self.view != View::Settings {
            return;
        }
        match self.prefs.set_categories(self.draft.clone().into_categories()) {
            Ok(()) => {
                self.status = "Preferences saved".into();
                self.persist_prefs();
            }
            Err(e) => self.status = format!("Not saved: {e}"),
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        let dark = self.prefs.toggle_dark_mode();
        self.status = if dark { "Dark mode on" } else { "Dark mode off" }.into();
        self.persist_prefs();
    }

    // -- persistence -------------------------------------------------------------

    fn persist_prefs(&mut self) {
        if let Err(e) = storage::save(&*self.store, PREFERENCES_KEY, &self.prefs) {
            warn!(error = %e, "failed to save preferences");
            self.status = format!("Could not save preferences: {e}");
        }
    }

    fn persist_favorites(&mut self) {
        if let Err(e) = storage::save(&*self.store, FAVORITES_KEY, &self.favorites) {
            warn!(error = %e, "failed to save favorites");
            self.status = format!("Could not save favorites: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
