//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Rendering only reads state, apart
//! from the list selection that ratatui's stateful widgets need.
//!
//! Layout, top to bottom: view tabs, search box (feed views only), error
//! banner (only when a provider failed), the active list, status bar.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, InputMode, View};
use crate::feed::{FeedKind, FeedStatus};
use crate::prefs::AVAILABLE_CATEGORIES;
use crate::source::{ContentItem, Variant};

/// Colors for one scheme.
struct Theme {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
    highlight: Color,
    error: Color,
}

impl Theme {
    fn for_app(app: &App) -> Self {
        if app.prefs.dark_mode {
            Theme {
                bg: Color::Black,
                fg: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                highlight: Color::DarkGray,
                error: Color::LightRed,
            }
        } else {
            Theme {
                bg: Color::Reset,
                fg: Color::Reset,
                dim: Color::Gray,
                accent: Color::Blue,
                highlight: Color::LightBlue,
                error: Color::Red,
            }
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    fn badge(&self, variant: Variant) -> Span<'static> {
        let color = match variant {
            Variant::News => Color::Yellow,
            Variant::Movie => Color::Magenta,
            Variant::Social => Color::Green,
        };
        Span::styled(
            format!("{:<7}", variant.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
    }
}

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let theme = Theme::for_app(app);
    frame.render_widget(Block::default().style(theme.base()), frame.area());

    let feed_view = matches!(app.view, View::Feed | View::Trending);
    let banner_height = if feed_view && !app.feed.errors().is_empty() {
        app.feed.errors().len() as u16 + 2
    } else {
        0
    };

    let [tabs_area, search_area, banner_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(if feed_view { 3 } else { 0 }),
        Constraint::Length(banner_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_tabs(app, &theme, frame, tabs_area);
    if feed_view {
        draw_search(app, &theme, frame, search_area);
    }
    if banner_height > 0 {
        draw_error_banner(app, &theme, frame, banner_area);
    }
    match app.view {
        View::Feed | View::Trending => draw_feed_list(app, &theme, frame, main_area),
        View::Favorites => draw_favorites(app, &theme, frame, main_area),
        View::Settings => draw_settings(app, &theme, frame, main_area),
    }
    draw_status_bar(app, &theme, frame, status_area);
}

fn draw_tabs(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
        .collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(theme.dim))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn draw_search(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Search;
    let (text, style) = if app.search_input.is_empty() && !editing {
        ("Search content… (/)".to_string(), Style::default().fg(theme.dim))
    } else {
        (app.search_input.clone(), Style::default().fg(theme.fg))
    };
    let border = if editing { theme.accent } else { theme.dim };
    let mut spans = vec![Span::raw("🔍 "), Span::styled(text, style)];
    if app.search_pending() {
        spans.push(Span::styled("  …", Style::default().fg(theme.dim)));
    }
    let search = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(search, area);
    if editing {
        let x = area.x + 4 + app.search_input.chars().count() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Non-blocking banner naming each failed provider.
fn draw_error_banner(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = app
        .feed
        .errors()
        .iter()
        .map(|e| Line::from(Span::styled(e.to_string(), Style::default().fg(theme.error))))
        .collect();
    let banner = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(" Some sources failed — r: retry ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error)),
    );
    frame.render_widget(banner, area);
}

fn feed_item(app: &App, theme: &Theme, item: &ContentItem) -> ListItem<'static> {
    let star = if app.favorites.contains(item) { "★ " } else { "  " };
    let headline = Line::from(vec![
        theme.badge(item.variant()),
        Span::raw(" "),
        Span::styled(star, Style::default().fg(Color::Yellow)),
        Span::styled(
            item.title().to_string(),
            Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", item.action_label()),
            Style::default().fg(theme.accent),
        ),
    ]);
    let detail = Line::from(vec![
        Span::raw("          "),
        Span::styled(item.byline(), Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled(
            truncate(item.description(), 90),
            Style::default().fg(theme.dim),
        ),
    ]);
    ListItem::new(Text::from(vec![headline, detail]))
}

/// Render the scrollable feed.
fn draw_feed_list(app: &mut App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let trending = app.feed.signature().map(|s| s.kind) == Some(FeedKind::Trending);
    let title = if trending {
        " Trending Content "
    } else {
        " Personalized Feed "
    };
    let mut block = Block::default().title(title).borders(Borders::ALL);

    match app.feed.status() {
        FeedStatus::Loading if app.feed.items().is_empty() => {
            let msg = Paragraph::new("Loading…")
                .style(Style::default().fg(theme.dim))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }
        FeedStatus::Empty => {
            let text = if trending {
                "No trending content found for your search query."
            } else {
                "No content found for your preferences or search query."
            };
            let msg = Paragraph::new(text)
                .style(Style::default().fg(theme.dim))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }
        FeedStatus::Exhausted => {
            let end = if trending {
                " You've reached the end of trending content. "
            } else {
                " You've reached the end of the feed. "
            };
            block = block.title_bottom(Line::from(end).centered());
        }
        FeedStatus::Loading | FeedStatus::More => {
            if app.feed.is_loading() {
                block = block.title_bottom(Line::from(" Loading more… ").centered());
            }
        }
    }

    let list_items: Vec<ListItem> = {
        let app: &App = app;
        app.feed
            .items()
            .iter()
            .map(|item| feed_item(app, theme, item))
            .collect()
    };

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(theme.highlight),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_favorites(app: &mut App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Your Favorites ").borders(Borders::ALL);
    if app.favorites.is_empty() {
        let msg = Paragraph::new("You haven't added any favorites yet.")
            .style(Style::default().fg(theme.dim))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let list_items: Vec<ListItem> = app
        .favorites
        .list()
        .iter()
        .map(|fav| {
            let mut spans = vec![
                theme.badge(fav.variant),
                Span::raw(" "),
                Span::styled(fav.title.clone(), Style::default().fg(theme.fg)),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", fav.action_label()),
                    Style::default().fg(theme.accent),
                ),
            ];
            if let Some(url) = &fav.url {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(url.clone(), Style::default().fg(theme.dim)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(theme.highlight),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, area, &mut app.favorites_state);
}

fn draw_settings(app: &mut App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let [list_area, info_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let list_items: Vec<ListItem> = AVAILABLE_CATEGORIES
        .iter()
        .map(|category| {
            let mark = if app.draft.is_selected(category) { "[x]" } else { "[ ]" };
            ListItem::new(Line::from(format!("{mark} {category}")))
        })
        .collect();
    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" Content Preferences ")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().bg(theme.highlight))
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, list_area, &mut app.settings_state);

    let scheme = if app.prefs.dark_mode { "dark" } else { "light" };
    let info = Paragraph::new(Line::from(vec![
        Span::raw(" Theme: "),
        Span::styled(scheme, Style::default().fg(theme.accent)),
        Span::raw("   space: toggle category  s: save  d: dark mode"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(info, info_area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, theme: &Theme, frame: &mut Frame, area: Rect) {
    let count = match app.view {
        View::Favorites => format!("{} favorites", app.favorites.len()),
        _ => format!("{} items", app.feed.items().len()),
    };
    let help = match (app.input_mode, app.view) {
        (InputMode::Search, _) => "  enter: search  esc: cancel",
        (_, View::Feed) => "  q: quit  ↑/↓: scroll  f: favorite  J/K: move  o: open  /: search",
        (_, View::Trending) => "  q: quit  ↑/↓: scroll  f: favorite  o: open  /: search",
        (_, View::Favorites) => "  q: quit  ↑/↓: scroll  x: remove  o: open",
        (_, View::Settings) => "  q: quit  ↑/↓: move  tab: next view",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(count, Style::default().fg(Color::Green)),
        Span::styled(help, Style::default().fg(theme.dim)),
    ]));
    frame.render_widget(status, area);
}

fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        single_line
    } else {
        let cut: String = single_line.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Tests (smoke tests against ratatui's TestBackend)
// ---------------------------------------------------------------------------
