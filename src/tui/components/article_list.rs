//! # Article List Component
//!
//! Renders the list screen for whatever `ViewState` the view model currently
//! publishes: a loading line, the article rows, or an empty state with a
//! retry hint. With images enabled each row is two lines tall and starts
//! with a small thumbnail.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ArticleListState` lives in `TuiState` and survives across frames
//! - `ArticleList` is created each frame with borrowed state and the snapshot

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::article::{Article, ViewState};
use crate::imaging::Image;
use crate::tui::components::thumbnail::thumbnail_lines;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const PAGE: usize = 10;
const THUMBNAIL_COLUMNS: u16 = 4;
const THUMBNAIL_ROWS: u16 = 2;

/// Selection state for the list screen.
#[derive(Default)]
pub struct ArticleListState {
    pub selected: usize,
    pub list_state: ListState,
    /// Row count seen on the last render, used to clamp the cursor.
    pub row_count: usize,
    /// Article indices on screen after the last render.
    pub visible: Range<usize>,
}

impl ArticleListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the cursor inside `len` rows. Called whenever a fresh result
    /// arrives so a shorter list never leaves the selection dangling.
    pub fn sync_len(&mut self, len: usize) {
        self.row_count = len;
        if len == 0 {
            self.selected = 0;
            self.visible = 0..0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    fn move_by(&mut self, delta: isize) {
        if self.row_count == 0 {
            return;
        }
        let last = self.row_count - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
        self.list_state.select(Some(self.selected));
    }
}

/// Events emitted by the list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    Open(usize),
    CycleEndpoint,
    CyclePeriod,
    Retry,
}

impl EventHandler for ArticleListState {
    type Event = ListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ListEvent> {
        match event {
            TuiEvent::CursorUp => {
                self.move_by(-1);
                None
            }
            TuiEvent::CursorDown => {
                self.move_by(1);
                None
            }
            TuiEvent::PageUp => {
                self.move_by(-(PAGE as isize));
                None
            }
            TuiEvent::PageDown => {
                self.move_by(PAGE as isize);
                None
            }
            TuiEvent::Open if self.row_count > 0 => Some(ListEvent::Open(self.selected)),
            TuiEvent::CycleEndpoint => Some(ListEvent::CycleEndpoint),
            TuiEvent::CyclePeriod => Some(ListEvent::CyclePeriod),
            TuiEvent::Retry => Some(ListEvent::Retry),
            _ => None,
        }
    }
}

/// Transient render wrapper for the list screen.
pub struct ArticleList<'a> {
    state: &'a mut ArticleListState,
    view_state: &'a ViewState,
    thumbnails: Option<&'a dyn Fn(usize) -> Option<Image>>,
}

impl<'a> ArticleList<'a> {
    pub fn new(state: &'a mut ArticleListState, view_state: &'a ViewState) -> Self {
        Self {
            state,
            view_state,
            thumbnails: None,
        }
    }

    /// Adds a thumbnail column; `lookup` returns the image for an article index.
    pub fn with_thumbnails(mut self, lookup: &'a dyn Fn(usize) -> Option<Image>) -> Self {
        self.thumbnails = Some(lookup);
        self
    }

    fn block(help: &str) -> Block<'_> {
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title_bottom(Line::from(help).centered())
            .padding(Padding::horizontal(1))
    }

    fn render_message(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Self::block(" r Retry  e Endpoint  p Period  q Quit "));
        frame.render_widget(paragraph, area);
    }

    fn render_articles(&mut self, frame: &mut Frame, area: Rect, articles: &[Article]) {
        self.state.sync_len(articles.len());
        if articles.is_empty() {
            Self::render_message(
                frame,
                area,
                vec![Line::from(Span::styled(
                    "No articles for this filter.",
                    Style::default().fg(Color::DarkGray),
                ))],
            );
            return;
        }

        let block = Self::block(" Enter Open  e Endpoint  p Period  q Quit ");
        let inner = block.inner(area);
        let thumb_width = if self.thumbnails.is_some() {
            THUMBNAIL_COLUMNS as usize + 1
        } else {
            0
        };
        let items: Vec<ListItem> = articles
            .iter()
            .enumerate()
            .map(|(i, article)| {
                let style = if i == self.state.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let text_width = (inner.width as usize).saturating_sub(thumb_width);
                let section = format!("{:<10}", truncate_to_width(&article.section, 10));
                let title_width = text_width.saturating_sub(section.width() + 2);
                let headline = vec![
                    Span::styled(section, style.fg(Color::Cyan)),
                    Span::styled("  ", style),
                    Span::styled(truncate_to_width(&article.title, title_width), style),
                ];

                let Some(lookup) = self.thumbnails else {
                    return ListItem::new(Line::from(headline));
                };
                let byline = format!("{} · {}", article.byline, article.published_date);
                let details = vec![Span::styled(
                    truncate_to_width(byline.trim_start_matches(" · "), text_width),
                    Style::default().fg(Color::DarkGray),
                )];
                let mut cells = lookup(i)
                    .map(|image| thumbnail_lines(&image, THUMBNAIL_COLUMNS, THUMBNAIL_ROWS))
                    .unwrap_or_default()
                    .into_iter();
                let lines: Vec<Line> = [headline, details]
                    .into_iter()
                    .map(|text| {
                        let mut spans = thumbnail_cell(cells.next());
                        spans.extend(text);
                        Line::from(spans)
                    })
                    .collect();
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);

        let row_height = if self.thumbnails.is_some() {
            THUMBNAIL_ROWS as usize
        } else {
            1
        };
        let first = self.state.list_state.offset().min(articles.len());
        let shown = inner.height as usize / row_height;
        self.state.visible = first..(first + shown).min(articles.len());
    }
}

/// One line of a thumbnail padded to the column width, plus a gap.
fn thumbnail_cell(line: Option<Line<'static>>) -> Vec<Span<'static>> {
    let mut spans = line.map(|line| line.spans).unwrap_or_default();
    let used: usize = spans.iter().map(|span| span.content.width()).sum();
    let pad = (THUMBNAIL_COLUMNS as usize).saturating_sub(used) + 1;
    spans.push(Span::raw(" ".repeat(pad)));
    spans
}

impl Component for ArticleList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self.view_state {
            ViewState::Idle | ViewState::Loading => {
                self.state.sync_len(0);
                Self::render_message(
                    frame,
                    area,
                    vec![Line::from(Span::styled(
                        "Loading articles...",
                        Style::default().fg(Color::Yellow),
                    ))],
                );
            }
            ViewState::Success(articles) => self.render_articles(frame, area, articles),
            ViewState::Offline => {
                self.state.sync_len(0);
                Self::render_message(
                    frame,
                    area,
                    vec![
                        Line::from(Span::styled(
                            "You appear to be offline.",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        )),
                        Line::from("Check your connection and press r to retry."),
                    ],
                );
            }
            ViewState::Failure(message) => {
                self.state.sync_len(0);
                Self::render_message(
                    frame,
                    area,
                    vec![
                        Line::from(Span::styled(
                            "Could not load articles.",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        )),
                        Line::from(message.clone()),
                        Line::from("Press r to retry."),
                    ],
                );
            }
        }
    }
}

/// Truncate `s` to at most `max_width` display columns, ending with "…" when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
