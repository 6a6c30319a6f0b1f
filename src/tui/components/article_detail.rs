//! # Article Detail Component
//!
//! Scrollable view of a single article: headline, section tag and date,
//! byline, the hero image (or its placeholder), the abstract and the link.
//!
//! The image comes from the screen's `ImageSlot` snapshot taken each frame,
//! so a load finishing in the background shows up on the next redraw.

use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::view_model::ArticleDetailViewModel;
use crate::imaging::Image;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::thumbnail::thumbnail_lines;
use crate::tui::event::TuiEvent;

const MAX_IMAGE_COLUMNS: u16 = 48;
const MAX_IMAGE_ROWS: u16 = 16;

/// Scroll position for the detail screen. Reset whenever a new detail
/// screen becomes visible.
#[derive(Default)]
pub struct ArticleDetailState {
    pub scroll_state: ScrollViewState,
}

impl ArticleDetailState {
    pub fn reset(&mut self) {
        self.scroll_state.scroll_to_top();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailEvent {
    Back,
}

impl EventHandler for ArticleDetailState {
    type Event = DetailEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<DetailEvent> {
        match event {
            TuiEvent::CursorUp => self.scroll_state.scroll_up(),
            TuiEvent::CursorDown => self.scroll_state.scroll_down(),
            TuiEvent::PageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::PageDown => self.scroll_state.scroll_page_down(),
            TuiEvent::Back => return Some(DetailEvent::Back),
            _ => {}
        }
        None
    }
}

/// Transient render wrapper for the detail screen.
pub struct ArticleDetail<'a> {
    state: &'a mut ArticleDetailState,
    view_model: &'a ArticleDetailViewModel,
    image: Option<Image>,
}

impl<'a> ArticleDetail<'a> {
    pub fn new(
        state: &'a mut ArticleDetailState,
        view_model: &'a ArticleDetailViewModel,
        image: Option<Image>,
    ) -> Self {
        Self {
            state,
            view_model,
            image,
        }
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let vm = self.view_model;
        let mut lines = vec![
            Line::from(Span::styled(
                vm.title().to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled(
                    vm.section_tag(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(vm.formatted_date(), Style::default().fg(Color::DarkGray)),
            ]),
        ];
        if !vm.byline().is_empty() {
            lines.push(Line::from(Span::styled(
                vm.byline().to_string(),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::default());

        if let Some(image) = &self.image {
            lines.extend(thumbnail_lines(
                image,
                width.min(MAX_IMAGE_COLUMNS),
                MAX_IMAGE_ROWS,
            ));
            lines.push(Line::default());
        }

        lines.push(Line::from(vm.abstract_text().to_string()));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            vm.link().to_string(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )));
        lines
    }
}

impl Component for ArticleDetail<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // One column for the scrollbar.
        let content_width = area.width.saturating_sub(1);
        let paragraph = Paragraph::new(self.lines(content_width)).wrap(Wrap { trim: false });
        let height = paragraph.line_count(content_width).min(u16::MAX as usize) as u16;

        let mut scroll_view = ScrollView::new(Size::new(content_width, height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(paragraph, Rect::new(0, 0, content_width, height));
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}
