//! # TitleBar Component
//!
//! Single-line bar at the top: the visible screen's title, the active filter
//! and a transient status message.
//!
//! Stateless: everything arrives as props, so it renders the same whether the
//! list or a detail screen is on top.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::article::Filter;
use crate::tui::component::Component;

pub struct TitleBar {
    pub screen_title: String,
    pub filter: Filter,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(screen_title: String, filter: Filter, status_message: String) -> Self {
        Self {
            screen_title,
            filter,
            status_message,
        }
    }

    fn text(&self) -> String {
        let base = format!(
            "{} | {} · {}",
            self.screen_title,
            self.filter.endpoint.label(),
            self.filter.period.label()
        );
        if self.status_message.is_empty() {
            base
        } else {
            format!("{} | {}", base, self.status_message)
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}
