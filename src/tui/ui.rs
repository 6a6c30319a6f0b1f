use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::article::ViewState;
use crate::navigation::{AppOrchestrator, AppScreen, BackStack};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{ArticleDetail, ArticleList, TitleBar};

pub type App = AppOrchestrator<BackStack<AppScreen>>;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    let list_vm = app.list_coordinator().and_then(|list| list.view_model());
    let filter = list_vm.map(|vm| vm.filter()).unwrap_or_default();
    let view_state = list_vm.map(|vm| vm.state()).unwrap_or_default();

    let screen_title = app
        .host()
        .top()
        .map(|screen| screen.title().to_string())
        .unwrap_or_default();
    let mut title_bar = TitleBar::new(
        screen_title,
        filter,
        status_text(&view_state, &tui.status_message),
    );
    title_bar.render(frame, title_area);

    match app.host().top() {
        Some(AppScreen::ArticleList(screen)) => {
            let lookup = |index: usize| screen.thumbnail_for(index);
            let mut list = ArticleList::new(&mut tui.list, &view_state);
            if screen.thumbnails_enabled() {
                list = list.with_thumbnails(&lookup);
            }
            list.render(frame, main_area);
        }
        Some(AppScreen::ArticleDetail(screen)) => {
            ArticleDetail::new(&mut tui.detail, &screen.view_model, screen.image.current())
                .render(frame, main_area);
        }
        None => {}
    }
}

/// A message set by the event loop wins over the derived list status.
fn status_text(view_state: &ViewState, message: &str) -> String {
    if !message.is_empty() {
        return message.to_string();
    }
    match view_state {
        ViewState::Loading => "Loading...".to_string(),
        ViewState::Success(articles) => format!("{} articles", articles.len()),
        ViewState::Offline => "Offline".to_string(),
        ViewState::Failure(_) => "Error".to_string(),
        ViewState::Idle => String::new(),
    }
}
