//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, turns key presses into
//! navigation calls on the `AppOrchestrator`, and redraws whatever the
//! `BackStack` shows on top.
//!
//! This is the only module that knows about ratatui and crossterm. The
//! navigation tree and view models never see a terminal type.
//!
//! ## Redraw Strategy
//!
//! The loop only draws when something changed:
//!
//! - a terminal event arrived (key, resize, mouse wheel),
//! - the list view model published a new `ViewState` or `Filter`,
//! - the visible detail screen's `ImageSlot` received an image,
//! - a list row's thumbnail slot received an image.
//!
//! Background work reports through `watch` channels, so checking
//! `has_changed()` once per tick is enough. The poll timeout is short while a
//! fetch is running and longer when idle.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use tokio::sync::{mpsc, watch};

use crate::core::article::{Filter, ViewState};
use crate::core::config::ResolvedConfig;
use crate::core::repository::NytArticlesRepository;
use crate::imaging::{HttpImageFetcher, Image, ImageLoader, LoadEvent, MemoryImageCache};
use crate::navigation::{AppScreen, BackStack, FlowDependencies, ScreenId};
use crate::tui::component::EventHandler;
use crate::tui::components::{ArticleDetailState, ArticleListState, DetailEvent, ListEvent};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

pub use ui::App;

/// Grey shown until the real hero image arrives (or if it never does).
const PLACEHOLDER_RGB: [u8; 3] = [64, 64, 64];

/// TUI-specific presentation state (not part of navigation or view models)
pub struct TuiState {
    pub list: ArticleListState,
    pub detail: ArticleDetailState,
    /// The screen the last appearance notification went to.
    pub visible: Option<ScreenId>,
    pub status_message: String,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            list: ArticleListState::new(),
            detail: ArticleDetailState::default(),
            visible: None,
            status_message: String::new(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture)?;
        info!("Terminal modes enabled (mouse)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture);
    }
}

/// Wires the repository and, unless disabled, the image pipeline from a
/// resolved config. Must be called inside a Tokio runtime.
pub fn build_dependencies(config: &ResolvedConfig) -> FlowDependencies {
    let repository = Arc::new(NytArticlesRepository::new(
        config.api_key.clone(),
        Some(config.base_url.clone()),
    ));

    let images = config.images_enabled.then(|| {
        let (tx, mut rx) = mpsc::unbounded_channel::<LoadEvent>();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    LoadEvent::FetchFailed { key, error } | LoadEvent::DecodeFailed { key, error } => {
                        warn!("Image {} failed: {}", key, error)
                    }
                    other => debug!("Image event: {:?}", other),
                }
            }
        });
        Arc::new(
            ImageLoader::new(
                Arc::new(MemoryImageCache::new()),
                Arc::new(HttpImageFetcher::default()),
            )
            .with_events(tx),
        )
    });

    FlowDependencies {
        repository,
        images,
        placeholder: Some(Image::solid(4, 3, PLACEHOLDER_RGB)),
        default_filter: config.default_filter,
    }
}

/// Receivers whose changes should trigger a redraw.
struct Watches {
    state: Option<watch::Receiver<ViewState>>,
    filter: Option<watch::Receiver<Filter>>,
    image: Option<watch::Receiver<Option<Image>>>,
}

impl Watches {
    fn changed(&mut self) -> bool {
        fn take<T>(rx: &mut Option<watch::Receiver<T>>) -> bool {
            match rx {
                Some(rx) if rx.has_changed().unwrap_or(false) => {
                    rx.borrow_and_update();
                    true
                }
                _ => false,
            }
        }
        // Evaluate all three so each one is marked seen.
        let state = take(&mut self.state);
        let filter = take(&mut self.filter);
        let image = take(&mut self.image);
        state || filter || image
    }
}

/// Sends `did_appear` to the top screen when it differs from the last one
/// notified. Returns true if the visible screen changed.
fn notify_appearance(app: &mut App, tui: &mut TuiState, watches: &mut Watches) -> bool {
    let top = app.host().top_id();
    if top == tui.visible {
        return false;
    }
    tui.visible = top;
    watches.image = None;

    match app.host_mut().top_mut() {
        Some(AppScreen::ArticleList(screen)) => {
            debug!("List screen appeared");
            screen.did_appear();
        }
        Some(AppScreen::ArticleDetail(screen)) => {
            debug!("Detail screen appeared: {}", screen.view_model.title());
            tui.detail.reset();
            screen.did_appear();
            watches.image = Some(screen.image.subscribe());
        }
        None => {}
    }
    true
}

/// Points the list's row thumbnails at the rows drawn last frame. Returns
/// true if any row slot changed since the previous call.
fn sync_list_thumbnails(app: &mut App, tui: &TuiState) -> bool {
    match app.host_mut().top_mut() {
        Some(AppScreen::ArticleList(screen)) if screen.thumbnails_enabled() => {
            screen.sync_thumbnails(tui.list.visible.clone());
            screen.thumbnails_changed()
        }
        _ => false,
    }
}

fn handle_list_event(app: &mut App, tui: &mut TuiState, event: ListEvent) {
    let Some(vm) = app.list_coordinator().and_then(|list| list.view_model()).cloned() else {
        return;
    };
    match event {
        ListEvent::Open(index) => {
            let article = match app.host().top() {
                Some(AppScreen::ArticleList(screen)) => screen.article_at(index),
                _ => None,
            };
            let Some(article) = article else {
                return;
            };
            info!("Opening article {} ({})", article.id, article.title);
            if let Err(e) = app.article_selected(article) {
                warn!("Failed to open article: {}", e);
                tui.status_message = format!("Could not open article: {}", e);
            }
        }
        ListEvent::CycleEndpoint => {
            let next = vm.filter().endpoint.next();
            info!("Endpoint -> {:?}", next);
            vm.update_filter(Some(next), None);
        }
        ListEvent::CyclePeriod => {
            let next = vm.filter().period.next();
            info!("Period -> {:?}", next);
            vm.update_filter(None, Some(next));
        }
        ListEvent::Retry => {
            info!("Retrying with {:?}", vm.filter());
            vm.retry();
        }
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::new(BackStack::new(), build_dependencies(&config));
    if let Err(e) = app.start() {
        warn!("Failed to start list flow: {}", e);
        return Err(std::io::Error::other(e.to_string()));
    }
    let mut tui = TuiState::new();

    let (state, filter) = match app.list_coordinator().and_then(|list| list.view_model()) {
        Some(vm) => (Some(vm.subscribe_state()), Some(vm.subscribe_filter())),
        None => (None, None),
    };
    let mut watches = Watches {
        state,
        filter,
        image: None,
    };

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let mut needs_redraw = true; // Force first frame

    loop {
        if notify_appearance(&mut app, &mut tui, &mut watches) {
            needs_redraw = true;
        }
        if watches.changed() {
            needs_redraw = true;
        }
        if sync_list_thumbnails(&mut app, &tui) {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let busy = app
            .list_coordinator()
            .and_then(|list| list.view_model())
            .is_some_and(|vm| vm.state().is_busy());
        let timeout = if busy {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(250)
        };
        let first_event = poll_event_timeout(timeout);

        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
            tui.status_message.clear();
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::Resize => continue,
                TuiEvent::Quit | TuiEvent::ForceQuit => {
                    should_quit = true;
                    break;
                }
                _ => {}
            }

            let on_list = matches!(app.host().top(), Some(AppScreen::ArticleList(_)));
            if on_list {
                if let Some(list_event) = tui.list.handle_event(&event) {
                    handle_list_event(&mut app, &mut tui, list_event);
                }
            } else if let Some(DetailEvent::Back) = tui.detail.handle_event(&event) {
                for done in app.back() {
                    debug!("Back disposed {:?}", done.disposed);
                }
            }

            // Appearance is per event so a quick Enter/Esc pair still
            // notifies each screen in turn.
            notify_appearance(&mut app, &mut tui, &mut watches);
        }

        if should_quit {
            break;
        }
    }

    info!("Newsstand shutting down");
    ratatui::restore();
    Ok(())
}
