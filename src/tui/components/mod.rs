//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: screen title, active filter and status
//! - `thumbnail`: half-block image lines
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it each
//! frame together with the data to draw:
//! - `ArticleListState` / `ArticleList`
//! - `ArticleDetailState` / `ArticleDetail`
//!
//! ```text
//! components/
//! ├── title_bar.rs       (top bar)
//! ├── article_list.rs    (list screen)
//! ├── article_detail.rs  (detail screen)
//! └── thumbnail.rs       (image to half-block cells)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod article_detail;
pub mod article_list;
pub mod thumbnail;
pub use article_detail::{ArticleDetail, ArticleDetailState, DetailEvent};
pub use article_list::{ArticleList, ArticleListState, ListEvent};
