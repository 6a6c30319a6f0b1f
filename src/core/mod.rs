//! # Core Application Logic
//!
//! Articles, where they come from, and the view models that publish them.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Article, Filter      │
//!                    │  • ArticleRepository    │
//!                    │  • View models          │
//!                    │  • Config               │
//!                    └───────────┬─────────────┘
//!                                │ watch::Receiver<ViewState>
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │ navigation │      │    TUI     │      │   tests    │
//!     │   flows    │      │ (ratatui)  │      │  (fakes)   │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`article`]: `Article`, `Filter` and the `ViewState` union
//! - [`repository`]: the fetch contract and the NYT Most Popular client
//! - [`view_model`]: list and detail view models
//! - [`config`]: `~/.newsstand/config.toml` loading and resolution

pub mod article;
pub mod config;
pub mod repository;
pub mod view_model;
