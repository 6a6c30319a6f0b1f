//! # Navigation Orchestration
//!
//! Presentation flow lives here, independent of any view technology.
//!
//! ```text
//! AppOrchestrator (root coordinator, owns no screen)
//! ├── ArticleListCoordinator      ──► list screen   (stack root)
//! ├── ArticleDetailCoordinator    ──► detail screen (pushed)
//! └── ...                             one per open detail
//!
//! NavigationHost ── NavigationEvent ──► CoordinatorTree::reconcile()
//!                                        └─► finish() on the owner of the
//!                                            screen that left the stack
//! ```
//!
//! ## Modules
//!
//! - [`host`]: the back-stack primitive and its transition events
//! - [`tree`]: the coordinator arena and the reconciliation algorithm
//! - [`coordinators`]: list and detail flows
//! - [`screen`]: what the flows present
//! - [`orchestrator`]: the root coordinator wiring it all together

pub mod coordinators;
pub mod host;
pub mod orchestrator;
pub mod screen;
pub mod tree;

use std::sync::Arc;

use crate::core::article::Filter;
use crate::core::repository::ArticleRepository;
use crate::imaging::{Image, ImageLoader};

pub use coordinators::{ArticleDetailCoordinator, ArticleListCoordinator, Coordinator, ListFlowEffect};
pub use host::{BackStack, Direction, NavigationEvent, NavigationHost, ScreenId};
pub use orchestrator::AppOrchestrator;
pub use screen::{AppScreen, ArticleDetailScreen, ArticleListScreen};
pub use tree::{CoordinatorId, CoordinatorTree, Finished, NavigationError};

/// Everything a flow needs, injected at construction.
#[derive(Clone)]
pub struct FlowDependencies {
    pub repository: Arc<dyn ArticleRepository>,
    /// `None` disables image loading.
    pub images: Option<Arc<ImageLoader>>,
    pub placeholder: Option<Image>,
    pub default_filter: Filter,
}
