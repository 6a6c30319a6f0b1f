//! # Flow Coordinators
//!
//! Each coordinator owns one flow: on `start()` it mints its screen token,
//! builds the screen and presents it through the host. Tree membership and
//! teardown are handled by `CoordinatorTree`; coordinators report intent back
//! to their parent as effect values rather than holding a reference to it.

mod detail;
mod list;

pub use detail::ArticleDetailCoordinator;
pub use list::{ArticleListCoordinator, ListFlowEffect};

use super::host::NavigationHost;
use super::screen::AppScreen;
use super::tree::{CoordinatorId, CoordinatorTree, NavigationError};

pub trait Coordinator {
    fn id(&self) -> CoordinatorId;

    /// Presents the flow's screen. Calling it again once started is a no-op.
    fn start(
        &mut self,
        tree: &mut CoordinatorTree,
        host: &mut dyn NavigationHost<AppScreen>,
    ) -> Result<(), NavigationError>;
}
