use std::sync::Arc;

use log::info;

use crate::core::article::Article;
use crate::core::view_model::ArticleListViewModel;
use crate::navigation::FlowDependencies;
use crate::navigation::host::NavigationHost;
use crate::navigation::screen::{AppScreen, ArticleListScreen};
use crate::navigation::tree::{CoordinatorId, CoordinatorTree, NavigationError};

use super::Coordinator;

/// What the list flow asks of its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFlowEffect {
    ShowDetail(Article),
}

/// Browse flow: owns the root list screen.
pub struct ArticleListCoordinator {
    id: CoordinatorId,
    deps: FlowDependencies,
    view_model: Option<Arc<ArticleListViewModel>>,
}

impl ArticleListCoordinator {
    pub fn new(id: CoordinatorId, deps: FlowDependencies) -> Self {
        Self {
            id,
            deps,
            view_model: None,
        }
    }

    pub fn view_model(&self) -> Option<&Arc<ArticleListViewModel>> {
        self.view_model.as_ref()
    }

    /// The list screen reported a selection.
    pub fn did_select(&self, article: Article) -> ListFlowEffect {
        info!("List flow selected article {}", article.id);
        ListFlowEffect::ShowDetail(article)
    }
}

impl Coordinator for ArticleListCoordinator {
    fn id(&self) -> CoordinatorId {
        self.id
    }

    fn start(
        &mut self,
        tree: &mut CoordinatorTree,
        host: &mut dyn NavigationHost<AppScreen>,
    ) -> Result<(), NavigationError> {
        if tree.screen(self.id).is_some() {
            return Ok(());
        }
        let screen_id = tree.assign_screen(self.id)?;

        let view_model = Arc::new(ArticleListViewModel::new(
            self.deps.repository.clone(),
            self.deps.default_filter,
        ));
        self.view_model = Some(view_model.clone());

        let screen = ArticleListScreen::new(
            view_model,
            self.deps.images.clone(),
            self.deps.placeholder.clone(),
        );
        host.set_root(screen_id, AppScreen::ArticleList(screen));
        info!("Started list flow {} on {}", self.id, screen_id);
        Ok(())
    }
}
