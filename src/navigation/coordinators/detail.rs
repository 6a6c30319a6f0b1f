use log::info;

use crate::core::article::Article;
use crate::core::view_model::ArticleDetailViewModel;
use crate::navigation::FlowDependencies;
use crate::navigation::host::NavigationHost;
use crate::navigation::screen::{AppScreen, ArticleDetailScreen};
use crate::navigation::tree::{CoordinatorId, CoordinatorTree, NavigationError};

use super::Coordinator;

/// Detail flow for one article, pushed on top of the list.
pub struct ArticleDetailCoordinator {
    id: CoordinatorId,
    article: Article,
    deps: FlowDependencies,
}

impl ArticleDetailCoordinator {
    pub fn new(id: CoordinatorId, article: Article, deps: FlowDependencies) -> Self {
        Self { id, article, deps }
    }

    pub fn article(&self) -> &Article {
        &self.article
    }
}

impl Coordinator for ArticleDetailCoordinator {
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

        let screen = ArticleDetailScreen::new(
            ArticleDetailViewModel::new(self.article.clone()),
            self.deps.images.clone(),
            self.deps.placeholder.clone(),
        );
        host.push(screen_id, AppScreen::ArticleDetail(screen));
        info!(
            "Started detail flow {} for article {} on {}",
            self.id, self.article.id, screen_id
        );
        Ok(())
    }
}
