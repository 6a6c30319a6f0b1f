//! # App Orchestrator
//!
//! The root of the coordinator tree. It starts the list flow, opens a detail
//! flow per selected article, and is the host delegate: every back-stack
//! transition is reconciled against the tree, one event at a time.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::core::article::Article;

use super::FlowDependencies;
use super::coordinators::{
    ArticleDetailCoordinator, ArticleListCoordinator, Coordinator, ListFlowEffect,
};
use super::host::NavigationHost;
use super::screen::AppScreen;
use super::tree::{CoordinatorId, CoordinatorTree, Finished, NavigationError};

enum Flow {
    List(ArticleListCoordinator),
    Detail(ArticleDetailCoordinator),
}

pub struct AppOrchestrator<H: NavigationHost<AppScreen>> {
    tree: CoordinatorTree,
    root: CoordinatorId,
    host: H,
    deps: FlowDependencies,
    flows: HashMap<CoordinatorId, Flow>,
    list: Option<CoordinatorId>,
}

impl<H: NavigationHost<AppScreen>> AppOrchestrator<H> {
    pub fn new(host: H, deps: FlowDependencies) -> Self {
        let mut tree = CoordinatorTree::new();
        let root = tree.insert("app");
        Self {
            tree,
            root,
            host,
            deps,
            flows: HashMap::new(),
            list: None,
        }
    }

    pub fn root(&self) -> CoordinatorId {
        self.root
    }

    pub fn tree(&self) -> &CoordinatorTree {
        &self.tree
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The root's children, in the order they were started.
    pub fn children(&self) -> &[CoordinatorId] {
        self.tree.children(self.root)
    }

    pub fn list_coordinator(&self) -> Option<&ArticleListCoordinator> {
        match self.list.and_then(|id| self.flows.get(&id)) {
            Some(Flow::List(list)) => Some(list),
            _ => None,
        }
    }

    /// The article a detail flow was started with.
    pub fn detail_article(&self, id: CoordinatorId) -> Option<&Article> {
        match self.flows.get(&id) {
            Some(Flow::Detail(detail)) => Some(detail.article()),
            _ => None,
        }
    }

    /// Starts the list flow as the single initial child. Idempotent.
    pub fn start(&mut self) -> Result<(), NavigationError> {
        if self.list.is_some() {
            return Ok(());
        }
        let id = self.tree.insert("article-list");
        let list = ArticleListCoordinator::new(id, self.deps.clone());
        self.launch(Flow::List(list))?;
        self.list = Some(id);
        self.process_navigation_events();
        Ok(())
    }

    /// The list screen reported a selection.
    pub fn article_selected(
        &mut self,
        article: Article,
    ) -> Result<Option<CoordinatorId>, NavigationError> {
        let Some(list) = self.list_coordinator() else {
            warn!("Article {} selected with no list flow running", article.id);
            return Ok(None);
        };
        match list.did_select(article) {
            ListFlowEffect::ShowDetail(article) => self.show_detail(article).map(Some),
        }
    }

    fn show_detail(&mut self, article: Article) -> Result<CoordinatorId, NavigationError> {
        let id = self.tree.insert("article-detail");
        let detail = ArticleDetailCoordinator::new(id, article, self.deps.clone());
        self.launch(Flow::Detail(detail))?;
        self.process_navigation_events();
        Ok(id)
    }

    /// Adds the flow under the root and starts it. A flow that cannot be
    /// attached is disposed, and one that fails to start is finished again,
    /// so the tree never keeps a half-started child.
    fn launch(&mut self, mut flow: Flow) -> Result<(), NavigationError> {
        let id = match &flow {
            Flow::List(c) => c.id(),
            Flow::Detail(c) => c.id(),
        };
        if let Err(e) = self.tree.add_child(self.root, id) {
            warn!("Failed to attach {}: {}", id, e);
            self.tree.dispose(id);
            return Err(e);
        }

        let started = match &mut flow {
            Flow::List(c) => c.start(&mut self.tree, &mut self.host),
            Flow::Detail(c) => c.start(&mut self.tree, &mut self.host),
        };
        if let Err(e) = started {
            warn!("Failed to start {}: {}", id, e);
            self.tree.finish(id);
            return Err(e);
        }

        self.flows.insert(id, flow);
        Ok(())
    }

    /// Parent hook: `child` is done, drop it and everything it started.
    /// Ids that are not children of the root are ignored.
    pub fn child_did_finish(&mut self, child: CoordinatorId) {
        let disposed = self.tree.child_did_finish(self.root, child);
        self.forget(&disposed);
    }

    /// Explicitly ends a flow. The screen it presented is not popped.
    pub fn finish(&mut self, id: CoordinatorId) -> Option<Finished> {
        let finished = self.tree.finish(id)?;
        self.forget(&finished.disposed);
        Some(finished)
    }

    fn forget(&mut self, disposed: &[CoordinatorId]) {
        for id in disposed {
            self.flows.remove(id);
            if self.list == Some(*id) {
                self.list = None;
            }
        }
    }

    /// Reconciles every queued host transition, strictly in order.
    pub fn process_navigation_events(&mut self) -> Vec<Finished> {
        let mut finished = Vec::new();
        while let Some(event) = self.host.next_event() {
            debug!("Reconciling {:?}", event);
            if let Some(done) = self.tree.reconcile(&event, self.root) {
                self.forget(&done.disposed);
                finished.push(done);
            }
        }
        finished
    }

    /// System back: pops the host without telling any coordinator, then lets
    /// reconciliation tear down whichever flow lost its screen.
    pub fn back(&mut self) -> Vec<Finished> {
        if self.host.pop().is_none() {
            return Vec::new();
        }
        let finished = self.process_navigation_events();
        for done in &finished {
            info!("Back navigation finished {}", done.coordinator);
        }
        finished
    }
}
