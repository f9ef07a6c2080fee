//! The dashboard view: one session, one filter set, one task loader.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::TaskService;
use crate::config::Config;
use crate::filters::{FilterField, FilterSet, FilterState};
use crate::loader::{TaskLoader, TaskView};
use crate::session::Session;

pub struct Dashboard {
    api: Arc<dyn TaskService>,
    session: Session,
    filters: FilterState,
    loader: TaskLoader,
}

impl Dashboard {
    /// Create a dashboard and start its task loader.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(api: Arc<dyn TaskService>, config: &Config) -> Self {
        let session = Session::new();
        let filters = FilterState::new();
        let loader = TaskLoader::spawn(
            Arc::clone(&api),
            session.subscribe(),
            filters.subscribe(),
            config.request_timeout,
        );
        Self {
            api,
            session,
            filters,
            loader,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn filters(&self) -> FilterSet {
        self.filters.current()
    }

    /// Sign in with a workspace id. A success triggers a task load.
    pub async fn login(&mut self, workspace_id: &str) -> bool {
        self.session.login(self.api.as_ref(), workspace_id).await
    }

    pub fn set_filter(&self, field: FilterField, value: impl Into<String>) -> bool {
        self.filters.set_field(field, value)
    }

    pub fn reset_filters(&self) -> bool {
        self.filters.reset_all()
    }

    pub fn refresh(&self) {
        self.loader.refresh();
    }

    pub fn view(&self) -> TaskView {
        self.loader.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskView> {
        self.loader.subscribe()
    }

    /// Wait for pending loads to finish, then return the view.
    pub async fn settled_view(&self) -> TaskView {
        self.loader.settle().await;
        self.loader.view()
    }
}
