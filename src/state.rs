use std::{path::PathBuf, sync::Arc};
use tokio::sync::{broadcast, RwLock};

use crate::config::SiteConfig;
use crate::content_loader::{Content, PostStore};

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub config: SiteConfig,
    pub content_dir: PathBuf,
    pub layout_html: RwLock<String>,
    pub home_html: RwLock<Option<String>>,
    pub not_found_html: RwLock<Option<String>>, // supports {{slug}} placeholder
    pub posts: RwLock<PostStore>,
    pub is_development: bool,
}

impl AppState {
    pub fn new(
        config: SiteConfig,
        content_dir: PathBuf,
        content: Content,
        is_development: bool,
    ) -> Self {
        Self {
            config,
            content_dir,
            layout_html: RwLock::new(content.layout_html),
            home_html: RwLock::new(content.home_html),
            not_found_html: RwLock::new(content.not_found_html),
            posts: RwLock::new(content.posts),
            is_development,
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
