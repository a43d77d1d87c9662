use std::{net::SocketAddr, sync::Arc};

use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod content_loader;
mod error;
mod hot_reload;
mod images;
mod markdown;
mod models;
mod pagination;
mod routes;
mod search;
mod slugs;
mod state;
mod views;

use config::{Settings, SiteConfig};
use content_loader::load_content;
use hot_reload::start_content_watcher;
use state::AppState;

async fn run(settings: Settings) -> error::Result<()> {
    let config = SiteConfig::load(&settings.config_path).await?;
    let content = load_content(&settings.content_dir).await?;
    if content.posts.is_empty() {
        warn!("No posts found; the blog will show its empty state");
    }
    info!(
        posts = content.posts.len(),
        site = %config.site_url(),
        "Content loaded from {}",
        settings.content_dir.display()
    );

    let state = Arc::new(AppState::new(
        config,
        settings.content_dir.clone(),
        content,
        settings.is_development,
    ));

    // Hot-reload setup
    let (tx, _rx) = broadcast::channel(1);
    if settings.is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = routes::router(state, tx);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    info!("RUST_ENV is set to development: {}", settings.is_development);

    if let Err(e) = run(settings).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
