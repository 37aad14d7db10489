use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod cache;
mod config;
mod models;
mod routes;
mod schema;
mod services;
mod store;

use cache::LocalCache;
use config::AppConfig;
use services::{LikeService, MatchService};
use store::{PgProfileStore, ProfileStore};

pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub likes: LikeService,
    pub matches: MatchService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ember_shared::middleware::init_tracing("ember-matching");

    let config = AppConfig::load()?;
    let port = config.port;

    let pool = ember_shared::db::create_pool(&config.database_url);
    let store: Arc<dyn ProfileStore> = Arc::new(PgProfileStore::new(pool));
    let cache = Arc::new(LocalCache::new());

    let likes = LikeService::new(store.clone());
    let matches = MatchService::new(store.clone(), cache.clone());

    let state = Arc::new(AppState { store, likes, matches });

    // Sweep expired cache entries so keys that are never read again do
    // not accumulate for the lifetime of the process.
    let sweep_every = Duration::from_secs(config.cache_sweep_secs.max(1));
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(sweep_every);
        loop {
            tick.tick().await;
            let evicted = cache.evict_expired();
            if evicted > 0 {
                tracing::debug!(evicted, remaining = cache.len(), "cache sweep");
            }
        }
    });

    let metrics_handle = ember_shared::middleware::init_metrics();

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(move || async move { metrics_handle.render() }))
        .route("/me", get(routes::profile::get_profile).patch(routes::profile::update_profile))
        .route("/likes", post(routes::likes::send_like))
        .route("/likes/check/:target_id", get(routes::likes::check_like))
        .route("/matches", get(routes::matches::list_matches))
        .route("/candidates", get(routes::candidates::list_candidates))
        .layer(axum::middleware::from_fn(ember_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "ember-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
