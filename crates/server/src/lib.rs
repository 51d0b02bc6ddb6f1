//! Bakery management server.
//!
//! HTTP API over a hosted data store: business records with tag-invalidated
//! cached reads, behind a session cookie route guard with profile roles.

pub mod cache;
pub mod clients;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cache::{spawn_invalidation_worker, MemoryViewCache, RedisViewCache, ViewCache};
use crate::clients::{IdentityClient, RemoteHttp, StoreClient};
use crate::config::ServerConfig;
use crate::routes::create_router;
use crate::services::{ProfileStore, RecordManager};
use crate::state::AppState;

/// Run the HTTP server with the given configuration.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Remote store clients share one connection pool
    let remote = RemoteHttp::new(&config.remote)?;
    let store = Arc::new(StoreClient::new(remote.clone()));
    let identity = Arc::new(IdentityClient::new(remote));

    // View cache
    let views: Arc<dyn ViewCache> = if config.cache.url.is_empty() {
        warn!("REDIS_URL is empty, using in-process view cache");
        Arc::new(MemoryViewCache::new())
    } else {
        Arc::new(RedisViewCache::connect(&config.cache.url, config.cache.default_ttl_seconds).await?)
    };
    let (invalidator, _worker) = spawn_invalidation_worker(views.clone());

    let addr: SocketAddr = config.service.addr().parse()?;

    // Create app state
    let state = AppState::new(
        config,
        identity,
        Arc::new(ProfileStore::new(store.clone())),
        Arc::new(RecordManager::new(store)),
        views,
        Arc::new(invalidator),
    );

    // Build router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    info!("Bakery server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
