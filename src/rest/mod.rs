use std::net::SocketAddr;

use axum::{routing::get, Router};

use crate::contract::api;
use crate::storage::Storage;

mod handlers;
mod models;

pub use models::HealthResponse;

use handlers::{create_tree, delete_tree, get_tree, health, list_trees, not_found};

#[derive(Clone)]
pub struct AppState<S: Storage> {
    pub storage: S,
    pub started_at: std::time::SystemTime,
}

/// Builds the application router. Paths come from [`crate::contract::api`];
/// list/create and get/delete share a path template.
pub fn router<S: Storage + Clone + Send + Sync + 'static>(storage: S) -> Router {
    let state = AppState {
        storage,
        started_at: std::time::SystemTime::now(),
    };

    Router::new()
        .route("/health", get(health::<S>))
        .route(
            api::LIST_TREES.path,
            get(list_trees::<S>).post(create_tree::<S>),
        )
        .route(
            api::GET_TREE.path,
            get(get_tree::<S>).delete(delete_tree::<S>),
        )
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve<S: Storage + Clone + Send + Sync + 'static>(
    addr: SocketAddr,
    storage: S,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(listener, storage, shutdown).await
}

/// Serves on an already bound listener, which lets callers pick port 0.
pub async fn serve_on<S: Storage + Clone + Send + Sync + 'static>(
    listener: tokio::net::TcpListener,
    storage: S,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    log::info!("🌐 REST service on http://{}", listener.local_addr()?);

    axum::serve(listener, router(storage))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 REST shutdown requested");
        })
        .await?;
    log::info!("👋 REST server exited");
    Ok(())
}
