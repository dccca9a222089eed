use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    contract::{ErrorResponse, TREE_NOT_FOUND},
    storage::Storage,
    types::{NewTree, TreeId, ValidationError},
};

use super::{models::HealthResponse, AppState};

pub async fn health<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            uptime_secs,
        }),
    )
}

pub async fn list_trees<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    match blocking(&state.storage, |storage| storage.list_trees()).await {
        Ok(trees) => Json(trees).into_response(),
        Err(err) => {
            log::error!("Failed to list trees: {:?}", err);
            internal_error()
        }
    }
}

pub async fn create_tree<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Response {
    let input = match parse_new_tree(&body) {
        Ok(input) => input,
        Err(err) => {
            log::warn!("Rejected tree payload: {}", err);
            return error_response(StatusCode::BAD_REQUEST, err.to_string());
        }
    };

    let row = input.clone();
    match blocking(&state.storage, move |storage| storage.create_tree(&row)).await {
        Ok(tree) => {
            log::info!("🌱 Planted tree {} ({})", tree.id, tree.common_name);
            (StatusCode::CREATED, Json(tree)).into_response()
        }
        Err(err) => {
            log::error!("Failed to create tree {}: {:?}", input.common_name, err);
            internal_error()
        }
    }
}

pub async fn get_tree<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_tree_id(&id) else {
        log::debug!("Unparseable tree id {}", id);
        return error_response(StatusCode::NOT_FOUND, TREE_NOT_FOUND);
    };

    match blocking(&state.storage, move |storage| storage.load_tree(id)).await {
        Ok(Some(tree)) => Json(tree).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, TREE_NOT_FOUND),
        Err(err) => {
            log::error!("Failed to load tree {}: {:?}", id, err);
            internal_error()
        }
    }
}

pub async fn delete_tree<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    // An id that cannot name a row has nothing to delete.
    let Some(id) = parse_tree_id(&id) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match blocking(&state.storage, move |storage| storage.delete_tree(id)).await {
        Ok(removed) => {
            if removed {
                log::info!("🪓 Removed tree {}", id);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => {
            log::error!("Failed to delete tree {}: {:?}", id, err);
            internal_error()
        }
    }
}

pub async fn not_found() -> impl IntoResponse {
    error_response(StatusCode::NOT_FOUND, "endpoint not found")
}

/// Runs one storage call on the blocking pool so SQLite I/O never parks an
/// async worker.
async fn blocking<S, T, F>(storage: &S, call: F) -> anyhow::Result<T>
where
    S: Storage + Clone + Send + 'static,
    T: Send + 'static,
    F: FnOnce(&S) -> anyhow::Result<T> + Send + 'static,
{
    let storage = storage.clone();
    tokio::task::spawn_blocking(move || call(&storage)).await?
}

fn parse_new_tree(body: &[u8]) -> Result<NewTree, ValidationError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ValidationError::NotAnObject)?;
    NewTree::from_json(&value)
}

fn parse_tree_id(raw: &str) -> Option<TreeId> {
    raw.trim().parse::<TreeId>().ok()
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn internal_error() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}
