//! Typed HTTP client for the tree API.
//!
//! Each call builds its URL from [`crate::contract::api`] and decodes the body
//! according to the shape the contract declares for the returned status.
//! Successful mutations invalidate the cached list and emit a notification;
//! failed mutations emit a destructive notification carrying the error text.

mod cache;
mod notify;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::contract::{api, Endpoint, ErrorResponse, Shape};
use crate::types::{NewTree, Tree, TreeId};

pub use cache::QueryCache;
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier, Variant};

const FETCH_TREES_FAILED: &str = "Failed to fetch trees";
const FETCH_TREE_FAILED: &str = "Failed to fetch tree";
const PLANT_FAILED: &str = "Failed to plant tree";
const REMOVE_FAILED: &str = "Failed to remove tree";

/// Failure of a client call. `Display` yields the text shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server rejected the payload; carries its message.
    #[error("{0}")]
    Validation(String),
    #[error("Tree not found")]
    NotFound,
    /// The request never completed or the body did not match the contract.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a status the operation does not expect.
    #[error("{0}")]
    Unexpected(String),
    #[error("a previous request is still in flight")]
    InFlight,
}

/// Marks a mutation as running until dropped.
struct Pending<'a>(&'a AtomicBool);

impl<'a> Pending<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ClientError> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(ClientError::InFlight);
        }
        Ok(Self(flag))
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct TreesClient {
    http: reqwest::Client,
    base_url: Url,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    creating: AtomicBool,
    deleting: AtomicBool,
}

impl TreesClient {
    pub fn new(base_url: Url, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, cache, notifier)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: Url,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            http,
            base_url,
            cache,
            notifier,
            creating: AtomicBool::new(false),
            deleting: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::Acquire)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::Acquire)
    }

    /// Current tree list, served from the cache when a fresh copy is held.
    pub async fn list_trees(&self) -> Result<Vec<Tree>, ClientError> {
        let key = api::LIST_TREES.path;
        if let Some(trees) = self.cache.read::<Vec<Tree>>(key) {
            log::debug!("Serving {} trees from cache", trees.len());
            return Ok(trees);
        }

        let generation = self.cache.generation(key);
        let res = self.send(&api::LIST_TREES, &[], None, FETCH_TREES_FAILED).await?;
        let status = res.status();
        if !status.is_success() {
            log::warn!("{} answered {}", api::LIST_TREES.name, status);
            return Err(ClientError::Unexpected(FETCH_TREES_FAILED.to_string()));
        }
        let trees: Vec<Tree> =
            decode(res, &api::LIST_TREES, Shape::TreeList, FETCH_TREES_FAILED).await?;
        self.cache.store_if_current(key, generation, &trees);
        Ok(trees)
    }

    /// Fetches one tree. A 404 is a valid answer and yields `None`.
    pub async fn get_tree(&self, id: TreeId) -> Result<Option<Tree>, ClientError> {
        let id = id.to_string();
        let res = self
            .send(&api::GET_TREE, &[("id", id.as_str())], None, FETCH_TREE_FAILED)
            .await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            log::warn!("{} answered {}", api::GET_TREE.name, status);
            return Err(ClientError::Unexpected(FETCH_TREE_FAILED.to_string()));
        }
        let tree = decode(res, &api::GET_TREE, Shape::Tree, FETCH_TREE_FAILED).await?;
        Ok(Some(tree))
    }

    pub async fn create_tree(&self, input: &NewTree) -> Result<Tree, ClientError> {
        let _pending = Pending::acquire(&self.creating)?;

        match self.send_create(input).await {
            Ok(tree) => {
                self.cache.invalidate(api::LIST_TREES.path);
                self.notifier.notify(Notification::success(
                    "Tree Planted 🌱",
                    "Your new tree has been successfully added to the collection.",
                ));
                Ok(tree)
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::failure("Planting Failed", err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn delete_tree(&self, id: TreeId) -> Result<(), ClientError> {
        let _pending = Pending::acquire(&self.deleting)?;

        match self.send_delete(id).await {
            Ok(()) => {
                self.cache.invalidate(api::LIST_TREES.path);
                self.notifier.notify(Notification::success(
                    "Tree Removed",
                    "The tree has been removed from your collection.",
                ));
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::failure("Error", err.to_string()));
                Err(err)
            }
        }
    }

    async fn send_create(&self, input: &NewTree) -> Result<Tree, ClientError> {
        let body = serde_json::to_value(input)
            .map_err(|_| ClientError::Transport(PLANT_FAILED.to_string()))?;
        let res = self
            .send(&api::CREATE_TREE, &[], Some(&body), PLANT_FAILED)
            .await?;
        let status = res.status();
        if status == StatusCode::BAD_REQUEST {
            let error: ErrorResponse =
                decode(res, &api::CREATE_TREE, Shape::Error, PLANT_FAILED).await?;
            return Err(ClientError::Validation(error.message));
        }
        if !status.is_success() {
            log::warn!("{} answered {}", api::CREATE_TREE.name, status);
            return Err(ClientError::Unexpected(PLANT_FAILED.to_string()));
        }
        decode(res, &api::CREATE_TREE, Shape::Tree, PLANT_FAILED).await
    }

    async fn send_delete(&self, id: TreeId) -> Result<(), ClientError> {
        let id = id.to_string();
        let res = self
            .send(&api::DELETE_TREE, &[("id", id.as_str())], None, REMOVE_FAILED)
            .await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if !status.is_success() {
            log::warn!("{} answered {}", api::DELETE_TREE.name, status);
            return Err(ClientError::Unexpected(REMOVE_FAILED.to_string()));
        }
        Ok(())
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
        body: Option<&serde_json::Value>,
        failure: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.base_url.join(&endpoint.url(params)).map_err(|err| {
            log::warn!("Cannot build URL for {}: {}", endpoint.name, err);
            ClientError::Transport(failure.to_string())
        })?;

        let mut request = self.http.request(endpoint.method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|err| {
            log::warn!("{} request failed: {}", endpoint.name, err);
            ClientError::Transport(failure.to_string())
        })
    }
}

/// Decodes a body after checking that the contract declares `expected` for the
/// response status.
async fn decode<T: DeserializeOwned>(
    res: reqwest::Response,
    endpoint: &Endpoint,
    expected: Shape,
    failure: &str,
) -> Result<T, ClientError> {
    let status = res.status();
    if endpoint.shape_for(status) != Some(expected) {
        log::warn!(
            "{} answered {} which does not carry {:?}",
            endpoint.name,
            status,
            expected
        );
        return Err(ClientError::Unexpected(failure.to_string()));
    }
    res.json::<T>().await.map_err(|err| {
        log::warn!("{} returned a malformed body: {}", endpoint.name, err);
        ClientError::Transport(failure.to_string())
    })
}
