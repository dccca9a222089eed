//! Wire contract shared by the REST server and [`crate::client`].
//!
//! Every operation is described once here: its method, its path template and
//! the body shape it answers with for each status code. The router mounts
//! handlers on these paths and the client builds its URLs from them, so the
//! two sides cannot drift apart.

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

/// Body carried by a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    TreeList,
    Tree,
    Error,
    Empty,
}

#[derive(Debug)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub responses: &'static [(StatusCode, Shape)],
}

impl Endpoint {
    /// Declared body shape for `status`, or `None` if the contract does not
    /// know that status for this endpoint.
    pub fn shape_for(&self, status: StatusCode) -> Option<Shape> {
        self.responses
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, shape)| *shape)
    }

    pub fn url(&self, params: &[(&str, &str)]) -> String {
        build_url(self.path, params)
    }
}

pub mod api {
    use super::*;

    pub static LIST_TREES: Endpoint = Endpoint {
        name: "trees.list",
        method: Method::GET,
        path: "/api/trees",
        responses: &[(StatusCode::OK, Shape::TreeList)],
    };

    pub static CREATE_TREE: Endpoint = Endpoint {
        name: "trees.create",
        method: Method::POST,
        path: "/api/trees",
        responses: &[
            (StatusCode::CREATED, Shape::Tree),
            (StatusCode::BAD_REQUEST, Shape::Error),
        ],
    };

    pub static GET_TREE: Endpoint = Endpoint {
        name: "trees.get",
        method: Method::GET,
        path: "/api/trees/:id",
        responses: &[
            (StatusCode::OK, Shape::Tree),
            (StatusCode::NOT_FOUND, Shape::Error),
        ],
    };

    pub static DELETE_TREE: Endpoint = Endpoint {
        name: "trees.delete",
        method: Method::DELETE,
        path: "/api/trees/:id",
        responses: &[(StatusCode::NO_CONTENT, Shape::Empty)],
    };

    pub static ALL: [&Endpoint; 4] = [&LIST_TREES, &CREATE_TREE, &GET_TREE, &DELETE_TREE];
}

/// Single error envelope used by every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub const TREE_NOT_FOUND: &str = "Tree not found";

/// Replaces `:name` segments of a path template with the matching parameter.
/// Segments without a parameter are left untouched.
pub fn build_url(path: &str, params: &[(&str, &str)]) -> String {
    path.split('/')
        .map(|segment| {
            segment
                .strip_prefix(':')
                .and_then(|name| params.iter().find(|(key, _)| *key == name))
                .map(|(_, value)| *value)
                .unwrap_or(segment)
        })
        .collect::<Vec<_>>()
        .join("/")
}
