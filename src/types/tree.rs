use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TreeId = i64;

/// A catalogued tree as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub id: TreeId,
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub location: String,
    /// Height in meters.
    pub height: Option<f64>,
    pub description: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}
