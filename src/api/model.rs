use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A community server as returned by the backend.
///
/// Only the fields the UI displays are modelled; anything else in the
/// response is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    pub name: String,
    pub image_url: String,
    #[serde(default)]
    pub invite_code: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Server {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: image_url.into(),
            invite_code: None,
            profile_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Body of the update request: `{ "name": ..., "imageUrl": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUpdate {
    pub name: String,
    pub image_url: String,
}
