use std::path::Path;

use serde::Deserialize;

use crate::domain::{Feed, FeedSource};
use crate::errors::{FeedError, FeedResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: String,
}

impl Config {
    pub fn from_env() -> FeedResult<Self> {
        dotenvy::dotenv().ok();

        let store_path = std::env::var("FEEDS_STORE")
            .map_err(|_| FeedError::MissingEnvVar("FEEDS_STORE".to_string()))?;

        Ok(Self { store_path })
    }
}

/// On-disk stand-in for the CRUD layer that owns sources and feeds: a JSON
/// document listing both, read-only from this side.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FeedStore {
    #[serde(default)]
    pub sources: Vec<FeedSource>,
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

impl FeedStore {
    pub fn load<P: AsRef<Path>>(path: P) -> FeedResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn source(&self, id: &str) -> Option<&FeedSource> {
        self.sources.iter().find(|source| source.id == id)
    }

    pub fn feed(&self, id: &str) -> Option<&Feed> {
        self.feeds.iter().find(|feed| feed.id == id)
    }
}
