use url::Url;

use crate::domain::FeedSource;
use crate::errors::{FeedError, FeedResult};

pub const API_BASE_URI: &str = "api_base_uri";
pub const CLIENT_ID: &str = "client_id";
pub const CLIENT_SECRET: &str = "client_secret";

/// Typed view over the secret map every provider source carries. The
/// surrounding API layer validates these at write time; a missing key here
/// means the source was created outside that path.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub api_base_uri: Url,
    pub client_id: String,
    pub client_secret: String,
}

impl Secrets {
    pub fn from_source(source: &FeedSource) -> FeedResult<Self> {
        let base = required(source, API_BASE_URI)?;
        let api_base_uri =
            Url::parse(&base).map_err(|e| FeedError::InvalidUrl(format!("{}: {}", base, e)))?;

        Ok(Self {
            api_base_uri,
            client_id: required(source, CLIENT_ID)?,
            client_secret: required(source, CLIENT_SECRET)?,
        })
    }

    /// Base URI without a trailing slash, for templating item links.
    pub fn base_str(&self) -> &str {
        self.api_base_uri.as_str().trim_end_matches('/')
    }
}

fn required(source: &FeedSource, key: &str) -> FeedResult<String> {
    source
        .secret(key)
        .map(str::to_string)
        .ok_or_else(|| FeedError::MissingSecret(key.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::OutputType;

    fn source_with(secrets: HashMap<String, String>) -> FeedSource {
        FeedSource {
            id: "source-1".to_string(),
            title: "Example intranet".to_string(),
            feed_type_id: "intranet-news".to_string(),
            supported_output: OutputType::Rss,
            secrets,
        }
    }

    fn full_secrets() -> HashMap<String, String> {
        HashMap::from([
            (API_BASE_URI.to_string(), "https://intranet.example.com".to_string()),
            (CLIENT_ID.to_string(), "id".to_string()),
            (CLIENT_SECRET.to_string(), "secret".to_string()),
        ])
    }

    #[test]
    fn test_parses_complete_secret_map() {
        let secrets = Secrets::from_source(&source_with(full_secrets())).unwrap();
        assert_eq!(secrets.base_str(), "https://intranet.example.com");
        assert_eq!(secrets.client_id, "id");
    }

    #[test]
    fn test_missing_key_is_a_configuration_error() {
        let mut map = full_secrets();
        map.remove(CLIENT_SECRET);

        let err = Secrets::from_source(&source_with(map)).unwrap_err();
        assert!(matches!(err, FeedError::MissingSecret(key) if key == CLIENT_SECRET));
    }

    #[test]
    fn test_unparseable_base_uri_is_rejected() {
        let mut map = full_secrets();
        map.insert(API_BASE_URI.to_string(), "not a uri".to_string());

        let err = Secrets::from_source(&source_with(map)).unwrap_err();
        assert!(matches!(err, FeedError::InvalidUrl(_)));
    }
}
