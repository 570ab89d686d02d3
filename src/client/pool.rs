use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use url::Url;

use crate::domain::FeedSource;
use crate::errors::{FeedError, FeedResult};

use super::secrets::Secrets;
use super::token::TokenCache;

/// A ready upstream client: bearer-authorized transport bound to one source's
/// base URI.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl ApiClient {
    fn build(base: Url, token: &str) -> FeedResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| FeedError::Malformed("token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base,
            token: token.to_string(),
        })
    }

    /// GET `path` relative to the source base URI and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> FeedResult<T> {
        let url = self
            .base
            .join(path)
            .map_err(|e| FeedError::InvalidUrl(format!("{}: {}", path, e)))?;

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn token(&self) -> &str {
        &self.token
    }
}

/// Per-source cache of ready clients, backed by the token cache.
///
/// A pooled client is reused only while the token it was built with is still
/// the cache-valid token for its source; a refreshed token rebuilds the entry.
pub struct ClientPool {
    tokens: TokenCache,
    clients: Mutex<HashMap<String, ApiClient>>,
}

impl ClientPool {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            tokens: TokenCache::new(scope),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// A ready client for the source. Secret and token failures propagate;
    /// they are the one class of error no degraded result can cover for.
    pub async fn client_for(&self, source: &FeedSource) -> FeedResult<ApiClient> {
        let secrets = Secrets::from_source(source)?;
        let token = self.tokens.token(source, &secrets).await?;

        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = clients.get(&source.id) {
            if client.token() == token {
                return Ok(client.clone());
            }
        }

        let client = ApiClient::build(secrets.api_base_uri.clone(), &token)?;
        clients.insert(source.id.clone(), client.clone());

        Ok(client)
    }
}
