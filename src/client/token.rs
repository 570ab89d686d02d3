use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{Cache, KeyedLocks, MemoryCache};
use crate::domain::FeedSource;
use crate::errors::{FeedError, FeedResult};

use super::secrets::Secrets;

pub(crate) const TOKEN_PATH: &str = "/auth/oauth2/connect/token";
const GRANT_TYPE: &str = "client_credentials";

/// Cached tokens are expired this long before the provider-reported expiry,
/// so a token handed out is never about to lapse mid-request.
pub const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// OAuth2 client-credentials token cache, one token per source id.
///
/// At most one exchange per source id is in flight at a time; concurrent
/// requesters for an uncached source share the first fetch's result.
pub struct TokenCache {
    scope: String,
    http: reqwest::Client,
    cache: Arc<dyn Cache<String>>,
    locks: KeyedLocks,
}

impl TokenCache {
    pub fn new(scope: impl Into<String>) -> Self {
        Self::with_cache(scope, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(scope: impl Into<String>, cache: Arc<dyn Cache<String>>) -> Self {
        Self {
            scope: scope.into(),
            http: reqwest::Client::new(),
            cache,
            locks: KeyedLocks::new(),
        }
    }

    /// A valid bearer token for the source, exchanged fresh if the cached one
    /// is missing or inside the safety margin of its expiry.
    pub async fn token(&self, source: &FeedSource, secrets: &Secrets) -> FeedResult<String> {
        let key = cache_key(source);

        let lock = self.locks.acquire(&key);
        let _guard = lock.lock().await;

        if let Some(token) = self.cache.get(&key) {
            return Ok(token);
        }

        let response = self.exchange(source, secrets).await?;
        let ttl = Duration::from_secs(
            response
                .expires_in
                .saturating_sub(TOKEN_SAFETY_MARGIN.as_secs()),
        );
        self.cache.set(&key, response.access_token.clone(), ttl);

        Ok(response.access_token)
    }

    async fn exchange(&self, source: &FeedSource, secrets: &Secrets) -> FeedResult<TokenResponse> {
        let url = secrets
            .api_base_uri
            .join(TOKEN_PATH)
            .map_err(|e| FeedError::InvalidUrl(e.to_string()))?;

        let params = [
            ("grant_type", GRANT_TYPE),
            ("scope", self.scope.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
        ];

        let result = async {
            let response = self
                .http
                .post(url)
                .form(&params)
                .send()
                .await?
                .error_for_status()?;

            response.json::<TokenResponse>().await
        }
        .await;

        result.map_err(|e| {
            tracing::error!(source_id = %source.id, error = %e, "token exchange failed");
            FeedError::Auth {
                source_id: source.id.clone(),
                message: e.to_string(),
            }
        })
    }
}

fn cache_key(source: &FeedSource) -> String {
    format!("token:{}", source.id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::cache::MockCache;
    use crate::domain::OutputType;

    const SCOPE: &str = "api FeedEntries.Read.All";

    fn source_for(server: &MockServer) -> FeedSource {
        FeedSource {
            id: "source-1".to_string(),
            title: "Example intranet".to_string(),
            feed_type_id: "intranet-news".to_string(),
            supported_output: OutputType::Rss,
            secrets: HashMap::from([
                ("api_base_uri".to_string(), server.uri()),
                ("client_id".to_string(), "the-client".to_string()),
                ("client_secret".to_string(), "the-secret".to_string()),
            ]),
        }
    }

    fn token_body(token: &str, expires_in: u64) -> serde_json::Value {
        serde_json::json!({ "access_token": token, "expires_in": expires_in })
    }

    #[tokio::test]
    async fn test_second_request_within_ttl_reuses_cached_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=the-client"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server);
        let secrets = Secrets::from_source(&source).unwrap();
        let tokens = TokenCache::new(SCOPE);

        let first = tokens.token(&source, &secrets).await.unwrap();
        let second = tokens.token(&source, &secrets).await.unwrap();

        assert_eq!(first, "tok-1");
        assert_eq!(second, "tok-1");
    }

    #[tokio::test]
    async fn test_token_cached_with_safety_margin_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3600)))
            .mount(&server)
            .await;

        let mut cache = MockCache::new();
        cache.expect_get().return_const(None);
        cache
            .expect_set()
            .withf(|key, token, ttl| {
                key == "token:source-1" && token == "tok-1" && *ttl == Duration::from_secs(3300)
            })
            .times(1)
            .return_const(());

        let source = source_for(&server);
        let secrets = Secrets::from_source(&source).unwrap();
        let tokens = TokenCache::with_cache(SCOPE, Arc::new(cache));

        tokens.token(&source, &secrets).await.unwrap();
    }

    #[tokio::test]
    async fn test_token_inside_safety_margin_is_refetched() {
        let server = MockServer::start().await;
        // expires_in equal to the margin yields a zero TTL, so the second
        // request must hit the endpoint again
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 300)))
            .expect(2)
            .mount(&server)
            .await;

        let source = source_for(&server);
        let secrets = Secrets::from_source(&source).unwrap();
        let tokens = TokenCache::new(SCOPE);

        tokens.token(&source, &secrets).await.unwrap();
        tokens.token(&source, &secrets).await.unwrap();
    }

    #[tokio::test]
    async fn test_exchange_failure_propagates_as_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let source = source_for(&server);
        let secrets = Secrets::from_source(&source).unwrap();
        let tokens = TokenCache::new(SCOPE);

        let err = tokens.token(&source, &secrets).await.unwrap_err();
        assert!(matches!(err, FeedError::Auth { source_id, .. } if source_id == "source-1"));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(token_body("tok-1", 3600))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server);
        let secrets = Secrets::from_source(&source).unwrap();
        let tokens = TokenCache::new(SCOPE);

        let (a, b) = tokio::join!(
            tokens.token(&source, &secrets),
            tokens.token(&source, &secrets)
        );

        assert_eq!(a.unwrap(), "tok-1");
        assert_eq!(b.unwrap(), "tok-1");
    }
}
