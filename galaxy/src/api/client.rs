use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::auth::TokenSource;
use super::common::{ApiQueryParams, Page};
use super::error::ApiError;
use super::pool::ConnectionPoolConfig;

/// Prefix of every public API path
const API_PREFIX: &str = "/public/api/v1/";
const TOKEN_PATH: &str = "/oauth/v2/token";

/// Galaxy API client
///
/// Cheap to clone; all clones share the HTTP pool and the token cache.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    api_base: Url,
    tokens: TokenSource,
    config: ClientConfig,
}

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
        }
    }
}

impl RetryConfig {
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(
            self.initial_backoff_ms
                .saturating_mul(factor)
                .min(self.max_backoff_ms),
        )
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
    pub page_size: u32,
    /// Tokens are refreshed this long before they expire
    pub token_safety_margin: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            page_size: 100,
            token_safety_margin: Duration::from_secs(60),
        }
    }
}

/// Turns `acme.galaxy.starburst.io` or `https://acme.galaxy.starburst.io/`
/// into an origin URL. Bare hosts are treated as https.
pub fn origin_url(domain: &str) -> Result<Url, ApiError> {
    let domain = domain.trim().trim_end_matches('/');
    if domain.is_empty() {
        return Err(ApiError::InvalidUrl("domain is empty".to_string()));
    }
    let with_scheme = if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    };
    let url =
        Url::parse(&with_scheme).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", domain, e)))?;
    if url.host_str().is_none() {
        return Err(ApiError::InvalidUrl(format!("{}: missing host", domain)));
    }
    Ok(url)
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(domain: &str, client_id: &str, client_secret: &str) -> Result<Self, ApiError> {
        Self::with_config(domain, client_id, client_secret, ClientConfig::default())
    }

    pub fn with_config(
        domain: &str,
        client_id: &str,
        client_secret: &str,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        let origin = origin_url(domain)?;
        let api_base = origin
            .join(API_PREFIX)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let token_url = origin
            .join(TOKEN_PATH)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let pool_config = ConnectionPoolConfig {
            request_timeout: config.request_timeout,
            connection_timeout: config.connect_timeout,
            ..Default::default()
        };
        let http_client = pool_config.build_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                api_base,
                tokens: TokenSource::new(
                    token_url,
                    client_id,
                    client_secret,
                    config.token_safety_margin,
                ),
                config,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Generic CRUD for one entity kind
    pub fn entities(&self, kind: super::EntityKind) -> super::EntityApi<'_> {
        super::EntityApi::new(self, kind)
    }

    /// Role grant operations
    pub fn roles(&self) -> super::roles::RolesApi<'_> {
        super::roles::RolesApi::new(self)
    }

    /// Service account password operations
    pub fn service_accounts(&self) -> super::service_accounts::ServiceAccountsApi<'_> {
        super::service_accounts::ServiceAccountsApi::new(self)
    }

    /// Catalog connectivity probes
    pub fn catalogs(&self) -> super::catalogs::CatalogsApi<'_> {
        super::catalogs::CatalogsApi::new(self)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.send(Method::GET, path, None).await?;
        decode(&Method::GET, path, value)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self.send(Method::POST, path, Some(encode(path, body)?)).await?;
        decode(&Method::POST, path, value)
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self
            .send(Method::PATCH, path, Some(encode(path, body)?))
            .await?;
        decode(&Method::PATCH, path, value)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self.send(Method::PUT, path, Some(encode(path, body)?)).await?;
        decode(&Method::PUT, path, value)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }

    /// Follows `nextPageToken` until exhausted, concatenating `result` in order
    pub async fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let query = ApiQueryParams::new()
                .add("pageSize", self.inner.config.page_size)
                .add_optional("pageToken", token.as_deref());
            let page_path = format!("{}{}", path, query.to_query_string());

            let page: Page<T> = self.get(&page_path).await?;
            let next = page.next_token().map(str::to_string);
            items.extend(page.result);

            match next {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::debug!(path, count = items.len(), "collected paginated results");
        Ok(items)
    }

    /// Single request with authentication, refresh-on-401 and retries.
    ///
    /// Only idempotent verbs (GET, PUT, DELETE) are retried on 429 and 5xx.
    /// A 401 invalidates the token and replays the request exactly once,
    /// whatever the verb. Network errors are never retried.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self
            .inner
            .api_base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))?;
        let retry = &self.inner.config.retry;
        let max_retries = if is_idempotent(&method) {
            retry.max_retries
        } else {
            0
        };

        let mut attempt = 0;
        let mut reauthenticated = false;

        loop {
            let token = self.inner.tokens.token(&self.inner.http_client).await?;

            tracing::debug!(method = %method, path, attempt, "galaxy request");
            let mut request = self
                .inner
                .http_client
                .request(method.clone(), url.clone())
                .bearer_auth(&token);
            if let Some(body) = &body {
                request = request.json(body);
            }
            let response = request.send().await?;
            let status = response.status();
            tracing::debug!(method = %method, path, status = status.as_u16(), "galaxy response");

            if status.is_success() {
                return self.parse_success_response(&method, path, response).await;
            }

            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                tracing::debug!(path, "access token rejected, refreshing");
                self.inner.tokens.invalidate(&token).await;
                reauthenticated = true;
                continue;
            }

            if is_transient(status) && attempt < max_retries {
                attempt += 1;
                let backoff = retry.backoff(attempt);
                tracing::warn!(
                    method = %method,
                    path,
                    status = status.as_u16(),
                    attempt,
                    "transient failure, retrying after {}ms",
                    backoff.as_millis()
                );
                tokio::time::sleep(backoff).await;
                continue;
            }

            return Err(self.handle_error_response(&method, path, response).await);
        }
    }

    /// Empty bodies (204 and friends) decode as an empty object
    async fn parse_success_response(
        &self,
        method: &Method,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Value, ApiError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(method = %method, path, "response body is not JSON: {}", e);
            ApiError::Mapping {
                method: method.to_string(),
                path: path.to_string(),
                message: format!("body is not JSON: {}", e),
            }
        })
    }

    async fn handle_error_response(
        &self,
        method: &Method,
        path: &str,
        response: reqwest::Response,
    ) -> ApiError {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::NOT_FOUND {
            return ApiError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            };
        }
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Auth(format!(
                "{} {} rejected after token refresh: {}",
                method,
                path,
                error_message(&text)
            ));
        }

        ApiError::Remote {
            status: status.as_u16(),
            method: method.to_string(),
            path: path.to_string(),
            message: error_message(&text),
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::PUT | Method::DELETE)
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Pulls a human-readable message out of an error body
fn error_message(text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        for key in ["message", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "no error details".to_string()
    } else {
        trimmed.to_string()
    }
}

fn encode<B: Serialize>(path: &str, body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Mapping {
        method: "encode".to_string(),
        path: path.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(
    method: &Method,
    path: &str,
    value: Value,
) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(method = %method, path, "failed to deserialize response: {}", e);
        ApiError::Mapping {
            method: method.to_string(),
            path: path.to_string(),
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_config() -> ClientConfig {
        ClientConfig {
            retry: RetryConfig {
                max_retries: 2,
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
            },
            page_size: 2,
            ..Default::default()
        }
    }

    async fn server_with_token() -> (ServerGuard, mockito::Mock) {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth/v2/token")
            .with_body(r#"{"access_token":"tok-1","expires_in":3600}"#)
            .create_async()
            .await;
        (server, token)
    }

    fn client(server: &ServerGuard) -> Client {
        Client::with_config(&server.url(), "id", "secret", fast_config()).unwrap()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Item {
        item_id: String,
    }

    #[test]
    fn origin_url_accepts_bare_hosts_and_full_urls() {
        assert_eq!(
            origin_url("acme.galaxy.starburst.io").unwrap().as_str(),
            "https://acme.galaxy.starburst.io/"
        );
        assert_eq!(
            origin_url("https://acme.galaxy.starburst.io/").unwrap().as_str(),
            "https://acme.galaxy.starburst.io/"
        );
        assert_eq!(
            origin_url("http://127.0.0.1:8080").unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
        assert!(origin_url("  ").is_err());
    }

    #[test]
    fn backoff_grows_and_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff(1), Duration::from_millis(100));
        assert_eq!(retry.backoff(2), Duration::from_millis(200));
        assert_eq!(retry.backoff(30), Duration::from_millis(10000));
    }

    #[tokio::test]
    async fn get_sends_bearer_token_under_api_prefix() {
        let (mut server, _token) = server_with_token().await;
        let mock = server
            .mock("GET", "/public/api/v1/cluster/w-1")
            .match_header("authorization", "Bearer tok-1")
            .with_body(r#"{"itemId":"w-1"}"#)
            .create_async()
            .await;

        let item: Item = client(&server).get("cluster/w-1").await.unwrap();
        assert_eq!(item.item_id, "w-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_success_body_is_empty_object() {
        let (mut server, _token) = server_with_token().await;
        let _mock = server
            .mock("DELETE", "/public/api/v1/tag/t-1")
            .with_status(204)
            .create_async()
            .await;

        let value = client(&server)
            .send(Method::DELETE, "tag/t-1", None)
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn not_found_is_classified() {
        let (mut server, _token) = server_with_token().await;
        let _mock = server
            .mock("GET", "/public/api/v1/role/r-1")
            .with_status(404)
            .with_body(r#"{"message":"no such role"}"#)
            .create_async()
            .await;

        let err = client(&server).get::<Item>("role/r-1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn remote_error_message_is_extracted() {
        let (mut server, _token) = server_with_token().await;
        let _mock = server
            .mock("POST", "/public/api/v1/role")
            .with_status(409)
            .with_body(r#"{"message":"role name already exists"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .post::<Item, _>("role", &serde_json::json!({"roleName": "x"}))
            .await
            .unwrap_err();
        match err {
            ApiError::Remote {
                status, message, ..
            } => {
                assert_eq!(status, 409);
                assert_eq!(message, "role name already exists");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthorized_refreshes_token_once_and_replays() {
        let mut server = Server::new_async().await;
        let issued = std::sync::Arc::new(AtomicUsize::new(0));
        let counter = issued.clone();
        let token = server
            .mock("POST", "/oauth/v2/token")
            .with_body_from_request(move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                format!(r#"{{"access_token":"tok-{}","expires_in":3600}}"#, n).into_bytes()
            })
            .expect(2)
            .create_async()
            .await;
        let stale = server
            .mock("POST", "/public/api/v1/role")
            .match_header("authorization", "Bearer tok-1")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let fresh = server
            .mock("POST", "/public/api/v1/role")
            .match_header("authorization", "Bearer tok-2")
            .with_body(r#"{"itemId":"r-1"}"#)
            .expect(1)
            .create_async()
            .await;

        let item: Item = client(&server)
            .post("role", &serde_json::json!({"roleName": "x"}))
            .await
            .unwrap();

        assert_eq!(item.item_id, "r-1");
        token.assert_async().await;
        stale.assert_async().await;
        fresh.assert_async().await;
    }

    #[tokio::test]
    async fn second_unauthorized_is_an_auth_error() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth/v2/token")
            .with_body(r#"{"access_token":"tok","expires_in":3600}"#)
            .expect(2)
            .create_async()
            .await;
        let rejected = server
            .mock("GET", "/public/api/v1/cluster")
            .match_query(Matcher::Any)
            .with_status(401)
            .expect(2)
            .create_async()
            .await;

        let err = client(&server).get::<Item>("cluster").await.unwrap_err();

        assert!(matches!(err, ApiError::Auth(_)));
        token.assert_async().await;
        rejected.assert_async().await;
    }

    #[tokio::test]
    async fn idempotent_requests_retry_transient_failures() {
        let (mut server, _token) = server_with_token().await;
        let mock = server
            .mock("GET", "/public/api/v1/cluster/w-1")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let err = client(&server).get::<Item>("cluster/w-1").await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_and_patch_are_never_retried() {
        let (mut server, _token) = server_with_token().await;
        let post = server
            .mock("POST", "/public/api/v1/cluster")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", "/public/api/v1/cluster/w-1")
            .with_status(429)
            .expect(1)
            .create_async()
            .await;

        let c = client(&server);
        let body = serde_json::json!({"name": "c"});
        assert!(c.post::<Item, _>("cluster", &body).await.is_err());
        assert!(c.patch::<Item, _>("cluster/w-1", &body).await.is_err());

        post.assert_async().await;
        patch.assert_async().await;
    }

    #[tokio::test]
    async fn network_errors_propagate_unchanged() {
        let c = Client::with_config("http://127.0.0.1:1", "id", "secret", fast_config()).unwrap();
        let err = c.get::<Item>("cluster").await.unwrap_err();
        assert!(matches!(err, ApiError::Request(_)));
    }

    #[tokio::test]
    async fn undecodable_body_is_mapping_error() {
        let (mut server, _token) = server_with_token().await;
        let _mock = server
            .mock("GET", "/public/api/v1/cluster/w-1")
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let err = client(&server).get::<Item>("cluster/w-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Mapping { .. }));
    }

    #[tokio::test]
    async fn pagination_follows_tokens_in_order() {
        let (mut server, _token) = server_with_token().await;
        let first = server
            .mock("GET", "/public/api/v1/role")
            .match_query(Matcher::Exact("pageSize=2".into()))
            .with_body(r#"{"result":[{"itemId":"a"},{"itemId":"b"}],"nextPageToken":"t2"}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/public/api/v1/role")
            .match_query(Matcher::Exact("pageSize=2&pageToken=t2".into()))
            .with_body(r#"{"result":[{"itemId":"c"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let items: Vec<Item> = client(&server).get_paginated("role").await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn pagination_of_empty_collection_is_empty() {
        let (mut server, _token) = server_with_token().await;
        let _mock = server
            .mock("GET", "/public/api/v1/tag")
            .match_query(Matcher::Any)
            .with_body(r#"{"result":[]}"#)
            .create_async()
            .await;

        let items: Vec<Item> = client(&server).get_paginated("tag").await.unwrap();
        assert!(items.is_empty());
    }
}
