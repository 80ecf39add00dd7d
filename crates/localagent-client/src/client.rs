//! The typed HTTP client every service module goes through.
//!
//! One `ApiClient` is shared (cheap clone) across services and the auth
//! container: they all see the same bearer token slot and the same
//! tool-call gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_REQUEST_ATTEMPTS: usize = 2;

/// Every resource route lives under this prefix on the backend.
pub const API_PREFIX: &str = "/api";

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub request_attempts: usize,
}

impl ApiClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            request_attempts: DEFAULT_REQUEST_ATTEMPTS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("api_base_url_missing")]
    BaseUrlMissing,
    #[error("api_invalid_path")]
    InvalidPath,
    #[error("api_request_failed:{message}")]
    Request { message: String },
    #[error("api_read_failed:{message}")]
    Read { message: String },
    #[error("api_http_{status}:{body}")]
    Http { status: StatusCode, body: String },
    #[error("api_json_decode_failed:{message}")]
    Decode { message: String },
    #[error("api_unauthorized")]
    Unauthorized,
}

type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    request_attempts: usize,
    http: reqwest::Client,
    token: Arc<RwLock<Option<String>>>,
    tool_calls_allowed: Arc<AtomicBool>,
    on_unauthorized: Arc<RwLock<Option<UnauthorizedHook>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("request_attempts", &self.request_attempts)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            request_attempts: config.request_attempts.max(1),
            http: reqwest::Client::new(),
            token: Arc::new(RwLock::new(None)),
            tool_calls_allowed: Arc::new(AtomicBool::new(false)),
            on_unauthorized: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Registers the callback invoked whenever the server answers 401.
    /// The auth container uses it to broadcast the logged-out state.
    pub async fn set_on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_unauthorized.write().await = Some(Arc::new(hook));
    }

    /// Flips the tool-call gate. While disallowed, requests under `/tools`
    /// are suppressed and answered with a benign empty success instead.
    pub fn set_tool_calls_allowed(&self, allowed: bool) {
        self.tool_calls_allowed.store(allowed, Ordering::SeqCst);
    }

    #[must_use]
    pub fn tool_calls_allowed(&self) -> bool {
        self.tool_calls_allowed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{API_PREFIX}{}", self.base_url, trimmed))
        } else {
            Some(format!("{}{API_PREFIX}/{}", self.base_url, trimmed))
        }
    }

    fn tool_call_suppressed(&self, path: &str) -> bool {
        path.contains("/tools") && !self.tool_calls_allowed()
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        if self.tool_call_suppressed(path) {
            return decode_synthesized(serde_json::Value::Array(Vec::new()));
        }
        let response = self.send(Method::GET, path, None).await?;
        self.decode_json(response).await
    }

    pub async fn get_optional_json<T>(&self, path: &str) -> Result<Option<T>, ApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        if self.tool_call_suppressed(path) {
            return Ok(None);
        }
        let response = self.send(Method::GET, path, None).await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        self.decode_json(response).await.map(Some)
    }

    pub async fn post_json<Req, Res>(&self, path: &str, payload: &Req) -> Result<Res, ApiError>
    where
        Req: Serialize + ?Sized,
        Res: for<'de> serde::Deserialize<'de>,
    {
        if self.tool_call_suppressed(path) {
            return decode_synthesized(serde_json::Value::Object(serde_json::Map::new()));
        }
        let body = encode_body(payload)?;
        let response = self.send(Method::POST, path, Some(body)).await?;
        self.decode_json(response).await
    }

    /// POST with no request body, response body ignored.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        if self.tool_call_suppressed(path) {
            return Ok(());
        }
        let response = self.send(Method::POST, path, None).await?;
        self.check_status(response).await
    }

    pub async fn put_json<Req, Res>(&self, path: &str, payload: &Req) -> Result<Res, ApiError>
    where
        Req: Serialize + ?Sized,
        Res: for<'de> serde::Deserialize<'de>,
    {
        if self.tool_call_suppressed(path) {
            return decode_synthesized(serde_json::Value::Object(serde_json::Map::new()));
        }
        let body = encode_body(payload)?;
        let response = self.send(Method::PUT, path, Some(body)).await?;
        self.decode_json(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        if self.tool_call_suppressed(path) {
            return Ok(());
        }
        let response = self.send(Method::DELETE, path, None).await?;
        self.check_status(response).await
    }

    /// Transport-level retry loop. HTTP error statuses are never retried,
    /// only failures to obtain a response at all.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path).ok_or(ApiError::InvalidPath)?;
        let token = self.token().await;
        let mut last_error: Option<String> = None;

        for attempt in 0..self.request_attempts {
            let mut request = self
                .http
                .request(method.clone(), url.as_str())
                .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()))
                .timeout(self.timeout);
            if let Some(token) = token.as_deref() {
                request = request.bearer_auth(token);
            }
            if let Some(bytes) = body.as_ref() {
                request = request
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    tracing::debug!(%method, path, attempt, error = %error, "request attempt failed");
                    last_error = Some(error.to_string());
                    if attempt + 1 >= self.request_attempts {
                        break;
                    }
                }
            }
        }

        Err(ApiError::Request {
            message: last_error.unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn decode_json<T>(&self, response: reqwest::Response) -> Result<T, ApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.handle_unauthorized().await);
        }
        let bytes = response.bytes().await.map_err(|error| ApiError::Read {
            message: error.to_string(),
        })?;
        if !status.is_success() {
            return Err(format_http_error(status, &bytes));
        }
        serde_json::from_slice::<T>(&bytes).map_err(|error| ApiError::Decode {
            message: error.to_string(),
        })
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.handle_unauthorized().await);
        }
        if !status.is_success() {
            let bytes = response.bytes().await.map_err(|error| ApiError::Read {
                message: error.to_string(),
            })?;
            return Err(format_http_error(status, &bytes));
        }
        Ok(())
    }

    async fn handle_unauthorized(&self) -> ApiError {
        self.clear_token().await;
        let hook = self.on_unauthorized.read().await.clone();
        if let Some(hook) = hook {
            hook();
        }
        ApiError::Unauthorized
    }
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> ApiError {
    let body = non_empty_string(String::from_utf8_lossy(body).to_string())
        .unwrap_or_else(|| "<empty>".to_string());
    ApiError::Http { status, body }
}

fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn encode_body<Req>(payload: &Req) -> Result<Vec<u8>, ApiError>
where
    Req: Serialize + ?Sized,
{
    serde_json::to_vec(payload).map_err(|error| ApiError::Decode {
        message: error.to_string(),
    })
}

fn decode_synthesized<T>(value: serde_json::Value) -> Result<T, ApiError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    serde_json::from_value(value).map_err(|error| ApiError::Decode {
        message: error.to_string(),
    })
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(ApiClientConfig::new(base)).expect("client")
    }

    #[test]
    fn endpoint_builder_prefixes_api_and_normalizes() {
        let client = client("http://localhost:8000/");
        assert_eq!(
            client.endpoint("/tasks"),
            Some("http://localhost:8000/api/tasks".to_string())
        );
        assert_eq!(
            client.endpoint("tasks"),
            Some("http://localhost:8000/api/tasks".to_string())
        );
        assert_eq!(client.endpoint("  "), None);
    }

    #[test]
    fn base_url_missing_is_rejected() {
        let result = ApiClient::new(ApiClientConfig::new("   "));
        assert!(matches!(result, Err(ApiError::BaseUrlMissing)));
    }

    #[test]
    fn http_error_mapping_preserves_shape() {
        let error = format_http_error(StatusCode::BAD_GATEWAY, b" gateway failed ");
        assert_eq!(error.to_string(), "api_http_502 Bad Gateway:gateway failed");

        let empty_body = format_http_error(StatusCode::SERVICE_UNAVAILABLE, b" ");
        assert_eq!(
            empty_body.to_string(),
            "api_http_503 Service Unavailable:<empty>"
        );
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_present() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tasks")
            .match_header("authorization", "Bearer tok_abc")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client(&server.url());
        client.set_token("tok_abc").await;
        let tasks: Vec<serde_json::Value> = client.get_json("/tasks").await.expect("tasks");
        assert!(tasks.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_fires_hook() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tasks")
            .with_status(401)
            .create_async()
            .await;

        let client = client(&server.url());
        client.set_token("stale").await;

        let fired = Arc::new(AtomicBool::new(false));
        let observed = Arc::clone(&fired);
        client
            .set_on_unauthorized(move || observed.store(true, Ordering::SeqCst))
            .await;

        let result: Result<Vec<serde_json::Value>, _> = client.get_json("/tasks").await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert!(client.token().await.is_none());
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn suppressed_tool_get_synthesizes_empty_list() {
        // No server behind this URL; a suppressed call must not reach it.
        let client = client("http://127.0.0.1:9");
        let tools: Vec<serde_json::Value> = client.get_json("/tools").await.expect("gated get");
        assert!(tools.is_empty());

        let body: serde_json::Value = client
            .post_json("/tools/t1/execute", &serde_json::json!({"input": 1}))
            .await
            .expect("gated post");
        assert_eq!(body, serde_json::json!({}));
    }

    #[tokio::test]
    async fn tool_calls_pass_through_once_allowed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tools")
            .with_status(200)
            .with_body(r#"[{"ok": true}]"#)
            .create_async()
            .await;

        let client = client(&server.url());
        client.set_tool_calls_allowed(true);
        let tools: Vec<serde_json::Value> = client.get_json("/tools").await.expect("tools");
        assert_eq!(tools.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn optional_get_maps_404_to_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tasks/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = client(&server.url());
        let task: Option<serde_json::Value> = client
            .get_optional_json("/tasks/missing")
            .await
            .expect("optional get");
        assert!(task.is_none());
    }
}
