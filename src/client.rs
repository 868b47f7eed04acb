use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart;
use serde_json::Value;

use crate::error::ConsoleError;
use crate::storage::SessionStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of any backend call. Non-2xx statuses are delivered here like
/// any other response; only transport-level failures become errors.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// `Location` header, kept so the login flow can inspect the 2FA
    /// redirect target (the client itself never follows redirects).
    pub location: Option<String>,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Build a human-readable error from a response, preferring the
/// backend-supplied message over the fallback.
pub fn api_error(response: &ApiResponse, fallback: &str) -> ConsoleError {
    let message = response.body["message"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string();
    ConsoleError::Api { status: response.status, message }
}

pub type UnauthorizedCallback = Arc<dyn Fn() + Send + Sync>;

/// Thin wrapper over reqwest that injects the bearer token at call time,
/// applies the fixed request timeout, and signals the unauthorized
/// callback once per 401/403 response.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<SessionStore>,
    on_unauthorized: UnauthorizedCallback,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        sessions: Arc<SessionStore>,
        on_unauthorized: UnauthorizedCallback,
    ) -> Result<Self, ConsoleError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sessions,
            on_unauthorized,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ConsoleError> {
        self.send(self.http.get(self.url(path))).await
    }

    pub async fn get_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, ConsoleError> {
        self.send(self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, ConsoleError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, ConsoleError> {
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ConsoleError> {
        self.send(self.http.delete(self.url(path))).await
    }

    /// Multipart upload. The transport's own content-type and boundary
    /// handling is preserved; no JSON content type is forced here.
    pub async fn upload(
        &self,
        path: &str,
        file_extension: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiResponse, ConsoleError> {
        let form = multipart::Form::new()
            .text("fileextension", file_extension.to_string())
            .part("file", multipart::Part::bytes(bytes).file_name(file_name.to_string()));
        self.send(self.http.post(self.url(path)).multipart(form)).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse, ConsoleError> {
        let request = match self.sessions.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = match response.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
            Err(_) => Value::Null,
        };

        if status == 401 || status == 403 {
            tracing::debug!(status, "unauthorized response, signalling callback");
            (self.on_unauthorized)();
        }

        Ok(ApiResponse { status, location, body })
    }
}
