//! Single authenticated HTTP access point for the backend.
//!
//! `request` is the only function that touches the network. Resource modules
//! below are thin wrappers that pick the verb, shape the query and encode the
//! body; they hold no business rules.

pub mod budget;
pub mod category;
pub mod finance_api;
pub mod goal;
pub mod profile;
pub mod transaction;

pub use finance_api::FinanceApi;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::ApiError;
use crate::session::SessionProvider;

/// Per-call knobs for [`ApiClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Applied after the defaults, so a caller header replaces a default one.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(Self {
            body: Some(body),
            ..Self::default()
        })
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<dyn SessionProvider>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_http(base_url, session, reqwest::Client::new())
    }

    pub fn with_http(
        base_url: impl Into<String>,
        session: Arc<dyn SessionProvider>,
        http: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Fetched per call so a rotated token is picked up immediately.
        if let Some(token) = self.session.access_token().await {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::Encode(format!("invalid access token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        } else {
            trace!("No session, sending request unauthenticated");
        }

        for (name, value) in overrides {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Encode(format!("invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Encode(format!("invalid value for header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Sends one request and decodes the JSON body verbatim into `T`.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// work for endpoints that return nothing.
    #[instrument(skip(self, options), fields(base_url = %self.base_url))]
    pub async fn request<T>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{} request to: {}", method, url);

        let headers = self.headers(&options.headers).await?;
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .headers(headers)
            .query(&options.query);
        if let Some(body) = &options.body {
            let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Encode(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(|e| {
            error!("{} {} - Request failed: {}", method, endpoint, e);
            ApiError::Unreachable {
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("{} {} - Failed to read response body: {}", method, endpoint, e);
            ApiError::Unreachable {
                reason: e.to_string(),
            }
        })?;

        if !status.is_success() {
            let message = rejection_message(status, &text);
            warn!("{} {} - Non-OK response {}: {}", method, endpoint, status, message);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        trace!("{} {} - Response received, parsing JSON", method, endpoint);
        let decoded = if text.trim().is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_str(&text)
        };
        let data = decoded.map_err(|e| {
            error!("{} {} - Failed to parse response: {}", method, endpoint, e);
            ApiError::Decode(e.to_string())
        })?;

        info!("{} {} - Success", method, endpoint);
        Ok(data)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, RequestOptions::new().with_query(query))
            .await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, RequestOptions::json(body)?)
            .await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, RequestOptions::json(body)?)
            .await
    }

    pub async fn patch<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, endpoint, RequestOptions::json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, RequestOptions::new())
            .await
    }
}

/// Human message for a non-2xx response: `detail`, then `message`, then the
/// status reason phrase.
fn rejection_message(status: StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| message_from_json(&json));

    from_body.unwrap_or_else(|| match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("HTTP {}", status.as_u16()),
    })
}

fn message_from_json(json: &Value) -> Option<String> {
    match json.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
        // FastAPI validation errors: [{"loc": [...], "msg": "...", ...}]
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }
    json.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
