//! Forwarding client for the internal product service.

use crate::config::UpstreamSettings;
use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, Method};
use service_core::error::AppError;
use service_core::observability::inject_trace_context;

/// Hop-by-hop headers, meaningful only for a single connection.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Response headers relayed back to the client.
pub const RELAYED_RESPONSE_HEADERS: [HeaderName; 7] = [
    header::CONTENT_TYPE,
    header::CONTENT_LANGUAGE,
    header::CONTENT_ENCODING,
    header::VARY,
    header::LOCATION,
    header::RETRY_AFTER,
    HeaderName::from_static("x-request-id"),
];

pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.timeout())
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build upstream HTTP client: {}", e);
                AppError::ConfigError(anyhow::Error::new(e))
            })?;

        tracing::info!(upstream = %settings.url, "Forwarding to upstream");

        Ok(Self {
            client,
            base_url: settings.url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request upstream with the client's method, path, query and
    /// body. Upstream error statuses come back as `Ok`; only a failure to get
    /// any answer is an error.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<reqwest::Response, AppError> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let mut outgoing = forwardable_headers(headers);
        inject_trace_context(&mut outgoing);

        self.client
            .request(method.clone(), &url)
            .headers(outgoing)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    method = %method,
                    upstream = %url,
                    error = %e,
                    timeout = e.is_timeout(),
                    "Upstream request failed"
                );
                if e.is_timeout() {
                    AppError::UpstreamTimeout
                } else {
                    AppError::UpstreamUnavailable(e.to_string())
                }
            })
    }
}

/// Copies every request header except hop-by-hop ones, `host` (set from the
/// upstream URL) and anything the `connection` header names.
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let named_by_connection: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if *name == header::HOST
            || HOP_BY_HOP.contains(name)
            || named_by_connection.iter().any(|n| n == name.as_str())
        {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}
