use crate::config::BridgeConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One logical bridge call. `path` is relative to the bridge base url and
/// carries its leading slash; query pairs are appended url-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub json_body: Option<serde_json::Value>,
}

impl OperationRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            json_body: None,
        }
    }

    pub fn post_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            json_body: Some(body),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP outcome. The body is always captured as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResult {
    pub ok: bool,
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues exactly one request. Non-2xx statuses are returned, not raised.
    async fn send(
        &self,
        config: &BridgeConfig,
        request: &OperationRequest,
    ) -> Result<TransportResult, TransportError>;
}

/// Joins a base url and a route, never doubling or dropping the slash between them.
pub fn build_url(base_url: &str, path: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    fn classify(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(level = "debug", skip_all, fields(method = request.method.as_str(), path = %request.path))]
    async fn send(
        &self,
        config: &BridgeConfig,
        request: &OperationRequest,
    ) -> Result<TransportResult, TransportError> {
        let raw = build_url(config.base_url(), &request.path);
        let mut url = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .query
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        }
        .header(API_KEY_HEADER, config.api_key());
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => {
                let error = self.classify(error);
                tracing::warn!(%error, "bridge request failed");
                return Err(error);
            }
        };
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "bridge request completed");
        } else {
            tracing::warn!(status = status.as_u16(), "bridge returned non-success status");
        }
        Ok(TransportResult {
            ok: status.is_success(),
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BridgeSettings, BridgeSources, EnvSnapshot};
    use axum::Json;
    use axum::Router;
    use axum::extract::{Query, RawQuery};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use serde_json::json;
    use std::collections::HashMap;

    const SOURCES: BridgeSources = BridgeSources {
        config_prefix: "bridges.test",
        base_url_env: "TEST_BRIDGE_URL",
        api_key_env: "TEST_BRIDGE_API_KEY",
    };

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    fn config(base_url: &str) -> BridgeConfig {
        BridgeConfig::resolve(
            &BridgeSettings {
                base_url: Some(base_url.to_string()),
                api_key: Some("test-key".to_string()),
            },
            &SOURCES,
            &EnvSnapshot::new(),
        )
        .expect("config")
    }

    fn header(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned)
    }

    #[test]
    fn build_url_is_stable_under_restripping() {
        for base in ["http://h", "http://h/", "http://h/api", "http://h/api/"] {
            let stripped = base.trim_end_matches('/');
            for path in ["/list", "/files/abc/content", "/read"] {
                assert_eq!(build_url(base, path), build_url(stripped, path));
                assert!(!build_url(base, path).contains("//list"));
            }
        }
        assert_eq!(build_url("http://h/", "/read"), "http://h/read");
        assert_eq!(build_url("http://h", "read"), "http://h/read");
    }

    #[tokio::test]
    async fn get_sends_api_key_and_encoded_query_without_content_type() {
        let router = Router::new().route(
            "/api/list",
            get(|headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "api_key": header(&headers, "x-api-key"),
                    "content_type": header(&headers, "content-type"),
                    "path": query.get("path"),
                }))
            }),
        );
        let base = spawn(router).await;
        let transport = HttpTransport::new(DEFAULT_REQUEST_TIMEOUT).expect("transport");
        let request = OperationRequest::get("/list").with_query("path", "src/a b&c.rs");

        let result = transport
            .send(&config(&format!("{base}/api/")), &request)
            .await
            .expect("send");
        assert!(result.ok);
        assert_eq!(result.status, 200);
        let body: serde_json::Value = serde_json::from_str(&result.body).expect("json");
        assert_eq!(body["api_key"], "test-key");
        assert_eq!(body["content_type"], serde_json::Value::Null);
        assert_eq!(body["path"], "src/a b&c.rs");
    }

    #[tokio::test]
    async fn post_sets_json_content_type_and_body() {
        let router = Router::new().route(
            "/write",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                Json(json!({
                    "content_type": header(&headers, "content-type"),
                    "received": body,
                }))
            }),
        );
        let base = spawn(router).await;
        let transport = HttpTransport::new(DEFAULT_REQUEST_TIMEOUT).expect("transport");
        let request = OperationRequest::post_json("/write", json!({"path": "a.txt", "content": "hi"}));

        let result = transport.send(&config(&base), &request).await.expect("send");
        let body: serde_json::Value = serde_json::from_str(&result.body).expect("json");
        assert_eq!(body["content_type"], "application/json");
        assert_eq!(body["received"]["content"], "hi");
    }

    #[tokio::test]
    async fn non_success_status_is_returned_with_raw_body() {
        let router = Router::new().route(
            "/read",
            get(|RawQuery(_query): RawQuery| async {
                (StatusCode::FORBIDDEN, r#"{"error":"forbidden"}"#)
            }),
        );
        let base = spawn(router).await;
        let transport = HttpTransport::new(DEFAULT_REQUEST_TIMEOUT).expect("transport");

        let result = transport
            .send(&config(&base), &OperationRequest::get("/read").with_query("path", "x"))
            .await
            .expect("non-2xx is not a transport error");
        assert_eq!(
            result,
            TransportResult {
                ok: false,
                status: 403,
                body: r#"{"error":"forbidden"}"#.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let transport = HttpTransport::new(DEFAULT_REQUEST_TIMEOUT).expect("transport");
        let err = transport
            .send(&config(&format!("http://{addr}")), &OperationRequest::get("/list"))
            .await
            .expect_err("nothing listening");
        assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_bridge_times_out() {
        let router = Router::new().route(
            "/list",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = spawn(router).await;
        let transport = HttpTransport::new(Duration::from_millis(100)).expect("transport");

        let err = transport
            .send(&config(&base), &OperationRequest::get("/list"))
            .await
            .expect_err("timeout");
        assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_base_url_is_rejected_before_sending() {
        let transport = HttpTransport::new(DEFAULT_REQUEST_TIMEOUT).expect("transport");
        let err = transport
            .send(&config("not a url"), &OperationRequest::get("/list"))
            .await
            .expect_err("invalid url");
        assert!(matches!(err, TransportError::InvalidUrl(_)), "got {err:?}");
    }
}
