// src/api/status.rs
use chrono::{SecondsFormat, Utc};
use hyper::header::CONTENT_LENGTH;
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{json_response, ApiError};
use crate::config::Config;
use crate::health::{sort_for_display, ServiceHealthChecker};
use crate::metrics::MetricsCollector;
use crate::probe::ProbeResult;

pub const STATUS_PATH: &str = "/api/status";
pub const HEALTHZ_PATH: &str = "/healthz";

const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    #[serde(default)]
    pub urls: Vec<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub results: Vec<ProbeResult>,
    pub checked_at: String,
}

impl StatusResponse {
    fn new(results: Vec<ProbeResult>) -> Self {
        Self {
            results,
            checked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Routes dashboard requests to the health checker.
pub struct StatusApi {
    checker: Arc<ServiceHealthChecker>,
    targets: Vec<String>,
    primary_url: Option<String>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl StatusApi {
    pub fn new(
        checker: Arc<ServiceHealthChecker>,
        config: &Config,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            checker,
            targets: config.targets.clone(),
            primary_url: config.primary_url.clone(),
            metrics,
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let method = req.method().clone();
        let path = route_label(req.uri().path());

        let response = match self.route(req).await {
            Ok(response) => response,
            Err(e) => e.into(),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_request(method.as_str(), path, response.status().as_u16());
        }
        debug!(%method, path, status = response.status().as_u16(), "request handled");

        response
    }

    async fn route(&self, req: Request<Body>) -> Result<Response<Body>, ApiError> {
        match (req.method(), req.uri().path()) {
            (&Method::POST, STATUS_PATH) => self.check_requested(req).await,
            (&Method::GET, STATUS_PATH) => self.check_configured().await,
            (_, STATUS_PATH) => Err(ApiError::MethodNotAllowed),
            (&Method::GET, HEALTHZ_PATH) => Ok(json_response(
                StatusCode::OK,
                &serde_json::json!({ "status": "ok" }),
            )),
            _ => Err(ApiError::NotFound),
        }
    }

    /// `POST /api/status`: probe the URLs named in the body.
    async fn check_requested(&self, req: Request<Body>) -> Result<Response<Body>, ApiError> {
        let request = read_status_request(req).await?;
        let timeout = request
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.checker.default_timeout());

        info!("Checking {} requested urls", request.urls.len());
        let results = self.checker.check_all(&request.urls, timeout).await?;

        Ok(json_response(StatusCode::OK, &StatusResponse::new(results)))
    }

    /// `GET /api/status`: probe the configured targets, sorted for display.
    async fn check_configured(&self) -> Result<Response<Body>, ApiError> {
        if self.targets.is_empty() {
            return Err(ApiError::NoTargets);
        }

        let mut results = self
            .checker
            .check_all(&self.targets, self.checker.default_timeout())
            .await?;
        sort_for_display(&mut results, self.primary_url.as_deref());

        Ok(json_response(StatusCode::OK, &StatusResponse::new(results)))
    }
}

async fn read_status_request(req: Request<Body>) -> Result<StatusRequest, ApiError> {
    let declared_len = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared_len.map_or(false, |len| len > MAX_BODY_BYTES) {
        return Err(ApiError::BodyTooLarge);
    }

    let bytes = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    if bytes.len() as u64 > MAX_BODY_BYTES {
        return Err(ApiError::BodyTooLarge);
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// Fixed label set so arbitrary paths don't explode metric cardinality.
fn route_label(path: &str) -> &'static str {
    match path {
        STATUS_PATH => STATUS_PATH,
        HEALTHZ_PATH => HEALTHZ_PATH,
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: StatusRequest = serde_json::from_str(r#"{"urls":["http://a"]}"#).unwrap();
        assert_eq!(request.urls, vec!["http://a"]);
        assert_eq!(request.timeout_ms, None);

        let request: StatusRequest =
            serde_json::from_str(r#"{"urls":[],"timeoutMs":2500}"#).unwrap();
        assert!(request.urls.is_empty());
        assert_eq!(request.timeout_ms, Some(2500));

        // missing urls decodes as empty and is rejected by the checker
        let request: StatusRequest = serde_json::from_str("{}").unwrap();
        assert!(request.urls.is_empty());
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(serde_json::from_str::<StatusRequest>(r#"{"urls":"http://a"}"#).is_err());
        assert!(serde_json::from_str::<StatusRequest>(r#"{"urls":["a"],"timeoutMs":-1}"#).is_err());
    }

    #[test]
    fn test_route_labels() {
        assert_eq!(route_label("/api/status"), "/api/status");
        assert_eq!(route_label("/wp-admin"), "other");
    }
}
