// src/probe/prober.rs
use super::result::{ProbeRequest, ProbeResult, TIMEOUT_ERROR};
use crate::config::CheckerConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::{redirect, Client};
use std::error::Error as StdError;
use std::time::Instant;
use tokio::time::timeout;
use tracing::debug;

/// Executes a single probe. Failures are reported inside the result,
/// never as an error.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult;
}

/// Probes targets with a plain GET over a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(config: &CheckerConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        // No client-level timeout: each probe carries its own deadline.
        let client = Client::builder()
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        let start = Instant::now();

        // Dropping the in-flight future on timeout aborts the request.
        let result = timeout(request.timeout, self.client.get(&request.url).send()).await;
        let elapsed = start.elapsed();

        let probe_result = match result {
            Ok(Ok(response)) => {
                ProbeResult::from_status(&request.url, response.status().as_u16(), elapsed)
            }
            Ok(Err(e)) => ProbeResult::failed(&request.url, describe_transport_error(&e), elapsed),
            Err(_) => ProbeResult::timed_out(&request.url, elapsed),
        };

        debug!(
            url = %request.url,
            outcome = probe_result.outcome(),
            status = probe_result.http_status,
            ms = probe_result.elapsed_millis,
            "probe settled"
        );

        probe_result
    }
}

/// Short, single-line description of a transport failure, e.g.
/// `connection failed: Connection refused (os error 111)`.
pub fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        return TIMEOUT_ERROR.to_string();
    }

    let kind = if err.is_builder() {
        "invalid request"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_redirect() {
        "redirect failed"
    } else {
        "request failed"
    };

    // The innermost cause carries the useful detail (DNS, refused, TLS, ...).
    match err.source() {
        None => kind.to_string(),
        Some(mut root) => {
            while let Some(source) = root.source() {
                root = source;
            }
            format!("{}: {}", kind, root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn prober() -> HttpProber {
        HttpProber::new(&CheckerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_probe_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("up")
            .create_async()
            .await;

        let url = format!("{}/", server.url());
        let result = prober()
            .probe(&ProbeRequest::new(url.clone(), Duration::from_secs(5)))
            .await;

        mock.assert_async().await;
        assert_eq!(result.url, url);
        assert!(result.reachable);
        assert_eq!(result.http_status, 200);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_probe_disables_caching() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("cache-control", "no-cache")
            .match_header("pragma", "no-cache")
            .with_status(200)
            .create_async()
            .await;

        let result = prober()
            .probe(&ProbeRequest::new(
                format!("{}/", server.url()),
                Duration::from_secs(5),
            ))
            .await;

        mock.assert_async().await;
        assert!(result.reachable);
    }

    #[tokio::test]
    async fn test_probe_follows_redirects() {
        let mut server = mockito::Server::new_async().await;
        let target = format!("{}/home", server.url());
        let _redirect = server
            .mock("GET", "/")
            .with_status(302)
            .with_header("location", &target)
            .create_async()
            .await;
        let _home = server
            .mock("GET", "/home")
            .with_status(200)
            .create_async()
            .await;

        let url = format!("{}/", server.url());
        let result = prober()
            .probe(&ProbeRequest::new(url.clone(), Duration::from_secs(5)))
            .await;

        // the original URL is echoed, not the redirect target
        assert_eq!(result.url, url);
        assert!(result.reachable);
        assert_eq!(result.http_status, 200);
    }

    #[tokio::test]
    async fn test_probe_server_error_is_not_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let result = prober()
            .probe(&ProbeRequest::new(
                format!("{}/", server.url()),
                Duration::from_secs(5),
            ))
            .await;

        assert!(!result.reachable);
        assert_eq!(result.http_status, 503);
        assert_eq!(result.error, None);
    }

    #[tokio::test]
    async fn test_malformed_url_is_reported_not_raised() {
        let result = prober()
            .probe(&ProbeRequest::new("not a url", Duration::from_secs(1)))
            .await;

        assert!(!result.reachable);
        assert_eq!(result.http_status, 0);
        let error = result.error.unwrap();
        assert!(error.starts_with("invalid request"), "got {error}");
    }
}
