// src/probe/result.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error text recorded when a probe exceeds its timeout budget.
pub const TIMEOUT_ERROR: &str = "timeout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub url: String,
    pub timeout: Duration,
}

impl ProbeRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

/// Outcome of a single probe. Serialized with the dashboard's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    #[serde(rename = "ok")]
    pub reachable: bool,
    /// 0 when no response was received.
    #[serde(rename = "status")]
    pub http_status: u16,
    #[serde(rename = "ms")]
    pub elapsed_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// A response was received; reachability follows the 2xx range.
    pub fn from_status(url: impl Into<String>, status: u16, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            reachable: (200..300).contains(&status),
            http_status: status,
            elapsed_millis: elapsed_millis(elapsed),
            error: None,
        }
    }

    pub fn timed_out(url: impl Into<String>, elapsed: Duration) -> Self {
        Self::failed(url, TIMEOUT_ERROR, elapsed)
    }

    /// No response was obtained at all.
    pub fn failed(url: impl Into<String>, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            reachable: false,
            http_status: 0,
            elapsed_millis: elapsed_millis(elapsed),
            error: Some(error.into()),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_deref() == Some(TIMEOUT_ERROR)
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match (self.reachable, self.http_status) {
            (true, _) => "reachable",
            (false, 0) if self.is_timeout() => "timeout",
            (false, 0) => "transport_error",
            (false, _) => "bad_status",
        }
    }
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
