// src/health/checker.rs
use crate::config::CheckerConfig;
use crate::metrics::{MetricsCollector, Timer};
use crate::probe::{HttpProber, ProbeRequest, ProbeResult, Prober};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Recorded for a probe whose task died before producing a result.
const TASK_FAILED_ERROR: &str = "probe task failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("urls must be a non-empty list")]
    EmptyBatch,

    #[error("batch of {size} urls exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("timeout of {timeout_ms}ms is outside the allowed range 1..={max_ms}ms")]
    InvalidTimeout { timeout_ms: u64, max_ms: u64 },
}

/// Fans a batch of URLs out to concurrent probes and joins their results.
///
/// Every probe gets its own deadline, starting when the batch queues it;
/// no probe outcome fails the batch. Results come back in input order.
/// Batches share nothing but the HTTP client.
pub struct ServiceHealthChecker {
    config: CheckerConfig,
    prober: Arc<dyn Prober>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl ServiceHealthChecker {
    pub fn new(
        config: CheckerConfig,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Result<Self, reqwest::Error> {
        let prober = Arc::new(HttpProber::new(&config)?);
        Ok(Self::with_prober(config, prober, metrics))
    }

    pub fn with_prober(
        config: CheckerConfig,
        prober: Arc<dyn Prober>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            config,
            prober,
            metrics,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.default_timeout()
    }

    /// Probe every URL with the same per-probe `timeout`.
    pub async fn check_all(
        &self,
        urls: &[String],
        timeout: Duration,
    ) -> Result<Vec<ProbeResult>, CheckError> {
        let timer = Timer::new();

        if let Err(e) = self.validate(urls, timeout) {
            warn!("Rejected check batch: {}", e);
            if let Some(metrics) = &self.metrics {
                metrics.record_batch(false, timer.elapsed());
            }
            return Err(e);
        }

        let batch_id = Uuid::new_v4();
        let span = info_span!("batch", %batch_id, size = urls.len());

        let results = self.fan_out(urls, timeout).instrument(span.clone()).await;

        let elapsed = timer.elapsed();
        let reachable = results.iter().filter(|r| r.reachable).count();
        span.in_scope(|| {
            info!(
                "Check batch complete: {} reachable, {} unreachable in {:?}",
                reachable,
                results.len() - reachable,
                elapsed
            );
        });

        if let Some(metrics) = &self.metrics {
            metrics.record_batch(true, elapsed);
        }

        Ok(results)
    }

    fn validate(&self, urls: &[String], timeout: Duration) -> Result<(), CheckError> {
        if urls.is_empty() {
            return Err(CheckError::EmptyBatch);
        }

        if urls.len() > self.config.max_batch_size {
            return Err(CheckError::BatchTooLarge {
                size: urls.len(),
                max: self.config.max_batch_size,
            });
        }

        if timeout.is_zero() || timeout > self.config.max_timeout() {
            return Err(CheckError::InvalidTimeout {
                timeout_ms: millis(timeout),
                max_ms: self.config.max_timeout_ms,
            });
        }

        Ok(())
    }

    async fn fan_out(&self, urls: &[String], timeout: Duration) -> Vec<ProbeResult> {
        let started = Timer::new();
        let limiter = match self.config.max_concurrency {
            0 => None,
            permits => Some(Arc::new(Semaphore::new(permits))),
        };
        let mut tasks = Vec::with_capacity(urls.len());

        for url in urls {
            let prober = self.prober.clone();
            let limiter = limiter.clone();
            let metrics = self.metrics.clone();
            let request = ProbeRequest::new(url.clone(), timeout);

            let task = tokio::spawn(
                async move {
                    // Waiting for a slot counts against the request's budget.
                    let queued = Instant::now();
                    let attempt = async {
                        let _permit = match &limiter {
                            Some(limiter) => limiter.clone().acquire_owned().await.ok(),
                            None => None,
                        };
                        let _in_flight =
                            metrics.as_deref().map(MetricsCollector::track_in_flight);
                        prober.probe(&request).await
                    };

                    let result = match tokio::time::timeout(request.timeout, attempt).await {
                        Ok(mut result) => {
                            result.elapsed_millis =
                                result.elapsed_millis.max(millis(queued.elapsed()));
                            result
                        }
                        Err(_) => ProbeResult::timed_out(&request.url, queued.elapsed()),
                    };

                    if let Some(metrics) = &metrics {
                        metrics.record_probe(&result);
                    }
                    result
                }
                .in_current_span(),
            );
            tasks.push(task);
        }

        // Wait for every probe to settle
        let joined = join_all(tasks).await;

        urls.iter()
            .zip(joined)
            .map(|(url, joined)| match joined {
                Ok(result) => {
                    debug!("{} -> {}", url, result.outcome());
                    result
                }
                Err(e) => {
                    error!("Probe task for {} failed: {}", url, e);
                    ProbeResult::failed(url.as_str(), TASK_FAILED_ERROR, started.elapsed())
                }
            })
            .collect()
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
