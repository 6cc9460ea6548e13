//! Worker fan-out

use crate::{
    BACKEND_HEADER, BackendClassifier, BackendStats, LoadTestConfig, LoadTestReport, Outcome,
    Result,
};
use inspector_http_client::{HttpClient, HttpClientConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Shared state of a run
struct RunState {
    /// Next request slot to claim
    next: AtomicU64,
    completed: AtomicU64,
    tallies: Mutex<HashMap<Outcome, BackendStats>>,
}

/// Load test runner
pub struct LoadTestRunner {
    config: LoadTestConfig,
    client: HttpClient,
    classifier: BackendClassifier,
}

impl LoadTestRunner {
    /// Validate `config` and build the HTTP client
    pub fn new(config: LoadTestConfig) -> Result<Self> {
        config.validate()?;

        let pool = if config.keep_alive { config.concurrency } else { 0 };
        let client = HttpClient::new(
            HttpClientConfig::builder()
                .timeout(config.timeout)
                .connect_timeout(config.timeout)
                .pool_max_idle_per_host(pool)
                .build(),
        )?;
        let classifier = BackendClassifier::new(config.backends.clone());

        Ok(Self {
            config,
            client,
            classifier,
        })
    }

    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Issue `total_requests` GETs from `concurrency` workers.
    ///
    /// Failed requests are counted under `Error` and never abort the run.
    pub async fn run(&self) -> Result<LoadTestReport> {
        let total = self.config.total_requests;
        let workers = self.config.worker_count();
        let progress_step = (total / 10).max(1);

        info!(
            url = %self.config.url,
            total,
            workers,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "Starting load test"
        );

        let state = Arc::new(RunState {
            next: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            tallies: Mutex::new(HashMap::new()),
        });
        let url: Arc<str> = Arc::from(self.config.url.as_str());
        let start = Instant::now();

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let state = Arc::clone(&state);
            let client = self.client.clone();
            let classifier = self.classifier.clone();
            let url = Arc::clone(&url);

            handles.push(tokio::spawn(async move {
                while state.next.fetch_add(1, Ordering::Relaxed) < total {
                    let (outcome, elapsed) = probe(&client, &url, &classifier).await;
                    state
                        .tallies
                        .lock()
                        .entry(outcome)
                        .or_default()
                        .record(elapsed);

                    let done = state.completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % progress_step == 0 {
                        info!(done, total, "Load test progress");
                    }
                }
            }));
        }

        for handle in handles {
            handle.await?;
        }

        let elapsed = start.elapsed();
        let tallies = std::mem::take(&mut *state.tallies.lock());
        let report = LoadTestReport::new(&self.config.backends, tallies, elapsed);

        info!(
            total = report.total_requests,
            errors = report.count(Outcome::Error.label()),
            elapsed_ms = elapsed.as_millis() as u64,
            rps = report.requests_per_sec(),
            "Load test finished"
        );
        Ok(report)
    }
}

/// One timed GET and its classification
pub async fn probe(
    client: &HttpClient,
    url: &str,
    classifier: &BackendClassifier,
) -> (Outcome, Duration) {
    let start = Instant::now();

    match client.get(url).send().await {
        Ok(response) => {
            let outcome =
                classifier.classify(response.header(BACKEND_HEADER), &response.text_lossy());
            debug!(status = response.status().as_u16(), %outcome, "Probe answered");
            (outcome, response.elapsed())
        }
        Err(e) => {
            debug!(error = %e, "Probe failed");
            (Outcome::Error, start.elapsed())
        }
    }
}
