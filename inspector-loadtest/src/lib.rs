//! Load-balancer probe.
//!
//! Fires a fixed number of GET requests at one URL from a pool of worker
//! tasks, attributes each response to a backend and tabulates counts and
//! response times per backend.
//!
//! ```rust,no_run
//! use inspector_loadtest::{LoadTestConfig, LoadTestRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = LoadTestRunner::new(LoadTestConfig::default())?;
//!     let report = runner.run().await?;
//!     print!("{}", report.render());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod runner;
pub mod stats;

pub use classify::{BackendClassifier, ERROR_LABEL, Outcome, UNKNOWN_LABEL};
pub use config::{
    BackendTarget, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, DEFAULT_TOTAL_REQUESTS, DEFAULT_URL,
    LoadTestConfig, default_backends,
};
pub use error::{LoadTestError, Result};
pub use runner::{LoadTestRunner, probe};
pub use stats::{BackendStats, LoadTestReport, ReportRow, ReportSummary, RowSummary};

/// Response header naming the backend that answered
pub const BACKEND_HEADER: &str = "X-Backend-Server";
