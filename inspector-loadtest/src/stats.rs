//! Per-backend statistics and the results table

use crate::{BackendTarget, Outcome, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;

/// Response times for one outcome label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendStats {
    pub count: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
    samples: Vec<Duration>,
}

impl BackendStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.min = if self.count == 0 {
            elapsed
        } else {
            self.min.min(elapsed)
        };
        self.max = self.max.max(elapsed);
        self.total += elapsed;
        self.count += 1;
        self.samples.push(elapsed);
    }

    pub fn merge(&mut self, other: &BackendStats) {
        for sample in &other.samples {
            self.record(*sample);
        }
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    /// Mean response time; zero when empty
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        match u32::try_from(self.count) {
            Ok(n) => self.total / n,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.count as f64),
        }
    }

    /// Sample at sorted index `floor(n * p)`, `p` in `0.0..=1.0`
    ///
    /// One rank above nearest-rank: p95 of 1..=100 ms is 96 ms. `p = 1.0`
    /// falls back to the maximum.
    pub fn percentile(&self, p: f64) -> Duration {
        let mut sorted = self.samples.clone();
        sorted.sort();
        let idx = (sorted.len() as f64 * p.clamp(0.0, 1.0)) as usize;
        sorted.get(idx).copied().unwrap_or(self.max)
    }

    pub fn p95(&self) -> Duration {
        self.percentile(0.95)
    }
}

/// One line of the results table
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub outcome: Outcome,
    pub stats: BackendStats,
}

/// Results of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTestReport {
    pub total_requests: u64,
    pub elapsed: Duration,
    rows: Vec<ReportRow>,
}

impl LoadTestReport {
    /// Build the table from per-outcome tallies.
    ///
    /// Rows follow `order` for backends, then `Unknown`, then `Error`;
    /// outcomes with no requests get no row.
    pub fn new(
        order: &[BackendTarget],
        mut tallies: HashMap<Outcome, BackendStats>,
        elapsed: Duration,
    ) -> Self {
        let sequence = order
            .iter()
            .map(|target| Outcome::Backend(target.label.clone()))
            .chain([Outcome::Unknown, Outcome::Error]);

        let mut rows = Vec::new();
        for outcome in sequence {
            if let Some(stats) = tallies.remove(&outcome)
                && stats.count > 0
            {
                rows.push(ReportRow { outcome, stats });
            }
        }

        let total_requests = rows.iter().map(|row| row.stats.count).sum();
        Self {
            total_requests,
            elapsed,
            rows,
        }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.total_requests == 0
    }

    /// Stats for a label, if any request ended that way
    pub fn stats(&self, label: &str) -> Option<&BackendStats> {
        self.rows
            .iter()
            .find(|row| row.outcome.label() == label)
            .map(|row| &row.stats)
    }

    pub fn count(&self, label: &str) -> u64 {
        self.stats(label).map_or(0, |stats| stats.count)
    }

    /// Share of all requests, in percent
    pub fn percentage(&self, count: u64) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        count as f64 / self.total_requests as f64 * 100.0
    }

    pub fn requests_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_requests as f64 / secs
        } else {
            0.0
        }
    }

    /// Human-readable table
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== LOAD BALANCER RESULTS ===");
        let _ = writeln!(out, "Total requests: {}", self.total_requests);
        let _ = writeln!(out, "Total time: {:.2}s", self.elapsed.as_secs_f64());
        let _ = writeln!(out, "Requests/sec: {:.2}", self.requests_per_sec());

        for row in &self.rows {
            let stats = &row.stats;
            let _ = writeln!(
                out,
                "{}: {:3} requests ({:.1}%) | Avg: {:.3}s | Max: {:.3}s | p95: {:.3}s",
                row.outcome,
                stats.count,
                self.percentage(stats.count),
                stats.avg().as_secs_f64(),
                stats.max.as_secs_f64(),
                stats.p95().as_secs_f64(),
            );
        }
        out
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_requests: self.total_requests,
            elapsed_secs: self.elapsed.as_secs_f64(),
            requests_per_sec: self.requests_per_sec(),
            backends: self
                .rows
                .iter()
                .map(|row| RowSummary {
                    label: row.outcome.clone(),
                    count: row.stats.count,
                    percent: self.percentage(row.stats.count),
                    avg_secs: row.stats.avg().as_secs_f64(),
                    min_secs: row.stats.min.as_secs_f64(),
                    max_secs: row.stats.max.as_secs_f64(),
                    p95_secs: row.stats.p95().as_secs_f64(),
                })
                .collect(),
        }
    }

    /// Pretty JSON form of [`summary`](Self::summary)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }
}

/// Serializable view of a report
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_requests: u64,
    pub elapsed_secs: f64,
    pub requests_per_sec: f64,
    pub backends: Vec<RowSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowSummary {
    pub label: Outcome,
    pub count: u64,
    pub percent: f64,
    pub avg_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
    pub p95_secs: f64,
}
