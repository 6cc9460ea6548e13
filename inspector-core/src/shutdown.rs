//! Connection tracking and interrupt-driven stop.
//!
//! The server loop registers each accepted connection with a
//! [`ConnectionTracker`]. When the stop signal arrives the loop stops
//! accepting and waits, bounded by a grace period, for in-flight
//! connections to finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct TrackerState {
    active: AtomicU64,
    served: AtomicU64,
    idle: Notify,
}

/// Counts in-flight and total connections
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    state: Arc<TrackerState>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; it stays active until the guard is dropped
    pub fn track(&self) -> ConnectionGuard {
        self.state.active.fetch_add(1, Ordering::SeqCst);
        self.state.served.fetch_add(1, Ordering::Relaxed);
        ConnectionGuard {
            state: Arc::clone(&self.state),
        }
    }

    /// Number of connections currently being served
    pub fn active_count(&self) -> u64 {
        self.state.active.load(Ordering::Acquire)
    }

    /// Number of connections accepted since start
    pub fn served_count(&self) -> u64 {
        self.state.served.load(Ordering::Relaxed)
    }

    /// Wait until no connections are active.
    ///
    /// Returns true if drained within `grace`, false otherwise.
    pub async fn drain(&self, grace: Duration) -> bool {
        let wait = async {
            loop {
                let idle = self.state.idle.notified();
                if self.active_count() == 0 {
                    return;
                }
                idle.await;
            }
        };

        match tokio::time::timeout(grace, wait).await {
            Ok(()) => {
                info!("All connections drained");
                true
            }
            Err(_) => {
                warn!(
                    active = self.active_count(),
                    "Connection drain timeout reached"
                );
                false
            }
        }
    }
}

/// RAII registration of one connection
#[derive(Debug)]
pub struct ConnectionGuard {
    state: Arc<TrackerState>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.state.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.idle.notify_waiters();
        }
    }
}

/// Resolves on Ctrl+C (SIGINT); also on SIGTERM on Unix
pub async fn interrupt_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
