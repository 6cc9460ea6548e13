// Inspector HTTP server: accept loop and per-connection handling

use crate::parser::{ReadLimits, read_request};
use crate::shutdown::{ConnectionTracker, interrupt_signal};
use crate::{Console, ConsoleTarget, DEFAULT_BACKEND_NAME, Error, Inspector, Result};
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8081;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    /// Port to bind; `0` picks a free port, which is then reported as the
    /// backend port
    pub port: u16,
    /// `<impl>` part of the `X-Backend-Server` value
    pub backend_name: String,
    pub console: ConsoleTarget,
    pub limits: ReadLimits,
    /// Deadline for reading a full request; `None` waits forever
    pub read_timeout: Option<Duration>,
    /// Grace period for in-flight connections after an interrupt
    pub drain_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            backend_name: DEFAULT_BACKEND_NAME.to_string(),
            console: ConsoleTarget::Stdout,
            limits: ReadLimits::default(),
            read_timeout: Some(Duration::from_secs(30)),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    pub fn host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend_name = name.into();
        self
    }

    pub fn console(mut self, console: ConsoleTarget) -> Self {
        self.console = console;
        self
    }

    pub fn limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }
}

/// A bound inspector server
pub struct InspectorServer {
    listener: TcpListener,
    inspector: Arc<Inspector>,
    config: Arc<ServerConfig>,
    tracker: ConnectionTracker,
}

impl InspectorServer {
    /// Bind the listening socket
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(config.host, config.port)).await?;
        let port = listener.local_addr()?.port();

        let inspector = Inspector::new(
            port,
            config.backend_name.clone(),
            Console::new(config.console.clone()),
        );

        Ok(Self {
            listener,
            inspector: Arc::new(inspector),
            config: Arc::new(config),
            tracker: ConnectionTracker::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The port responses report, i.e. the port actually bound
    pub fn port(&self) -> u16 {
        self.inspector.port()
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Startup text for the operator
    pub fn banner(&self) -> String {
        let port = self.port();
        format!(
            "Header inspector (threaded) running on port {port}\n\
             Use: curl http://localhost:{port}\n\
             Or open: http://localhost:{port} in a browser\n\
             Press Ctrl+C to stop the server\n"
        )
    }

    /// Serve until Ctrl+C or SIGTERM
    pub async fn run(self) -> Result<()> {
        self.run_until(interrupt_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight connections
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let InspectorServer {
            listener,
            inspector,
            config,
            tracker,
        } = self;

        info!(
            addr = %listener.local_addr()?,
            backend = %inspector.backend_id(),
            "Inspector listening"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let guard = tracker.track();
                        let inspector = Arc::clone(&inspector);
                        let config = Arc::clone(&config);

                        tokio::spawn(async move {
                            serve_connection(stream, peer, &inspector, &config).await;
                            drop(guard);
                        });
                    }
                    Err(e) => {
                        // Typically EMFILE; back off briefly instead of spinning
                        warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
            }
        }

        drop(listener);
        tracker.drain(config.drain_timeout).await;

        info!(
            port = inspector.port(),
            connections = tracker.served_count(),
            "Inspector stopped"
        );
        Ok(())
    }
}

/// Read one request, answer it, close the connection
async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    inspector: &Inspector,
    config: &ServerConfig,
) {
    debug!(%peer, "Connection accepted");

    let read = read_request(&mut stream, peer, &config.limits);
    let outcome = match config.read_timeout {
        Some(limit) => match tokio::time::timeout(limit, read).await {
            Ok(result) => result,
            Err(_) => Err(Error::RequestTimeout(format!(
                "No complete request within {:?}",
                limit
            ))),
        },
        None => read.await,
    };

    let response = match outcome {
        Ok(request) => inspector.handle(&request),
        Err(err) if err.is_answerable() => {
            warn!(%peer, error = %err, "Rejected request");
            inspector.error_response(&err)
        }
        Err(err) => {
            debug!(%peer, error = %err, "Connection ended without a request");
            return;
        }
    };

    if let Err(e) = stream.write_all(&response.encode()).await {
        debug!(%peer, error = %e, "Failed to write response");
        return;
    }
    let _ = stream.shutdown().await;
}
