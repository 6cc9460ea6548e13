// Inspector - a debug HTTP backend that echoes what it receives, and a probe
// that measures how a load balancer spreads requests over such backends.

// Re-export the server side
pub use inspector_core::*;

pub use inspector_config as config;
pub use inspector_http_client as http_client;
pub use inspector_loadtest as loadtest;

/// Most-used types from every member crate
pub mod prelude {
    pub use inspector_config::{ConfigManager, Settings, Validate};
    pub use inspector_core::{
        ConsoleTarget, InspectedRequest, Inspector, InspectorServer, PostEcho, ServerConfig,
    };
    pub use inspector_http_client::{HttpClient, HttpClientConfig};
    pub use inspector_loadtest::{
        BackendTarget, LoadTestConfig, LoadTestReport, LoadTestRunner, Outcome,
    };
}
