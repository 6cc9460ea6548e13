//! # Inspector HTTP Client
//!
//! A small `reqwest` wrapper that buffers each response and records how
//! long the exchange took, from sending the request to the last body byte.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inspector_http_client::{HttpClient, HttpClientConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(
//!         HttpClientConfig::builder()
//!             .timeout(Duration::from_secs(10))
//!             .build(),
//!     )?;
//!
//!     let response = client.get("http://127.0.0.1:3000/").send().await?;
//!     println!(
//!         "{} from {:?} in {:?}",
//!         response.status(),
//!         response.header("X-Backend-Server"),
//!         response.elapsed()
//!     );
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use request::RequestBuilder;
pub use response::Response;
