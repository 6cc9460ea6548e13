// Core library for the request inspector
// HTTP/1.x reading, the echo handler, the operator console and the server loop

pub mod console;
pub mod error;
pub mod message;
pub mod inspector;
pub mod logging;
pub mod parser;
pub mod render;
pub mod server;
pub mod shutdown;

// Re-export commonly used types
pub use console::*;
pub use error::*;
pub use message::*;
pub use inspector::*;
pub use parser::{ReadLimits, RequestHead};
pub use server::*;
pub use shutdown::{ConnectionGuard, ConnectionTracker, interrupt_signal};
