//! Operator console output.
//!
//! Each inspected request is written as one report block and flushed before
//! the response goes out. This is separate from `tracing`: the report is
//! the product, diagnostics are not. Write failures are swallowed.

use crate::InspectedRequest;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

const RULE_WIDTH: usize = 50;

/// Where request reports are written
#[derive(Debug, Clone, Default)]
pub enum ConsoleTarget {
    /// Process STDOUT (default)
    #[default]
    Stdout,
    /// Process STDERR
    Stderr,
    /// In-memory buffer, shared with the caller
    Memory(Arc<Mutex<Vec<u8>>>),
    /// Drop all output
    Discard,
}

impl ConsoleTarget {
    /// Create an in-memory target and return it with a handle to its buffer
    pub fn memory() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (ConsoleTarget::Memory(Arc::clone(&buffer)), buffer)
    }
}

/// Synchronous, immediately flushed report writer
#[derive(Debug, Clone, Default)]
pub struct Console {
    target: ConsoleTarget,
}

impl Console {
    pub fn new(target: ConsoleTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &ConsoleTarget {
        &self.target
    }

    /// Write a block of text and flush it
    pub fn write_block(&self, text: &str) {
        match &self.target {
            ConsoleTarget::Stdout => {
                let mut out = io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            ConsoleTarget::Stderr => {
                let mut out = io::stderr().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            ConsoleTarget::Memory(buffer) => {
                if let Ok(mut buffer) = buffer.lock() {
                    buffer.extend_from_slice(text.as_bytes());
                }
            }
            ConsoleTarget::Discard => {}
        }
    }

    pub fn report(&self, port: u16, request: &InspectedRequest) {
        self.write_block(&RequestReport::new(port, request).render());
    }
}

/// Human-readable description of one request
pub struct RequestReport<'a> {
    port: u16,
    request: &'a InspectedRequest,
}

impl<'a> RequestReport<'a> {
    pub fn new(port: u16, request: &'a InspectedRequest) -> Self {
        Self { port, request }
    }

    pub fn title(&self) -> String {
        format!("{} REQUEST RECEIVED", self.request.method.to_uppercase())
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let req = self.request;
        let mut out = String::with_capacity(512);

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{}", self.title());
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "SERVER PORT: {}", self.port);
        let _ = writeln!(out, "PATH: {}", req.target);
        let _ = writeln!(out, "METHOD: {}", req.method);
        let _ = writeln!(out, "CLIENT: {}", req.client_addr);
        let _ = writeln!(out);
        let _ = writeln!(out, "HEADERS:");
        for (name, value) in &req.headers {
            let _ = writeln!(out, "  {}: {}", name, value);
        }
        if req.method == "POST" {
            let _ = writeln!(out);
            let _ = writeln!(out, "BODY: {}", req.body_lossy());
        }
        let _ = writeln!(out, "{}", rule);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str) -> InspectedRequest {
        InspectedRequest::new(method, "/probe?x=1", "192.168.1.9:51000".parse().unwrap())
            .with_header("Host", "lb.local")
            .with_header("X-Forwarded-For", "10.1.1.1")
    }

    #[test]
    fn test_report_layout() {
        let text = RequestReport::new(8082, &request("GET")).render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "=".repeat(50));
        assert_eq!(lines[2], "GET REQUEST RECEIVED");
        assert_eq!(lines[4], "SERVER PORT: 8082");
        assert_eq!(lines[5], "PATH: /probe?x=1");
        assert_eq!(lines[6], "METHOD: GET");
        assert_eq!(lines[7], "CLIENT: 192.168.1.9:51000");
        assert_eq!(lines[9], "HEADERS:");
        assert_eq!(lines[10], "  Host: lb.local");
        assert_eq!(lines[11], "  X-Forwarded-For: 10.1.1.1");
        assert_eq!(lines[12], "=".repeat(50));
        assert!(!text.contains("BODY:"));
    }

    #[test]
    fn test_post_report_includes_body() {
        let req = request("POST").with_body(&b"{\"a\":1}"[..]);
        let text = RequestReport::new(8081, &req).render();
        assert!(text.contains("POST REQUEST RECEIVED"));
        assert!(text.contains("BODY: {\"a\":1}"));
    }

    #[test]
    fn test_memory_console_collects_reports() {
        let (target, buffer) = ConsoleTarget::memory();
        let console = Console::new(target);
        console.report(8081, &request("HEAD"));
        console.report(8081, &request("GET"));

        let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(text.contains("HEAD REQUEST RECEIVED"));
        assert!(text.contains("GET REQUEST RECEIVED"));
    }

    #[test]
    fn test_discard_console_is_silent() {
        Console::new(ConsoleTarget::Discard).report(1, &request("GET"));
    }
}
