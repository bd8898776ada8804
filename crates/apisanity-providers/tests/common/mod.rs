// crates/apisanity-providers/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Local HTTP targets for provider integration tests.
// Purpose: Run tiny_http servers that record requests and answer by closure.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! Starts a background `tiny_http` server per test. Every request is recorded
//! and answered by a caller-supplied closure.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Recorded Requests
// ============================================================================

/// Request observed by a [`TestServer`].
#[derive(Debug, Clone)]
pub struct SeenRequest {
    /// Uppercase method.
    pub method: String,
    /// Raw request target including the query string.
    pub url: String,
    /// Header pairs with lowercase names.
    pub headers: Vec<(String, String)>,
    /// Request body as text.
    pub body: String,
}

impl SeenRequest {
    /// Returns the first header value with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }

    /// Returns the path component of the request target.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// Returns the value of a query parameter, undecoded.
    pub fn query(&self, name: &str) -> Option<&str> {
        let (_, query) = self.url.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }
}

/// Reply produced by a test handler: status, body, content type.
pub type Reply = (u16, String, &'static str);

// ============================================================================
// SECTION: Server
// ============================================================================

/// Background HTTP target bound to a random local port.
pub struct TestServer {
    /// Base URL of the server.
    pub base_url: String,
    /// Requests seen so far.
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl TestServer {
    /// Starts a server answering each request with `handler`.
    pub fn start(handler: impl Fn(&SeenRequest) -> Reply + Send + 'static) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let observed = SeenRequest {
                    method: request.method().as_str().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| {
                            (
                                header.field.as_str().as_str().to_ascii_lowercase(),
                                header.value.as_str().to_string(),
                            )
                        })
                        .collect(),
                    body,
                };
                let (status, text, content_type) = handler(&observed);
                log.lock().unwrap().push(observed);
                let header =
                    Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()).unwrap();
                let response =
                    Response::from_string(text).with_status_code(status).with_header(header);
                let _ = request.respond(response);
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    /// Returns every request seen so far.
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

/// Builds a JSON reply.
pub fn json_reply(status: u16, body: &str) -> Reply {
    (status, body.to_string(), "application/json")
}
