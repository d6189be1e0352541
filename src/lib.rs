//! Rust client library for the Aether OS REST API (v1) and its event stream.
//!
//! Public API layers:
//! - [`AetherClient`]/[`BlockingAetherClient`]: async and blocking clients with
//!   namespaced endpoint groups (`client.agents()`, `client.fs()`, ...).
//! - [`EventStream`]/[`BlockingEventStream`]: decoded Server-Sent Events from
//!   `GET /api/v1/events`.
//! - [`normalize_response`]: the success/failure rules applied to every
//!   response.
//! - [`ClientError`]: unified error type used by all clients.
//!
//! ```no_run
//! use aether_client::BlockingAetherClient;
//!
//! # fn main() -> Result<(), aether_client::ClientError> {
//! let client = BlockingAetherClient::new("http://localhost:3000")?.with_token("my-token");
//! let status = client.system().status()?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

mod blocking_client;
mod client;
mod config;
mod error;
mod events;
mod response;
mod session;

pub mod blocking_namespaces;
pub mod namespaces;
pub mod operations;
pub mod params;

/// Blocking client.
pub use blocking_client::BlockingAetherClient;
/// Async client.
pub use client::AetherClient;
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
/// Error type returned by all client operations.
pub use error::ClientError;
pub use events::{
    BlockingEventStream, EVENTS_PATH, Event, EventStream, MalformedEventHook, SseDecoder,
};
pub use operations::{ApiRequest, OperationDefinition};
pub use response::{normalize_response, unwrap_envelope};
