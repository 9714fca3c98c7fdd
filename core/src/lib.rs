//! Blocking API client for the PetFriends pet catalog service.
//!
//! # Overview
//! Every operation follows the same pipeline: build an `HttpRequest` as plain
//! data, execute it with `HttpExecutor`, then `normalize` the raw response
//! into an `ApiResult { status, payload }`. The payload is structured JSON
//! when the body parses, otherwise the body text.
//!
//! # Design
//! - Non-2xx statuses are results, not errors. `TransportError` is reserved
//!   for failing to complete the round trip (network, timeout, unreadable
//!   photo file).
//! - `PetClient` holds only the base URL and its executor; the `AuthToken`
//!   is passed by reference into each call and never mutated.
//! - Builders are pure, so request shapes are tested without a server.

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod payload;
pub mod transport;
pub mod types;

pub use auth::{auth_header, AuthToken, Credentials};
pub use client::PetClient;
pub use error::TransportError;
pub use http::{FilePart, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use payload::{normalize, ApiResult, Payload};
pub use transport::HttpExecutor;
pub use types::{PetFields, PetFilter, PetRecord};
