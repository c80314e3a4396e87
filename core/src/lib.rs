//! API client core for the conference companion app.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), so the same core serves
//! native hosts that bring their own HTTP stack. `KonfApi` adds an optional
//! executing layer with plain-callback variants for native consumers.
//!
//! # Design
//! - `KonfClient` is stateless apart from `base_url` and the user id, which
//!   is also the bearer token.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O boundary
//!   is explicit.
//! - `sessions` holds the schedule-screen model: grouping by start time,
//!   favorites filtering, bounds-checked lookups.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod sessions;
pub mod transport;
pub mod types;

pub use api::KonfApi;
pub use client::KonfClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use sessions::{group_by_start_time, SessionTable, SessionsMode};
pub use transport::{Transport, UreqTransport};
pub use types::{AllData, Favorite, Rating, Room, Session, Speaker, Vote};

/// A fresh random user id, generated once on first launch and reused as the
/// bearer token from then on.
pub fn new_user_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
