//! ekoDB Client Library
//!
//! Async client for ekoDB servers:
//! - Token acquisition with single-flight refresh
//! - Retries with backoff for rate limits, network and availability errors
//! - MessagePack bodies for record endpoints, JSON everywhere else
//! - Typed operations for records, key-value, transactions, search,
//!   functions and chat, plus a WebSocket query channel

mod api;
mod auth;
mod client;
mod error;
mod executor;
mod rate_limit;
pub mod serialization;
pub mod telemetry;
mod websocket;

pub use auth::{AuthError, TokenManager};
pub use client::Client;
pub use error::{classify_response, parse_retry_after, ClientError, ResponseClass, Result};
pub use executor::RequestExecutor;
pub use rate_limit::{RateLimitInfo, RateLimitTracker};
pub use websocket::WebSocketClient;

pub use ekodb_core::{chat, config, field, functions, models, query, schema, search};
pub use ekodb_core::*;
