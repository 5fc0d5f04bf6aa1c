//! Typed operations, one `impl Client` block per concern

mod chat;
mod collections;
mod functions;
mod kv;
mod search;
mod transaction;
