//! ekoDB Core Library
//!
//! Transport-free types shared by the ekoDB client:
//! - Client configuration and wire format selection
//! - Records and request options
//! - Query, search and schema builders
//! - Saved function pipelines and chat session models
//! - Wrapped field value helpers

pub mod chat;
pub mod config;
pub mod field;
pub mod functions;
pub mod models;
pub mod query;
pub mod schema;
pub mod search;

// Re-export commonly used types
pub use chat::*;
pub use config::{ClientConfig, SerializationFormat};
pub use functions::*;
pub use models::*;
pub use query::{Expression, JoinConfig, LogicalOperator, Operator, Query, QueryBuilder, SortField};
pub use schema::*;
pub use search::{SearchQuery, SearchQueryBuilder, SearchResponse, SearchResult};
