use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// A document as stored in a collection
pub type Record = HashMap<String, serde_json::Value>;

/// Errors raised while building request models
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid isolation level: {0} (must be one of: READ_UNCOMMITTED, READ_COMMITTED, REPEATABLE_READ, SERIALIZABLE)")]
    InvalidIsolationLevel(String),
}

/// Query-string pairs for an options struct
pub type QueryPairs = Vec<(&'static str, String)>;

fn push_flag(pairs: &mut QueryPairs, name: &'static str, value: Option<bool>) {
    if let Some(v) = value {
        pairs.push((name, v.to_string()));
    }
}

fn push_text(pairs: &mut QueryPairs, name: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        pairs.push((name, v.clone()));
    }
}

/// Optional parameters for an insert
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    /// Time-to-live, e.g. "1h" (stored on the record as `ttl`)
    pub ttl: Option<String>,
    pub bypass_ripple: Option<bool>,
    pub transaction_id: Option<String>,
    pub bypass_cache: Option<bool>,
}

impl InsertOptions {
    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_flag(&mut pairs, "bypass_ripple", self.bypass_ripple);
        push_text(&mut pairs, "transaction_id", &self.transaction_id);
        push_flag(&mut pairs, "bypass_cache", self.bypass_cache);
        pairs
    }
}

/// Optional parameters for an update
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub bypass_ripple: Option<bool>,
    pub transaction_id: Option<String>,
    pub bypass_cache: Option<bool>,
    pub select_fields: Vec<String>,
    pub exclude_fields: Vec<String>,
}

impl UpdateOptions {
    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_flag(&mut pairs, "bypass_ripple", self.bypass_ripple);
        push_text(&mut pairs, "transaction_id", &self.transaction_id);
        push_flag(&mut pairs, "bypass_cache", self.bypass_cache);
        for field in &self.select_fields {
            pairs.push(("select_fields", field.clone()));
        }
        for field in &self.exclude_fields {
            pairs.push(("exclude_fields", field.clone()));
        }
        pairs
    }
}

/// Optional parameters for a delete
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub bypass_ripple: Option<bool>,
    pub transaction_id: Option<String>,
}

impl DeleteOptions {
    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_flag(&mut pairs, "bypass_ripple", self.bypass_ripple);
        push_text(&mut pairs, "transaction_id", &self.transaction_id);
        pairs
    }
}

/// Optional parameters shared by batch insert/update/delete
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Applied to every item in the batch
    pub bypass_ripple: Option<bool>,
    pub transaction_id: Option<String>,
}

impl BatchOptions {
    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "transaction_id", &self.transaction_id);
        pairs
    }
}

/// Optional parameters for an upsert (update, falling back to insert)
#[derive(Debug, Clone, Default)]
pub struct UpsertOptions {
    pub ttl: Option<String>,
    pub bypass_ripple: Option<bool>,
    pub transaction_id: Option<String>,
    pub bypass_cache: Option<bool>,
}

impl UpsertOptions {
    pub fn update_options(&self) -> UpdateOptions {
        UpdateOptions {
            bypass_ripple: self.bypass_ripple,
            transaction_id: self.transaction_id.clone(),
            bypass_cache: self.bypass_cache,
            ..Default::default()
        }
    }

    pub fn insert_options(&self) -> InsertOptions {
        InsertOptions {
            ttl: self.ttl.clone(),
            bypass_ripple: self.bypass_ripple,
            transaction_id: self.transaction_id.clone(),
            bypass_cache: self.bypass_cache,
        }
    }
}

// Batch wire formats

#[derive(Debug, Clone, Serialize)]
pub struct BatchInsertItem {
    pub data: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_ripple: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchInsertRequest {
    pub inserts: Vec<BatchInsertItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateItem {
    pub id: String,
    pub data: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_ripple: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateRequest {
    pub updates: Vec<BatchUpdateItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchDeleteItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_ripple: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchDeleteRequest {
    pub deletes: Vec<BatchDeleteItem>,
}

/// Outcome of a batch operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(default)]
    pub successful: Vec<String>,
    #[serde(default)]
    pub failed: Vec<serde_json::Value>,
}

// Key-value store

/// One entry for a batch set
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub key: String,
    pub value: serde_json::Value,
    /// Seconds; the first entry carrying a TTL sets it for the whole batch
    pub ttl: Option<i64>,
}

impl KvEntry {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KvSetRequest {
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KvKeysRequest {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KvBatchSetRequest {
    pub keys: Vec<String>,
    pub values: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

impl KvBatchSetRequest {
    pub fn from_entries(entries: &[KvEntry]) -> Self {
        Self {
            keys: entries.iter().map(|e| e.key.clone()).collect(),
            values: entries.iter().map(|e| e.value.clone()).collect(),
            ttl: entries.iter().find_map(|e| e.ttl),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KvFindRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub include_expired: bool,
}

// Transactions

/// Transaction isolation level, serialized in the server's PascalCase form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl FromStr for IsolationLevel {
    type Err = ModelError;

    /// Accepts the upper-case names (`READ_COMMITTED`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ_UNCOMMITTED" => Ok(IsolationLevel::ReadUncommitted),
            "READ_COMMITTED" => Ok(IsolationLevel::ReadCommitted),
            "REPEATABLE_READ" => Ok(IsolationLevel::RepeatableRead),
            "SERIALIZABLE" => Ok(IsolationLevel::Serializable),
            other => Err(ModelError::InvalidIsolationLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BeginTransactionRequest {
    pub isolation_level: IsolationLevel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeginTransactionResponse {
    pub transaction_id: String,
}

// Collections and server status

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionsResponse {
    #[serde(default)]
    pub collections: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestoreResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub records_restored: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
}
