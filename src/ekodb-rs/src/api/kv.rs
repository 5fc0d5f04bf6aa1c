//! Key-value store

use crate::client::{segment, Client, NO_BODY};
use crate::error::Result;
use ekodb_core::{KvBatchSetRequest, KvEntry, KvFindRequest, KvKeysRequest, KvSetRequest, Record};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct KvValue {
    #[serde(default)]
    value: Value,
}

impl Client {
    pub async fn kv_set(&self, key: &str, value: Value) -> Result<()> {
        let body = KvSetRequest { value, ttl: None };
        self.send(Method::POST, &format!("/api/kv/set/{}", segment(key)), Some(&body))
            .await?;
        Ok(())
    }

    /// Set a value that expires after `ttl_secs`
    pub async fn kv_set_with_ttl(&self, key: &str, value: Value, ttl_secs: i64) -> Result<()> {
        let body = KvSetRequest {
            value,
            ttl: Some(ttl_secs),
        };
        self.send(Method::POST, &format!("/api/kv/set/{}", segment(key)), Some(&body))
            .await?;
        Ok(())
    }

    pub async fn kv_get(&self, key: &str) -> Result<Value> {
        let response: KvValue = self
            .request(Method::GET, &format!("/api/kv/get/{}", segment(key)), NO_BODY)
            .await?;
        Ok(response.value)
    }

    pub async fn kv_delete(&self, key: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("/api/kv/delete/{}", segment(key)), NO_BODY)
            .await?;
        Ok(())
    }

    pub async fn kv_exists(&self, key: &str) -> Result<bool> {
        match self.kv_get(key).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn kv_batch_get(&self, keys: Vec<String>) -> Result<Vec<Record>> {
        self.request(Method::POST, "/api/kv/batch/get", Some(&KvKeysRequest { keys }))
            .await
    }

    /// Set many keys at once; the first entry carrying a TTL sets it for all
    pub async fn kv_batch_set(&self, entries: &[KvEntry]) -> Result<Vec<Value>> {
        let body = KvBatchSetRequest::from_entries(entries);
        self.request(Method::POST, "/api/kv/batch/set", Some(&body))
            .await
    }

    pub async fn kv_batch_delete(&self, keys: Vec<String>) -> Result<Vec<Value>> {
        self.request(Method::DELETE, "/api/kv/batch/delete", Some(&KvKeysRequest { keys }))
            .await
    }

    /// Entries whose key matches `pattern` (all entries when `None`)
    pub async fn kv_find(&self, pattern: Option<&str>, include_expired: bool) -> Result<Vec<Record>> {
        let body = KvFindRequest {
            pattern: pattern.map(str::to_string),
            include_expired,
        };
        self.request(Method::POST, "/api/kv/find", Some(&body)).await
    }

    /// Alias of [`Client::kv_find`]
    pub async fn kv_query(&self, pattern: Option<&str>, include_expired: bool) -> Result<Vec<Record>> {
        self.kv_find(pattern, include_expired).await
    }
}
