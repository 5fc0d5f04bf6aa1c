use crate::auth::TokenManager;
use crate::error::{ClientError, Result};
use crate::executor::RequestExecutor;
use crate::rate_limit::{RateLimitInfo, RateLimitTracker};
use crate::serialization;
use ekodb_core::{
    BatchDeleteItem, BatchDeleteRequest, BatchInsertItem, BatchInsertRequest, BatchOptions,
    BatchResult, BatchUpdateItem, BatchUpdateRequest, ClientConfig, DeleteOptions, InsertOptions,
    Query, QueryBuilder, QueryPairs, Record, UpdateOptions, UpsertOptions,
};
use reqwest::{Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Placeholder for requests without a body
pub(crate) const NO_BODY: Option<&()> = None;

/// ekoDB API client
///
/// Cheap to clone; clones share the token and the rate-limit snapshot.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    tokens: Arc<TokenManager>,
    rate_limits: Arc<RateLimitTracker>,
    executor: RequestExecutor,
}

impl Client {
    /// Build a client and acquire the initial token
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let config = Arc::new(config);
        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            config.trimmed_base_url(),
            config.api_key.clone(),
        ));
        let rate_limits = Arc::new(RateLimitTracker::new());

        tokens.refresh().await?;

        info!(
            base_url = %config.trimmed_base_url(),
            api_key = %config.redacted_api_key(),
            max_retries = config.max_retries,
            "Connected to ekoDB"
        );
        debug!(
            preferred_format = %config.format,
            "Body encoding is chosen per endpoint"
        );

        let executor = RequestExecutor::new(http, config.clone(), tokens.clone(), rate_limits.clone());

        Ok(Self {
            config,
            tokens,
            rate_limits,
            executor,
        })
    }

    /// Connect with default settings
    pub async fn connect(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(base_url, api_key)).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current bearer token
    pub async fn token(&self) -> String {
        self.tokens.token().await
    }

    /// Unconditionally fetch a new token
    pub async fn refresh_token(&self) -> Result<()> {
        self.tokens.refresh().await?;
        Ok(())
    }

    pub fn rate_limit_info(&self) -> Option<RateLimitInfo> {
        self.rate_limits.info()
    }

    pub fn is_near_rate_limit(&self) -> bool {
        self.rate_limits.is_near_limit()
    }

    pub fn is_rate_limit_exceeded(&self) -> bool {
        self.rate_limits.is_exceeded()
    }

    // Request plumbing shared by the per-concern modules

    pub(crate) async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let encoded = body
            .map(|value| serialization::serialize(path, value))
            .transpose()?;
        self.executor.execute(method, path, encoded).await
    }

    pub(crate) async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.send(method, path, body).await?;
        serialization::deserialize(path, &bytes)
    }

    // Records

    /// Insert a record and return it as stored
    pub async fn insert(&self, collection: &str, mut record: Record, options: InsertOptions) -> Result<Record> {
        if let Some(ttl) = &options.ttl {
            record.insert("ttl".to_string(), Value::String(ttl.clone()));
        }
        let path = with_query(
            format!("/api/insert/{}", segment(collection)),
            &options.query_pairs(),
        );
        self.request(Method::POST, &path, Some(&record)).await
    }

    pub async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Record>> {
        let path = format!("/api/find/{}", segment(collection));
        self.request(Method::POST, &path, Some(query)).await
    }

    pub async fn find_by_id(&self, collection: &str, id: &str) -> Result<Record> {
        let path = format!("/api/find/{}/{}", segment(collection), segment(id));
        self.request(Method::GET, &path, NO_BODY).await
    }

    /// Fetch one record by id, returning only the selected fields
    pub async fn find_by_id_with_projection(
        &self,
        collection: &str,
        id: &str,
        select_fields: &[String],
        exclude_fields: &[String],
    ) -> Result<Record> {
        let query = QueryBuilder::new()
            .eq("id", id)
            .limit(1)
            .select_fields(select_fields.iter().cloned())
            .exclude_fields(exclude_fields.iter().cloned())
            .build();

        self.find(collection, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Http {
                status: 404,
                message: "document not found".to_string(),
            })
    }

    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        record: &Record,
        options: UpdateOptions,
    ) -> Result<Record> {
        let path = with_query(
            format!("/api/update/{}/{}", segment(collection), segment(id)),
            &options.query_pairs(),
        );
        self.request(Method::PUT, &path, Some(record)).await
    }

    pub async fn delete(&self, collection: &str, id: &str, options: DeleteOptions) -> Result<()> {
        let path = with_query(
            format!("/api/delete/{}/{}", segment(collection), segment(id)),
            &options.query_pairs(),
        );
        self.send(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }

    /// Insert many records; returns the ids that were created
    pub async fn batch_insert(
        &self,
        collection: &str,
        records: Vec<Record>,
        options: BatchOptions,
    ) -> Result<Vec<String>> {
        let body = BatchInsertRequest {
            inserts: records
                .into_iter()
                .map(|data| BatchInsertItem {
                    data,
                    bypass_ripple: options.bypass_ripple,
                })
                .collect(),
        };
        let path = with_query(
            format!("/api/batch/insert/{}", segment(collection)),
            &options.query_pairs(),
        );
        let result: BatchResult = self.request(Method::POST, &path, Some(&body)).await?;
        Ok(result.successful)
    }

    /// Apply `(id, changes)` pairs; returns the ids that were updated
    pub async fn batch_update(
        &self,
        collection: &str,
        updates: Vec<(String, Record)>,
        options: BatchOptions,
    ) -> Result<Vec<String>> {
        let body = BatchUpdateRequest {
            updates: updates
                .into_iter()
                .map(|(id, data)| BatchUpdateItem {
                    id,
                    data,
                    bypass_ripple: options.bypass_ripple,
                })
                .collect(),
        };
        let path = with_query(
            format!("/api/batch/update/{}", segment(collection)),
            &options.query_pairs(),
        );
        let result: BatchResult = self.request(Method::PUT, &path, Some(&body)).await?;
        Ok(result.successful)
    }

    /// Delete many records; returns how many were removed
    pub async fn batch_delete(
        &self,
        collection: &str,
        ids: Vec<String>,
        options: BatchOptions,
    ) -> Result<usize> {
        let body = BatchDeleteRequest {
            deletes: ids
                .into_iter()
                .map(|id| BatchDeleteItem {
                    id,
                    bypass_ripple: options.bypass_ripple,
                })
                .collect(),
        };
        let path = with_query(
            format!("/api/batch/delete/{}", segment(collection)),
            &options.query_pairs(),
        );
        let result: BatchResult = self.request(Method::DELETE, &path, Some(&body)).await?;
        Ok(result.successful.len())
    }

    // Convenience operations

    /// Update the record, inserting it under `id` if it does not exist
    pub async fn upsert(
        &self,
        collection: &str,
        id: &str,
        mut record: Record,
        options: UpsertOptions,
    ) -> Result<Record> {
        match self
            .update(collection, id, &record, options.update_options())
            .await
        {
            Err(err) if err.is_not_found() => {
                debug!(collection, id, "Record missing, inserting instead");
                record.insert("id".to_string(), Value::String(id.to_string()));
                self.insert(collection, record, options.insert_options())
                    .await
            }
            other => other,
        }
    }

    pub async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        match self.find_by_id(collection, id).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// First record whose `field` equals `value`
    pub async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Record>> {
        let query = QueryBuilder::new().eq(field, value).limit(1).build();
        Ok(self.find(collection, &query).await?.into_iter().next())
    }

    /// One-indexed page of records
    pub async fn paginate(&self, collection: &str, page: usize, page_size: usize) -> Result<Vec<Record>> {
        if page < 1 {
            return Err(ClientError::InvalidArgument(format!(
                "page must be >= 1, got {}",
                page
            )));
        }
        if page_size < 1 {
            return Err(ClientError::InvalidArgument(format!(
                "page_size must be >= 1, got {}",
                page_size
            )));
        }

        let skip = (page - 1).checked_mul(page_size).ok_or_else(|| {
            ClientError::InvalidArgument(format!(
                "page {} with page_size {} is out of range",
                page, page_size
            ))
        })?;

        let query = QueryBuilder::new().limit(page_size).skip(skip).build();
        self.find(collection, &query).await
    }

    pub async fn find_all(&self, collection: &str, limit: usize) -> Result<Vec<Record>> {
        self.find(collection, &Query::with_limit(limit)).await
    }
}

/// Percent-encode one path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Append query-string pairs to a path
pub(crate) fn with_query(path: String, pairs: &QueryPairs) -> String {
    if pairs.is_empty() {
        return path;
    }
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        query.append_pair(name, value);
    }
    format!("{}?{}", path, query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_encodes_pairs() {
        let pairs: QueryPairs = vec![
            ("transaction_id", "tx 1".to_string()),
            ("select_fields", "a".to_string()),
            ("select_fields", "b".to_string()),
        ];
        assert_eq!(
            with_query("/api/update/users/1".to_string(), &pairs),
            "/api/update/users/1?transaction_id=tx+1&select_fields=a&select_fields=b"
        );
        assert_eq!(with_query("/api/health".to_string(), &Vec::new()), "/api/health");
    }

    #[test]
    fn test_segment_escapes_reserved_characters() {
        assert_eq!(segment("user:42/profile"), "user%3A42%2Fprofile");
        assert_eq!(segment("plain-key_1"), "plain-key_1");
    }
}
