//! Saved functions and the embedding helper built on them

use crate::client::{segment, with_query, Client, NO_BODY};
use crate::error::{ClientError, Result};
use ekodb_core::field::get_vector_value;
use ekodb_core::{
    FunctionResult, FunctionStage, InsertOptions, Record, SaveFunctionResponse, SavedFunction,
};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

impl Client {
    /// Store a function; returns its server id
    pub async fn save_function(&self, function: &SavedFunction) -> Result<String> {
        let response: SaveFunctionResponse = self
            .request(Method::POST, "/api/functions", Some(function))
            .await?;
        Ok(response.id)
    }

    pub async fn get_function(&self, label: &str) -> Result<SavedFunction> {
        let path = format!("/api/functions/{}", segment(label));
        self.request(Method::GET, &path, NO_BODY).await
    }

    /// All functions, or only those carrying one of `tags`
    pub async fn list_functions(&self, tags: &[String]) -> Result<Vec<SavedFunction>> {
        let mut pairs = Vec::new();
        if !tags.is_empty() {
            pairs.push(("tags", tags.join(",")));
        }
        let path = with_query("/api/functions".to_string(), &pairs);
        self.request(Method::GET, &path, NO_BODY).await
    }

    pub async fn update_function(&self, label: &str, function: &SavedFunction) -> Result<()> {
        let path = format!("/api/functions/{}", segment(label));
        self.send(Method::PUT, &path, Some(function)).await?;
        Ok(())
    }

    pub async fn delete_function(&self, label: &str) -> Result<()> {
        let path = format!("/api/functions/{}", segment(label));
        self.send(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }

    /// Run a function; missing parameters are sent as an empty object
    pub async fn call_function(
        &self,
        label: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<FunctionResult> {
        let path = format!("/api/functions/{}", segment(label));
        let params = params.unwrap_or_default();
        self.request(Method::POST, &path, Some(&params)).await
    }

    /// Embedding vector for `text` computed by the server
    ///
    /// Uses a temporary collection and function, both removed afterwards
    /// whether or not the call succeeded.
    pub async fn embed(&self, text: &str, model: &str) -> Result<Vec<f64>> {
        let nonce = Uuid::new_v4().simple().to_string();
        let temp_collection = format!("embed_temp_{}", nonce);

        let mut record = Record::new();
        record.insert("text".to_string(), Value::String(text.to_string()));
        self.insert(&temp_collection, record, InsertOptions::default())
            .await?;

        let function = SavedFunction::new(format!("embed_script_{}", nonce), "Generate Embedding")
            .with_stage(FunctionStage::find_all(temp_collection.clone()))
            .with_stage(FunctionStage::embed_field(
                "text",
                "embedding",
                Some(model.to_string()),
            ));

        let outcome = match self.save_function(&function).await {
            Ok(id) => {
                let called = self.call_function(&id, None).await;
                if let Err(err) = self.delete_function(&id).await {
                    warn!(function = %id, error = %err, "Failed to remove temporary function");
                }
                called
            }
            Err(err) => Err(err),
        };

        if let Err(err) = self.delete_collection(&temp_collection).await {
            warn!(collection = %temp_collection, error = %err, "Failed to remove temporary collection");
        }

        outcome?
            .records
            .first()
            .and_then(|record| record.get("embedding"))
            .and_then(get_vector_value)
            .ok_or_else(|| {
                ClientError::InvalidResponse("no embedding in function result".to_string())
            })
    }
}
