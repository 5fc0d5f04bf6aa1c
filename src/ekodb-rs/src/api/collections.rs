//! Collections, schemas, trash and server health

use crate::client::{segment, Client, NO_BODY};
use crate::error::{ClientError, Result};
use ekodb_core::{CollectionMetadata, CollectionsResponse, HealthResponse, RestoreResponse, Schema};
use reqwest::Method;

impl Client {
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let response: CollectionsResponse = self
            .request(Method::GET, "/api/collections", NO_BODY)
            .await?;
        Ok(response.collections)
    }

    pub async fn create_collection(&self, collection: &str, schema: &Schema) -> Result<()> {
        let path = format!("/api/collections/{}", segment(collection));
        self.send(Method::POST, &path, Some(schema)).await?;
        Ok(())
    }

    pub async fn get_collection(&self, collection: &str) -> Result<CollectionMetadata> {
        let path = format!("/api/collections/{}", segment(collection));
        self.request(Method::GET, &path, NO_BODY).await
    }

    pub async fn get_schema(&self, collection: &str) -> Result<Schema> {
        Ok(self.get_collection(collection).await?.collection)
    }

    pub async fn delete_collection(&self, collection: &str) -> Result<()> {
        let path = format!("/api/collections/{}", segment(collection));
        self.send(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }

    /// Restore a deleted record from the trash
    pub async fn restore_record(&self, collection: &str, id: &str) -> Result<()> {
        let path = format!("/api/trash/{}/{}", segment(collection), segment(id));
        self.send(Method::POST, &path, NO_BODY).await?;
        Ok(())
    }

    /// Restore every trashed record of a collection; returns the count
    pub async fn restore_collection(&self, collection: &str) -> Result<u64> {
        let path = format!("/api/trash/{}", segment(collection));
        let response: RestoreResponse = self.request(Method::POST, &path, NO_BODY).await?;
        Ok(response.records_restored)
    }

    pub async fn health(&self) -> Result<()> {
        let response: HealthResponse = self.request(Method::GET, "/api/health", NO_BODY).await?;
        if response.status == "ok" {
            Ok(())
        } else {
            Err(ClientError::InvalidResponse(format!(
                "health check returned status {:?}",
                response.status
            )))
        }
    }
}
