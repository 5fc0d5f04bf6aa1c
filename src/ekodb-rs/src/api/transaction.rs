use crate::client::{segment, Client, NO_BODY};
use crate::error::Result;
use ekodb_core::{BeginTransactionRequest, BeginTransactionResponse, IsolationLevel, Record};
use reqwest::Method;
use tracing::debug;

impl Client {
    /// Start a transaction and return its id
    pub async fn begin_transaction(&self, isolation_level: IsolationLevel) -> Result<String> {
        let body = BeginTransactionRequest { isolation_level };
        let response: BeginTransactionResponse = self
            .request(Method::POST, "/api/transactions", Some(&body))
            .await?;
        debug!(transaction_id = %response.transaction_id, ?isolation_level, "Transaction started");
        Ok(response.transaction_id)
    }

    pub async fn transaction_status(&self, transaction_id: &str) -> Result<Record> {
        let path = format!("/api/transactions/{}", segment(transaction_id));
        self.request(Method::GET, &path, NO_BODY).await
    }

    pub async fn commit_transaction(&self, transaction_id: &str) -> Result<()> {
        let path = format!("/api/transactions/{}/commit", segment(transaction_id));
        self.send(Method::POST, &path, NO_BODY).await?;
        Ok(())
    }

    pub async fn rollback_transaction(&self, transaction_id: &str) -> Result<()> {
        let path = format!("/api/transactions/{}/rollback", segment(transaction_id));
        self.send(Method::POST, &path, NO_BODY).await?;
        Ok(())
    }
}
