use crate::client::{segment, Client};
use crate::error::Result;
use ekodb_core::{Record, SearchQuery, SearchQueryBuilder, SearchResponse};
use reqwest::Method;

impl Client {
    /// Full-text, vector or hybrid search with scores
    pub async fn search(&self, collection: &str, query: &SearchQuery) -> Result<SearchResponse> {
        let path = format!("/api/search/{}", segment(collection));
        self.request(Method::POST, &path, Some(query)).await
    }

    /// Records matching `text`, best first
    pub async fn text_search(&self, collection: &str, text: &str, limit: usize) -> Result<Vec<Record>> {
        let query = SearchQueryBuilder::new(text).limit(limit).build();
        Ok(self.search(collection, &query).await?.into_records())
    }

    /// Records ranked by both `text` and similarity to `vector`
    pub async fn hybrid_search(
        &self,
        collection: &str,
        text: &str,
        vector: Vec<f64>,
        limit: usize,
    ) -> Result<Vec<Record>> {
        let query = SearchQueryBuilder::new(text)
            .vector(vector)
            .limit(limit)
            .build();
        Ok(self.search(collection, &query).await?.into_records())
    }
}
