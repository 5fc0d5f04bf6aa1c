use crate::models::Record;
use serde::{Deserialize, Serialize};

/// Full-text, vector or hybrid search request
///
/// Unset parameters are omitted so the server applies its own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    pub query: String,

    // Full-text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    /// Comma-separated field names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    /// Field weights, e.g. `"title:2.0,body:1.0"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_stemming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_exact: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_edit_distance: Option<u32>,

    // Vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_threshold: Option<f64>,

    // Hybrid weighting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_weight: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_ripple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// A single search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub record: Record,
    pub score: f64,
    #[serde(default)]
    pub matched_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took_ms: Option<u64>,
}

impl SearchResponse {
    /// Drop scores and keep the records
    pub fn into_records(self) -> Vec<Record> {
        self.results.into_iter().map(|r| r.record).collect()
    }
}

/// Fluent builder for [`SearchQuery`]
#[derive(Debug, Clone)]
pub struct SearchQueryBuilder {
    query: SearchQuery,
}

impl SearchQueryBuilder {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: SearchQuery {
                query: query.into(),
                ..Default::default()
            },
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.query.language = Some(language.into());
        self
    }

    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.query.case_sensitive = Some(enabled);
        self
    }

    pub fn fuzzy(mut self, enabled: bool) -> Self {
        self.query.fuzzy = Some(enabled);
        self
    }

    pub fn min_score(mut self, score: f64) -> Self {
        self.query.min_score = Some(score);
        self
    }

    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.query.fields = Some(fields.into());
        self
    }

    pub fn weights(mut self, weights: impl Into<String>) -> Self {
        self.query.weights = Some(weights.into());
        self
    }

    pub fn enable_stemming(mut self, enabled: bool) -> Self {
        self.query.enable_stemming = Some(enabled);
        self
    }

    pub fn boost_exact(mut self, enabled: bool) -> Self {
        self.query.boost_exact = Some(enabled);
        self
    }

    pub fn max_edit_distance(mut self, distance: u32) -> Self {
        self.query.max_edit_distance = Some(distance);
        self
    }

    pub fn vector(mut self, vector: Vec<f64>) -> Self {
        self.query.vector = Some(vector);
        self
    }

    pub fn vector_field(mut self, field: impl Into<String>) -> Self {
        self.query.vector_field = Some(field.into());
        self
    }

    pub fn vector_metric(mut self, metric: impl Into<String>) -> Self {
        self.query.vector_metric = Some(metric.into());
        self
    }

    /// Number of nearest neighbours
    pub fn vector_k(mut self, k: usize) -> Self {
        self.query.vector_k = Some(k);
        self
    }

    pub fn vector_threshold(mut self, threshold: f64) -> Self {
        self.query.vector_threshold = Some(threshold);
        self
    }

    pub fn text_weight(mut self, weight: f64) -> Self {
        self.query.text_weight = Some(weight);
        self
    }

    pub fn vector_weight(mut self, weight: f64) -> Self {
        self.query.vector_weight = Some(weight);
        self
    }

    pub fn bypass_ripple(mut self, bypass: bool) -> Self {
        self.query.bypass_ripple = Some(bypass);
        self
    }

    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.query.bypass_cache = Some(bypass);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn build(self) -> SearchQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_parameters_omitted() {
        let query = SearchQueryBuilder::new("rust").build();
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({"query": "rust"}));
    }

    #[test]
    fn test_hybrid_query() {
        let query = SearchQueryBuilder::new("async io")
            .vector(vec![0.1, 0.2])
            .vector_k(5)
            .text_weight(0.3)
            .vector_weight(0.7)
            .limit(10)
            .build();
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["vector"], json!([0.1, 0.2]));
        assert_eq!(body["vector_k"], json!(5));
        assert_eq!(body["text_weight"], json!(0.3));
        assert_eq!(body["limit"], json!(10));
        assert!(body.get("fuzzy").is_none());
    }

    #[test]
    fn test_response_into_records() {
        let response: SearchResponse = serde_json::from_value(json!({
            "results": [
                {"record": {"id": "a"}, "score": 0.9, "matched_fields": ["title"]},
                {"record": {"id": "b"}, "score": 0.4}
            ],
            "total": 2
        }))
        .unwrap();
        assert_eq!(response.took_ms, None);
        let records = response.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], json!("b"));
    }
}
