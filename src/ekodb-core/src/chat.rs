use crate::models::{QueryPairs, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collection searched for chat context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionConfig {
    pub collection_name: String,
    #[serde(default)]
    pub fields: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_options: Option<Value>,
}

impl CollectionConfig {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            fields: Vec::new(),
            search_options: None,
        }
    }
}

/// Creates a session; also used to branch one via `parent_id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateChatSessionRequest {
    pub collections: Vec<CollectionConfig>,
    pub llm_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_ripple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_point_idx: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_context_messages: Option<usize>,
}

impl CreateChatSessionRequest {
    pub fn new(llm_provider: impl Into<String>, collections: Vec<CollectionConfig>) -> Self {
        Self {
            collections,
            llm_provider: llm_provider.into(),
            llm_model: None,
            system_prompt: None,
            bypass_ripple: None,
            parent_id: None,
            branch_point_idx: None,
            max_context_messages: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessageRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_ripple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_summarize: Option<bool>,
}

impl ChatMessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            bypass_ripple: None,
            force_summarize: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat_id: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub responses: Vec<String>,
    #[serde(default)]
    pub context_snippets: Vec<Value>,
    #[serde(default)]
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub chat_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub llm_provider: String,
    #[serde(default)]
    pub llm_model: String,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub message_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSessionResponse {
    pub session: Record,
    #[serde(default)]
    pub message_count: u64,
}

/// Paging for session and message listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    pub sort: Option<String>,
}

impl ListQuery {
    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    #[serde(default)]
    pub sessions: Vec<ChatSession>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub returned: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMessagesResponse {
    #[serde(default)]
    pub messages: Vec<Record>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default)]
    pub returned: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateSessionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MergeStrategy {
    Chronological,
    Summarized,
    LatestOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeSessionsRequest {
    pub source_chat_ids: Vec<String>,
    pub target_chat_id: String,
    pub merge_strategy: MergeStrategy,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleForgottenRequest {
    pub forgotten: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_session_omits_unset_fields() {
        let request =
            CreateChatSessionRequest::new("openai", vec![CollectionConfig::new("docs")]);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "collections": [{"collection_name": "docs", "fields": []}],
                "llm_provider": "openai"
            })
        );
    }

    #[test]
    fn test_list_query_pairs() {
        let query = ListQuery {
            limit: Some(10),
            sort: Some("desc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.query_pairs(),
            vec![("limit", "10".to_string()), ("sort", "desc".to_string())]
        );
    }

    #[test]
    fn test_merge_strategy_wire_names() {
        let request = MergeSessionsRequest {
            source_chat_ids: vec!["a".to_string(), "b".to_string()],
            target_chat_id: "c".to_string(),
            merge_strategy: MergeStrategy::LatestOnly,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["merge_strategy"], "LatestOnly");
    }
}
