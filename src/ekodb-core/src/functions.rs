//! Saved functions: named server-side pipelines of stages

use crate::models::Record;
use crate::query::SortField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A literal value or a reference to a call parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum ParameterValue {
    Literal(Value),
    Parameter(String),
}

impl ParameterValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        ParameterValue::Literal(value.into())
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        ParameterValue::Parameter(name.into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParameterDefinition {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GroupOperation {
    Sum,
    Average,
    Count,
    Min,
    Max,
    First,
    Last,
    Push,
}

/// Aggregate computed by a `Group` stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupFunction {
    pub output_field: String,
    pub operation: GroupOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field: Option<String>,
}

/// Message passed to a `Chat` stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageChatMessage {
    pub role: ParameterValue,
    pub content: ParameterValue,
}

impl StageChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ParameterValue::literal(role.into()),
            content: ParameterValue::literal(content.into()),
        }
    }
}

/// One pipeline stage, serialized with its `"type"` beside the stage fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FunctionStage {
    FindAll {
        collection: String,
    },
    Query {
        collection: String,
        expression: Value,
    },
    Project {
        fields: Vec<String>,
    },
    Group {
        by_fields: Vec<String>,
        functions: Vec<GroupFunction>,
    },
    Count,
    Sort {
        fields: Vec<SortField>,
    },
    Insert {
        collection: String,
        data: Record,
        #[serde(default)]
        bypass_ripple: bool,
    },
    Delete {
        collection: String,
        id: ParameterValue,
        #[serde(default)]
        bypass_ripple: bool,
    },
    BatchInsert {
        collection: String,
        records: Vec<Record>,
        #[serde(default)]
        bypass_ripple: bool,
    },
    BatchDelete {
        collection: String,
        ids: Vec<ParameterValue>,
        #[serde(default)]
        bypass_ripple: bool,
    },
    HttpRequest {
        url: String,
        method: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headers: Option<HashMap<String, String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
    VectorSearch {
        collection: String,
        query_vector: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Value>,
    },
    TextSearch {
        collection: String,
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Value>,
    },
    HybridSearch {
        collection: String,
        text_query: String,
        vector_query: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Value>,
    },
    Chat {
        messages: Vec<StageChatMessage>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<f64>,
    },
    /// Either `texts` directly or `input_field` of each record
    Embed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        texts: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_field: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_field: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    /// Stale-while-revalidate fetch of an external URL, cached under `cache_key`
    #[serde(rename = "SWR")]
    Swr {
        cache_key: String,
        /// Duration string ("15m"), seconds, or an RFC 3339 expiry
        ttl: Value,
        url: String,
        method: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headers: Option<HashMap<String, String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_seconds: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_field: Option<String>,
        /// Audit collection for fetched responses
        #[serde(default, skip_serializing_if = "Option::is_none")]
        collection: Option<String>,
    },
}

impl FunctionStage {
    pub fn find_all(collection: impl Into<String>) -> Self {
        FunctionStage::FindAll {
            collection: collection.into(),
        }
    }

    pub fn project<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FunctionStage::Project {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Embed `input_field` of every record into `output_field`
    pub fn embed_field(
        input_field: impl Into<String>,
        output_field: impl Into<String>,
        model: Option<String>,
    ) -> Self {
        FunctionStage::Embed {
            texts: None,
            input_field: Some(input_field.into()),
            output_field: Some(output_field.into()),
            model,
        }
    }

    /// SWR stage with no optional fields set
    pub fn swr(
        cache_key: impl Into<String>,
        ttl: impl Into<Value>,
        url: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        FunctionStage::Swr {
            cache_key: cache_key.into(),
            ttl: ttl.into(),
            url: url.into(),
            method: method.into(),
            headers: None,
            body: None,
            timeout_seconds: None,
            output_field: None,
            collection: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedFunction {
    pub label: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub parameters: HashMap<String, ParameterDefinition>,
    #[serde(default)]
    pub pipeline: Vec<FunctionStage>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedFunction {
    pub fn new(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            description: None,
            version: "1.0".to_string(),
            parameters: HashMap::new(),
            pipeline: Vec::new(),
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_stage(mut self, stage: FunctionStage) -> Self {
        self.pipeline.push(stage);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, definition: ParameterDefinition) -> Self {
        self.parameters.insert(name.into(), definition);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: String,
    #[serde(default)]
    pub input_count: u64,
    #[serde(default)]
    pub output_count: u64,
    #[serde(default)]
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionStats {
    #[serde(default)]
    pub input_count: u64,
    #[serde(default)]
    pub output_count: u64,
    #[serde(default)]
    pub execution_time_ms: u64,
    #[serde(default)]
    pub stages_executed: u64,
    #[serde(default)]
    pub stage_stats: Vec<StageStats>,
}

/// Output of a function call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionResult {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub stats: FunctionStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveFunctionResponse {
    pub id: String,
}
