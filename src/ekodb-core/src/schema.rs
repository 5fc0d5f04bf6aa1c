use crate::query::is_false;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorIndexAlgorithm {
    /// Brute force
    Flat,
    Hnsw,
    Ivf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Cosine,
    Euclidean,
    DotProduct,
}

/// Index declared on a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexConfig {
    #[serde(rename = "type")]
    pub index_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<VectorIndexAlgorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<DistanceMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ef_construction: Option<u32>,
}

impl IndexConfig {
    fn of_type(index_type: &str) -> Self {
        Self {
            index_type: index_type.to_string(),
            language: None,
            analyzer: None,
            algorithm: None,
            metric: None,
            m: None,
            ef_construction: None,
        }
    }
}

/// Type and constraints of one field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldTypeSchema {
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(default)]
    pub fields: HashMap<String, FieldTypeSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_ripple: Option<bool>,
}

/// Collection schema plus server-side analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub collection: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<Value>,
}

pub struct FieldTypeSchemaBuilder {
    schema: FieldTypeSchema,
}

impl FieldTypeSchemaBuilder {
    /// Start a field of the given type, e.g. `"String"` or `"Integer"`
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            schema: FieldTypeSchema {
                field_type: field_type.into(),
                default: None,
                unique: false,
                required: false,
                enums: Vec::new(),
                max: None,
                min: None,
                regex: None,
                index: None,
            },
        }
    }

    pub fn required(mut self) -> Self {
        self.schema.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.schema.unique = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.schema.default = Some(value.into());
        self
    }

    pub fn enums(mut self, values: Vec<Value>) -> Self {
        self.schema.enums = values;
        self
    }

    pub fn range(mut self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.schema.min = Some(min.into());
        self.schema.max = Some(max.into());
        self
    }

    pub fn pattern(mut self, regex: impl Into<String>) -> Self {
        self.schema.regex = Some(regex.into());
        self
    }

    pub fn text_index(mut self, language: impl Into<String>) -> Self {
        let mut index = IndexConfig::of_type("text");
        index.language = Some(language.into());
        self.schema.index = Some(index);
        self
    }

    pub fn vector_index(
        mut self,
        algorithm: VectorIndexAlgorithm,
        metric: DistanceMetric,
        m: u32,
        ef_construction: u32,
    ) -> Self {
        let mut index = IndexConfig::of_type("vector");
        index.algorithm = Some(algorithm);
        index.metric = Some(metric);
        index.m = Some(m);
        index.ef_construction = Some(ef_construction);
        self.schema.index = Some(index);
        self
    }

    pub fn btree_index(mut self) -> Self {
        self.schema.index = Some(IndexConfig::of_type("btree"));
        self
    }

    pub fn hash_index(mut self) -> Self {
        self.schema.index = Some(IndexConfig::of_type("hash"));
        self
    }

    pub fn build(self) -> FieldTypeSchema {
        self.schema
    }
}

/// Builds a [`Schema`]; starts at version 1 with ripple bypass enabled
pub struct SchemaBuilder {
    schema: Schema,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: Some(1),
                bypass_ripple: Some(true),
                ..Default::default()
            },
        }
    }

    pub fn add_field(mut self, name: impl Into<String>, field: FieldTypeSchema) -> Self {
        self.schema.fields.insert(name.into(), field);
        self
    }

    pub fn bypass_ripple(mut self, bypass: bool) -> Self {
        self.schema.bypass_ripple = Some(bypass);
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.schema.version = Some(version);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}
