use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

/// Filter expression tree
///
/// Serialized as `{"type": "Condition", "content": {...}}` or
/// `{"type": "Logical", "content": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "content")]
pub enum Expression {
    Condition {
        field: String,
        operator: Operator,
        value: Value,
    },
    Logical {
        operator: LogicalOperator,
        expressions: Vec<Expression>,
    },
}

impl Expression {
    pub fn condition(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Expression::Condition {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn and(expressions: Vec<Expression>) -> Self {
        Expression::Logical {
            operator: LogicalOperator::And,
            expressions,
        }
    }

    pub fn or(expressions: Vec<Expression>) -> Self {
        Expression::Logical {
            operator: LogicalOperator::Or,
            expressions,
        }
    }

    pub fn not(expression: Expression) -> Self {
        Expression::Logical {
            operator: LogicalOperator::Not,
            expressions: vec![expression],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub ascending: bool,
}

/// Cross-collection join
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinConfig {
    pub collections: Vec<String>,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
}

impl JoinConfig {
    pub fn new(
        collections: Vec<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        Self {
            collections,
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        }
    }

    /// Join against a single collection
    pub fn single(
        collection: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        Self::new(vec![collection.into()], local_field, foreign_field, as_field)
    }
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Body of a find request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Expression>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinConfig>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bypass_cache: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bypass_ripple: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_fields: Vec<String>,
}

impl Query {
    /// Query returning at most `limit` records
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

/// Fluent builder for [`Query`]
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    filters: Vec<Expression>,
    sort: Vec<SortField>,
    limit: Option<usize>,
    skip: Option<usize>,
    join: Option<JoinConfig>,
    bypass_cache: bool,
    bypass_ripple: bool,
    select_fields: Vec<String>,
    exclude_fields: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn condition(mut self, field: impl Into<String>, operator: Operator, value: Value) -> Self {
        self.filters
            .push(Expression::condition(field, operator, value));
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Eq, value.into())
    }

    pub fn ne(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Ne, value.into())
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Gt, value.into())
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Gte, value.into())
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Lt, value.into())
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Lte, value.into())
    }

    pub fn in_array(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.condition(field, Operator::In, Value::Array(values))
    }

    pub fn not_in(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.condition(field, Operator::NotIn, Value::Array(values))
    }

    /// Substring match
    pub fn contains(self, field: impl Into<String>, substring: impl Into<String>) -> Self {
        self.condition(field, Operator::Contains, Value::String(substring.into()))
    }

    pub fn starts_with(self, field: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.condition(field, Operator::StartsWith, Value::String(prefix.into()))
    }

    pub fn ends_with(self, field: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.condition(field, Operator::EndsWith, Value::String(suffix.into()))
    }

    pub fn regex(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.condition(field, Operator::Regex, Value::String(pattern.into()))
    }

    pub fn and(mut self, expressions: Vec<Expression>) -> Self {
        self.filters.push(Expression::and(expressions));
        self
    }

    pub fn or(mut self, expressions: Vec<Expression>) -> Self {
        self.filters.push(Expression::or(expressions));
        self
    }

    pub fn not(mut self, expression: Expression) -> Self {
        self.filters.push(Expression::not(expression));
        self
    }

    /// Add a prebuilt expression
    pub fn filter(mut self, expression: Expression) -> Self {
        self.filters.push(expression);
        self
    }

    pub fn sort_asc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            ascending: true,
        });
        self
    }

    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Zero-indexed page: skips `page * page_size` records
    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.skip = Some(page.saturating_mul(page_size));
        self.limit = Some(page_size);
        self
    }

    pub fn join(mut self, join: JoinConfig) -> Self {
        self.join = Some(join);
        self
    }

    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.bypass_cache = bypass;
        self
    }

    pub fn bypass_ripple(mut self, bypass: bool) -> Self {
        self.bypass_ripple = bypass;
        self
    }

    pub fn select_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Multiple filters are combined under a single `And`
    pub fn build(self) -> Query {
        let mut filters = self.filters;
        let filter = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Expression::and(filters)),
        };

        Query {
            filter,
            sort: self.sort,
            limit: self.limit,
            skip: self.skip,
            join: self.join,
            bypass_cache: self.bypass_cache,
            bypass_ripple: self.bypass_ripple,
            select_fields: self.select_fields,
            exclude_fields: self.exclude_fields,
        }
    }
}
