use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire encoding used for request and response bodies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    /// Compact binary encoding (`application/msgpack`)
    #[default]
    #[serde(rename = "msgpack")]
    MessagePack,
    /// Text encoding (`application/json`)
    Json,
}

impl SerializationFormat {
    /// MIME type sent in `Content-Type` and `Accept`
    pub fn content_type(&self) -> &'static str {
        match self {
            SerializationFormat::MessagePack => "application/msgpack",
            SerializationFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationFormat::MessagePack => write!(f, "msgpack"),
            SerializationFormat::Json => write!(f, "json"),
        }
    }
}

/// Client configuration, fixed once a client has been constructed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,

    // Retry policy
    #[serde(default = "default_should_retry")]
    pub should_retry: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-attempt HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Preferred encoding. Endpoint routing still decides per path.
    #[serde(default)]
    pub format: SerializationFormat,

    /// Fixed delay before retrying after a transport failure
    #[serde(default = "default_network_retry_delay_ms")]
    pub network_retry_delay_ms: u64,

    /// Fixed delay before retrying a 503 response
    #[serde(default = "default_service_unavailable_delay_ms")]
    pub service_unavailable_delay_ms: u64,

    /// Delay used when a 429 carries no usable `Retry-After`
    #[serde(default = "default_retry_after_secs")]
    pub default_retry_after_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_should_retry() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_network_retry_delay_ms() -> u64 {
    3_000
}

fn default_service_unavailable_delay_ms() -> u64 {
    10_000
}

fn default_retry_after_secs() -> u64 {
    60
}

impl ClientConfig {
    /// Configuration with defaults for everything but the endpoint and key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Read `EKODB_URL` and `EKODB_API_KEY`, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("EKODB_URL") {
            config.base_url = url;
        }
        if let Ok(key) = std::env::var("EKODB_API_KEY") {
            config.api_key = key;
        }
        config
    }

    pub fn with_retries(mut self, should_retry: bool, max_retries: u32) -> Self {
        self.should_retry = should_retry;
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_format(mut self, format: SerializationFormat) -> Self {
        self.format = format;
        self
    }

    /// Override the fixed backoff delays (network, 503)
    pub fn with_backoff_ms(mut self, network_ms: u64, service_unavailable_ms: u64) -> Self {
        self.network_retry_delay_ms = network_ms;
        self.service_unavailable_delay_ms = service_unavailable_ms;
        self
    }

    /// Base URL without a trailing slash
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// API key safe for logs
    pub fn redacted_api_key(&self) -> String {
        if self.api_key.chars().count() > 4 {
            let prefix: String = self.api_key.chars().take(4).collect();
            format!("{}...", prefix)
        } else {
            "[REDACTED]".to_string()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            should_retry: default_should_retry(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            format: SerializationFormat::default(),
            network_retry_delay_ms: default_network_retry_delay_ms(),
            service_unavailable_delay_ms: default_service_unavailable_delay_ms(),
            default_retry_after_secs: default_retry_after_secs(),
        }
    }
}
