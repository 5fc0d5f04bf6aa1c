use crate::auth::AuthError;
use ekodb_core::{ModelError, SerializationFormat};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by every client call
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received (connect, timeout, DNS) or the body could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 429 after retries were exhausted
    #[error("Rate limit exceeded, retry after {retry_after_secs}s: {message}")]
    RateLimited {
        retry_after_secs: u64,
        message: String,
    },

    /// Any other non-2xx response
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Credentials rejected on an attempt other than the first
    #[error("Authentication failed (status {status}): {message}")]
    AuthFailed { status: u16, message: String },

    /// The token endpoint could not issue a token
    #[error("Token refresh failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to encode {format} request body: {message}")]
    Encode {
        format: SerializationFormat,
        message: String,
    },

    #[error("Failed to decode {format} response body: {message}")]
    Decode {
        format: SerializationFormat,
        message: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<ModelError> for ClientError {
    fn from(err: ModelError) -> Self {
        ClientError::InvalidArgument(err.to_string())
    }
}

impl ClientError {
    /// True for HTTP 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Http { status: 404, .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::RateLimited { .. })
    }

    /// Server-advised delay of a rate-limited call
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ClientError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Whether the same call may succeed if issued again later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_)
                | ClientError::RateLimited { .. }
                | ClientError::Http { status: 503, .. }
        )
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::AuthFailed { .. } | ClientError::Auth(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } | ClientError::AuthFailed { status, .. } => {
                Some(*status)
            }
            ClientError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            ClientError::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Body marker the server uses for a stale token on a 500 response
const INVALID_TOKEN_MARKER: &[u8] = b"Invalid token";

/// How the executor should treat a received response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    RateLimited { retry_after_secs: u64 },
    AuthFailure,
    ServiceUnavailable,
    Failed,
}

/// Classify a response from its status, `Retry-After` header and body
pub fn classify_response(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &[u8],
    default_retry_after_secs: u64,
) -> ResponseClass {
    if status.is_success() {
        return ResponseClass::Success;
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => ResponseClass::RateLimited {
            retry_after_secs: parse_retry_after(retry_after, default_retry_after_secs),
        },
        StatusCode::UNAUTHORIZED => ResponseClass::AuthFailure,
        StatusCode::INTERNAL_SERVER_ERROR if contains_marker(body, INVALID_TOKEN_MARKER) => {
            ResponseClass::AuthFailure
        }
        StatusCode::SERVICE_UNAVAILABLE => ResponseClass::ServiceUnavailable,
        _ => ResponseClass::Failed,
    }
}

/// Whole seconds from `Retry-After`; anything else falls back to the default
pub fn parse_retry_after(value: Option<&str>, default_secs: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_secs)
}

fn contains_marker(body: &[u8], marker: &[u8]) -> bool {
    body.windows(marker.len()).any(|window| window == marker)
}

/// Terminal error for a non-2xx response
pub(crate) fn http_error(status: StatusCode, body: &[u8]) -> ClientError {
    ClientError::Http {
        status: status.as_u16(),
        message: String::from_utf8_lossy(body).into_owned(),
    }
}
