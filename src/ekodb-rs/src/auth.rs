use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const TOKEN_PATH: &str = "/api/auth/token";

/// Failure to obtain a token from the server
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed token response: {0}")]
    MalformedResponse(String),
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    api_key: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Owns the bearer token shared by every request of a client
///
/// Readers take the shared lock. A refresh holds the exclusive lock for the
/// whole token round-trip, so callers that observed the same stale token
/// queue behind a single request and then see its result.
pub struct TokenManager {
    http: HttpClient,
    token_url: String,
    api_key: String,
    token: RwLock<String>,
}

impl TokenManager {
    /// Manager with no token yet; call [`TokenManager::refresh`] before use
    pub fn new(http: HttpClient, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            http,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            api_key: api_key.into(),
            token: RwLock::new(String::new()),
        }
    }

    pub async fn token(&self) -> String {
        self.token.read().await.clone()
    }

    /// Fetch a new token and replace the current one
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let token = self.fetch_token().await?;
        *self.token.write().await = token;
        info!("Authentication token refreshed");
        Ok(())
    }

    /// Refresh only if the current token is still `observed`
    pub async fn refresh_if_stale(&self, observed: &str) -> Result<(), AuthError> {
        let mut current = self.token.write().await;
        if current.as_str() != observed {
            debug!("Token already refreshed by another caller");
            return Ok(());
        }

        *current = self.fetch_token().await?;
        info!("Stale authentication token replaced");
        Ok(())
    }

    async fn fetch_token(&self) -> Result<String, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .json(&TokenRequest {
                api_key: &self.api_key,
            })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?;
        let parsed: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        if parsed.token.is_empty() {
            return Err(AuthError::MalformedResponse("empty token".to_string()));
        }
        Ok(parsed.token)
    }
}
