use crate::auth::TokenManager;
use crate::error::{classify_response, http_error, ClientError, ResponseClass, Result};
use crate::rate_limit::RateLimitTracker;
use crate::serialization;
use ekodb_core::ClientConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client as HttpClient, Method};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Runs one logical call to completion: retries, backoff and token replay
#[derive(Clone)]
pub struct RequestExecutor {
    http: HttpClient,
    base_url: String,
    config: Arc<ClientConfig>,
    tokens: Arc<TokenManager>,
    rate_limits: Arc<RateLimitTracker>,
}

impl RequestExecutor {
    pub fn new(
        http: HttpClient,
        config: Arc<ClientConfig>,
        tokens: Arc<TokenManager>,
        rate_limits: Arc<RateLimitTracker>,
    ) -> Self {
        Self {
            http,
            base_url: config.trimmed_base_url().to_string(),
            config,
            tokens,
            rate_limits,
        }
    }

    /// Retries granted after the first attempt
    fn retry_budget(&self) -> u32 {
        if self.config.should_retry {
            self.config.max_retries
        } else {
            0
        }
    }

    /// Send an already-encoded body and return the raw response body
    ///
    /// `body` must have been encoded for `path` (see [`serialization::serialize`]).
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn execute(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let format = serialization::format_for_path(path);
        let url = format!("{}{}", self.base_url, path);
        let max_retries = self.retry_budget();
        let mut attempt: u32 = 0;

        loop {
            let token = self.tokens.token().await;
            debug!(attempt, format = %format, "Sending request");

            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&token)
                .header(CONTENT_TYPE, format.content_type())
                .header(ACCEPT, format.content_type());
            if let Some(bytes) = &body {
                request = request.body(bytes.clone());
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    if attempt < max_retries {
                        let delay = Duration::from_millis(self.config.network_retry_delay_ms);
                        warn!(attempt, error = %err, "Network error, retrying after {:?}", delay);
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(ClientError::Network(err));
                }
            };

            let status = response.status();
            let headers = response.headers().clone();
            let retry_after = headers
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let bytes = response.bytes().await.map_err(ClientError::Network)?;

            match classify_response(
                status,
                retry_after.as_deref(),
                &bytes,
                self.config.default_retry_after_secs,
            ) {
                ResponseClass::Success => {
                    self.rate_limits.record_headers(&headers);
                    debug!(status = status.as_u16(), bytes = bytes.len(), "Request succeeded");
                    return Ok(bytes.to_vec());
                }
                ResponseClass::RateLimited { retry_after_secs } => {
                    if attempt < max_retries {
                        warn!(attempt, retry_after_secs, "Rate limited, backing off");
                        sleep(Duration::from_secs(retry_after_secs)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(ClientError::RateLimited {
                        retry_after_secs,
                        message: String::from_utf8_lossy(&bytes).into_owned(),
                    });
                }
                ResponseClass::AuthFailure => {
                    // only a first-attempt rejection is replayed
                    if attempt == 0 {
                        warn!(status = status.as_u16(), "Authentication rejected, refreshing token");
                        self.tokens.refresh_if_stale(&token).await?;
                        attempt += 1;
                        continue;
                    }
                    return Err(ClientError::AuthFailed {
                        status: status.as_u16(),
                        message: String::from_utf8_lossy(&bytes).into_owned(),
                    });
                }
                ResponseClass::ServiceUnavailable => {
                    if attempt < max_retries {
                        let delay = Duration::from_millis(self.config.service_unavailable_delay_ms);
                        warn!(attempt, "Service unavailable, retrying after {:?}", delay);
                        sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(http_error(status, &bytes));
                }
                ResponseClass::Failed => {
                    debug!(status = status.as_u16(), "Request failed");
                    return Err(http_error(status, &bytes));
                }
            }
        }
    }
}
