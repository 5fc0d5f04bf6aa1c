use parking_lot::RwLock;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Quota snapshot from the most recent successful response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    /// Unix timestamp at which the window resets
    pub reset: i64,
}

impl RateLimitInfo {
    /// At most 10% of the quota left
    pub fn is_near_limit(&self) -> bool {
        self.remaining.saturating_mul(10) <= self.limit
    }

    pub fn is_exceeded(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining_percentage(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        self.remaining as f64 / self.limit as f64 * 100.0
    }

    /// Parse all three quota headers; `None` if any is missing or malformed
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| headers.get(name)?.to_str().ok().map(str::trim);
        Some(Self {
            limit: read(LIMIT_HEADER)?.parse().ok()?,
            remaining: read(REMAINING_HEADER)?.parse().ok()?,
            reset: read(RESET_HEADER)?.parse().ok()?,
        })
    }
}

/// Holds the latest quota snapshot; last writer wins
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    info: RwLock<Option<RateLimitInfo>>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, info: RateLimitInfo) {
        *self.info.write() = Some(info);

        if info.is_near_limit() {
            warn!(
                limit = info.limit,
                remaining = info.remaining,
                reset = info.reset,
                "Approaching rate limit"
            );
        }
    }

    /// Record the quota headers of a successful response, if all are present
    pub fn record_headers(&self, headers: &HeaderMap) {
        if let Some(info) = RateLimitInfo::from_headers(headers) {
            self.update(info);
        }
    }

    pub fn info(&self) -> Option<RateLimitInfo> {
        *self.info.read()
    }

    pub fn is_near_limit(&self) -> bool {
        self.info().is_some_and(|info| info.is_near_limit())
    }

    pub fn is_exceeded(&self) -> bool {
        self.info().is_some_and(|info| info.is_exceeded())
    }
}
