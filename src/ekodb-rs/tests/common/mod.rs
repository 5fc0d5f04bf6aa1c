//! Shared mock-server setup for the integration tests

#![allow(dead_code)]

use ekodb_rs::{Client, ClientConfig};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test-key";

/// Issues `token-1`, `token-2`, ... in order
pub struct SequentialTokens {
    pub issued: Arc<AtomicUsize>,
}

impl Respond for SequentialTokens {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": format!("token-{}", n) }))
    }
}

pub struct TestServer {
    pub server: MockServer,
    pub tokens_issued: Arc<AtomicUsize>,
}

impl TestServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let tokens_issued = Arc::new(AtomicUsize::new(0));
        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .respond_with(SequentialTokens {
                issued: tokens_issued.clone(),
            })
            .mount(&server)
            .await;
        Self {
            server,
            tokens_issued,
        }
    }

    /// Fast backoff so retry tests finish quickly
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.server.uri(), API_KEY)
            .with_retries(true, 2)
            .with_backoff_ms(10, 10)
    }

    pub async fn client(&self) -> Client {
        Client::new(self.config()).await.unwrap()
    }

    pub fn tokens_issued(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
    }

    /// Requests received on `request_path`, excluding token calls
    pub async fn requests_to(&self, request_path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .collect()
    }
}

/// 200 response with a MessagePack body
pub fn msgpack_response<T: Serialize>(value: &T) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(rmp_serde::to_vec_named(value).unwrap())
        .insert_header("content-type", "application/msgpack")
}

pub fn decode_msgpack(request: &Request) -> serde_json::Value {
    rmp_serde::from_slice(&request.body).unwrap()
}
