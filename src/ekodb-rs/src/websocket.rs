//! Query over a WebSocket connection

use crate::client::Client;
use crate::error::{ClientError, Result};
use ekodb_core::Record;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;
use uuid::Uuid;

const WS_PATH: &str = "/api/ws";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Serialize)]
struct FindAllPayload<'a> {
    collection: &'a str,
}

#[derive(Serialize)]
struct WsRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "messageId")]
    message_id: String,
    payload: FindAllPayload<'a>,
}

#[derive(Deserialize)]
struct WsResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
}

/// `ws_url` with `/api/ws` appended when missing and the token as a query parameter
pub fn endpoint_url(ws_url: &str, token: &str) -> Result<Url> {
    let trimmed = ws_url.trim_end_matches('/');
    let full = if trimmed.ends_with(WS_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, WS_PATH)
    };
    let mut url = Url::parse(&full)?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// A WebSocket session authenticated with the client's token
///
/// A failed send or receive drops the connection; the next call reconnects.
pub struct WebSocketClient {
    url: Url,
    token: String,
    stream: Option<WsStream>,
}

impl Client {
    /// Open a WebSocket session, e.g. `client.websocket("ws://localhost:8080")`
    pub async fn websocket(&self, ws_url: &str) -> Result<WebSocketClient> {
        let token = self.token().await;
        let mut ws = WebSocketClient {
            url: endpoint_url(ws_url, &token)?,
            token,
            stream: None,
        };
        ws.connect().await?;
        Ok(ws)
    }
}

impl WebSocketClient {
    async fn connect(&mut self) -> Result<()> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| ClientError::WebSocket(format!("connection failed: {}", e)))?;
        debug!(url = %self.url.path(), "WebSocket connected");
        self.stream = Some(stream);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// All records of a collection
    pub async fn find_all(&mut self, collection: &str) -> Result<Vec<Record>> {
        let request = WsRequest {
            kind: "FindAll",
            message_id: Uuid::new_v4().to_string(),
            payload: FindAllPayload { collection },
        };
        let text = serde_json::to_string(&request)
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;

        let reply = self.round_trip(text).await?;
        let response: WsResponse = serde_json::from_str(&reply)
            .map_err(|e| ClientError::InvalidResponse(format!("websocket reply: {}", e)))?;

        if response.kind == "Error" {
            return Err(ClientError::WebSocket(
                response
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let Some(items) = response
            .payload
            .as_ref()
            .and_then(|payload| payload.get("data"))
            .and_then(Value::as_array)
        else {
            return Ok(Vec::new());
        };

        items
            .iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(fields.clone().into_iter().collect::<Record>()),
                other => Err(ClientError::InvalidResponse(format!(
                    "websocket record is not an object: {}",
                    other
                ))),
            })
            .collect()
    }

    /// Send one text frame and wait for the next text reply
    async fn round_trip(&mut self, text: String) -> Result<String> {
        if self.stream.is_none() {
            self.connect().await?;
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(ClientError::WebSocket("not connected".to_string()));
        };

        if let Err(e) = stream.send(Message::Text(text)).await {
            self.stream = None;
            return Err(ClientError::WebSocket(format!("failed to send request: {}", e)));
        }

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(reply))) => return Ok(reply),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map_err(|e| ClientError::InvalidResponse(e.to_string()));
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {
                    continue
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.stream = None;
                    return Err(ClientError::WebSocket("connection closed".to_string()));
                }
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(ClientError::WebSocket(format!("failed to read response: {}", e)));
                }
            }
        }
    }

    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .close(None)
                .await
                .map_err(|e| ClientError::WebSocket(e.to_string()))?;
        }
        Ok(())
    }
}
