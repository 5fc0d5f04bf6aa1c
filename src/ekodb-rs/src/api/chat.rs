//! Chat sessions

use crate::client::{segment, with_query, Client, NO_BODY};
use crate::error::Result;
use ekodb_core::{
    ChatMessageRequest, ChatResponse, ChatSessionResponse, CreateChatSessionRequest,
    GetMessagesResponse, ListQuery, ListSessionsResponse, MergeSessionsRequest,
    ToggleForgottenRequest, UpdateMessageRequest, UpdateSessionRequest,
};
use reqwest::Method;

fn message_path(session_id: &str, message_id: &str) -> String {
    format!(
        "/api/chat/{}/messages/{}",
        segment(session_id),
        segment(message_id)
    )
}

impl Client {
    pub async fn create_chat_session(&self, request: &CreateChatSessionRequest) -> Result<ChatResponse> {
        self.request(Method::POST, "/api/chat", Some(request)).await
    }

    /// Send a message in an existing session
    pub async fn chat_message(&self, session_id: &str, request: &ChatMessageRequest) -> Result<ChatResponse> {
        let path = format!("/api/chat/{}/messages", segment(session_id));
        self.request(Method::POST, &path, Some(request)).await
    }

    pub async fn get_chat_session(&self, session_id: &str) -> Result<ChatSessionResponse> {
        let path = format!("/api/chat/{}", segment(session_id));
        self.request(Method::GET, &path, NO_BODY).await
    }

    pub async fn list_chat_sessions(&self, query: Option<&ListQuery>) -> Result<ListSessionsResponse> {
        let pairs = query.map(ListQuery::query_pairs).unwrap_or_default();
        let path = with_query("/api/chat".to_string(), &pairs);
        self.request(Method::GET, &path, NO_BODY).await
    }

    pub async fn get_chat_session_messages(
        &self,
        session_id: &str,
        query: Option<&ListQuery>,
    ) -> Result<GetMessagesResponse> {
        let pairs = query.map(ListQuery::query_pairs).unwrap_or_default();
        let path = with_query(format!("/api/chat/{}/messages", segment(session_id)), &pairs);
        self.request(Method::GET, &path, NO_BODY).await
    }

    pub async fn update_chat_session(
        &self,
        session_id: &str,
        request: &UpdateSessionRequest,
    ) -> Result<ChatSessionResponse> {
        let path = format!("/api/chat/{}", segment(session_id));
        self.request(Method::PUT, &path, Some(request)).await
    }

    /// Start a new session from a point in a parent session (`parent_id`)
    pub async fn branch_chat_session(&self, request: &CreateChatSessionRequest) -> Result<ChatResponse> {
        self.request(Method::POST, "/api/chat/branch", Some(request))
            .await
    }

    pub async fn delete_chat_session(&self, session_id: &str) -> Result<()> {
        let path = format!("/api/chat/{}", segment(session_id));
        self.send(Method::DELETE, &path, NO_BODY).await?;
        Ok(())
    }

    /// Ask the model to answer a message again
    pub async fn regenerate_chat_message(&self, session_id: &str, message_id: &str) -> Result<ChatResponse> {
        let path = format!("{}/regenerate", message_path(session_id, message_id));
        self.request(Method::POST, &path, NO_BODY).await
    }

    pub async fn update_chat_message(&self, session_id: &str, message_id: &str, content: &str) -> Result<()> {
        let body = UpdateMessageRequest {
            content: content.to_string(),
        };
        self.send(Method::PUT, &message_path(session_id, message_id), Some(&body))
            .await?;
        Ok(())
    }

    pub async fn delete_chat_message(&self, session_id: &str, message_id: &str) -> Result<()> {
        self.send(Method::DELETE, &message_path(session_id, message_id), NO_BODY)
            .await?;
        Ok(())
    }

    /// Exclude a message from (or return it to) the model's context
    pub async fn toggle_forgotten_message(
        &self,
        session_id: &str,
        message_id: &str,
        forgotten: bool,
    ) -> Result<()> {
        let path = format!("{}/forgotten", message_path(session_id, message_id));
        self.send(Method::PATCH, &path, Some(&ToggleForgottenRequest { forgotten }))
            .await?;
        Ok(())
    }

    pub async fn merge_chat_sessions(&self, request: &MergeSessionsRequest) -> Result<ChatSessionResponse> {
        self.request(Method::POST, "/api/chat/merge", Some(request))
            .await
    }
}
