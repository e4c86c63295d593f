//! REST implementation of the message store client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::{MessageStore, Operation};
use crate::config::StoreConfig;
use crate::error::{BoardError, Result};
use crate::models::{Comment, Message, MessageId, NewMessage};

const API_PREFIX: &str = "/api/messages";
const UPLOADS_PREFIX: &str = "/uploads";

// ============================================================================
// URL layout
// ============================================================================

/// URL builder for the store's routes
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(endpoint: &str) -> Self {
        Self {
            base: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}{}", self.base, API_PREFIX, path)
    }

    pub fn list(&self) -> String {
        self.api("/all")
    }

    pub fn create(&self) -> String {
        self.api("/post")
    }

    pub fn delete(&self, id: &MessageId) -> String {
        self.api(&format!("/{}", urlencoding::encode(id.as_str())))
    }

    pub fn upvote(&self, id: &MessageId) -> String {
        self.api(&format!("/upvote/{}", urlencoding::encode(id.as_str())))
    }

    pub fn downvote(&self, id: &MessageId) -> String {
        self.api(&format!("/downvote/{}", urlencoding::encode(id.as_str())))
    }

    pub fn comment(&self, id: &MessageId) -> String {
        self.api(&format!("/comment/{}", urlencoding::encode(id.as_str())))
    }

    pub fn comments(&self, id: &MessageId) -> String {
        self.api(&format!("/comments/{}", urlencoding::encode(id.as_str())))
    }

    /// Static file URL for a stored attachment
    pub fn media(&self, file_name: &str) -> String {
        format!(
            "{}{}/{}",
            self.base,
            UPLOADS_PREFIX,
            urlencoding::encode(file_name)
        )
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Serialize)]
struct VoteRequest<'a> {
    username: &'a str,
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    username: &'a str,
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    #[serde(alias = "message")]
    error: String,
}

// ============================================================================
// Client
// ============================================================================

/// Message store reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpMessageStore {
    client: Client,
    endpoints: Endpoints,
}

impl HttpMessageStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = build_client(config.insecure, config.request_timeout())?;
        Ok(Self {
            client,
            endpoints: Endpoints::new(&config.endpoint),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn send(
        &self,
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        request
            .send()
            .await
            .map_err(|err| BoardError::http(operation.as_str(), err))
    }

    async fn put_json<T: Serialize + ?Sized>(
        &self,
        operation: Operation,
        url: String,
        body: &T,
    ) -> Result<()> {
        debug!(%operation, %url, "dispatching");
        let response = self.send(operation, self.client.put(&url).json(body)).await?;
        expect_success(operation, response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: Operation, url: String) -> Result<T> {
        debug!(%operation, %url, "dispatching");
        let response = self.send(operation, self.client.get(&url)).await?;
        parse_json(operation, response).await
    }
}

/// Build HTTP client with optional TLS verification skip and timeout
fn build_client(insecure: bool, timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if insecure {
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| BoardError::http("build client", err))
}

async fn error_for_status(operation: Operation, response: reqwest::Response) -> BoardError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = match serde_json::from_str::<ErrorResponse>(&error_text) {
        Ok(error_resp) => error_resp.error,
        Err(_) => error_text,
    };

    BoardError::status(operation.as_str(), status.as_u16(), message)
}

/// Mutation bodies are ignored, only the status counts
async fn expect_success(operation: Operation, response: reqwest::Response) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_for_status(operation, response).await)
    }
}

async fn parse_json<T: DeserializeOwned>(
    operation: Operation,
    response: reqwest::Response,
) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_for_status(operation, response).await);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|err| BoardError::http(operation.as_str(), err))?;

    serde_json::from_slice(&bytes).map_err(|err| BoardError::decode(operation.as_str(), err))
}

#[async_trait]
impl MessageStore for HttpMessageStore {
    async fn list_messages(&self) -> Result<Vec<Message>> {
        self.get_json(Operation::ListMessages, self.endpoints.list())
            .await
    }

    async fn create_message(&self, message: NewMessage) -> Result<()> {
        let operation = Operation::CreateMessage;
        let url = self.endpoints.create();

        let mut form = Form::new()
            .text("username", message.author)
            .text("description", message.description);

        // No placeholder part when nothing is attached
        if let Some(media) = message.media {
            debug!(file = %media.file_name, bytes = media.bytes.len(), "attaching media");
            form = form.part("media", Part::bytes(media.bytes).file_name(media.file_name));
        }

        debug!(%operation, %url, "dispatching");
        let response = self
            .send(operation, self.client.post(&url).multipart(form))
            .await?;
        expect_success(operation, response).await
    }

    async fn delete_message(&self, id: &MessageId) -> Result<()> {
        let operation = Operation::DeleteMessage;
        let url = self.endpoints.delete(id);

        debug!(%operation, %url, "dispatching");
        let response = self.send(operation, self.client.delete(&url)).await?;
        expect_success(operation, response).await
    }

    async fn upvote(&self, id: &MessageId, username: &str) -> Result<()> {
        self.put_json(
            Operation::Upvote,
            self.endpoints.upvote(id),
            &VoteRequest { username },
        )
        .await
    }

    async fn downvote(&self, id: &MessageId, username: &str) -> Result<()> {
        self.put_json(
            Operation::Downvote,
            self.endpoints.downvote(id),
            &VoteRequest { username },
        )
        .await
    }

    async fn add_comment(&self, id: &MessageId, username: &str, text: &str) -> Result<()> {
        self.put_json(
            Operation::AddComment,
            self.endpoints.comment(id),
            &CommentRequest { username, text },
        )
        .await
    }

    async fn list_comments(&self, id: &MessageId) -> Result<Vec<Comment>> {
        self.get_json(Operation::ListComments, self.endpoints.comments(id))
            .await
    }
}
