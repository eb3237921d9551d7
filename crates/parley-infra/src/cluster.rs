//! HttpForwarder -- client side of the cluster deliver-inbound endpoint.
//!
//! Sends `POST http://<node>/send` with the JSON-encoded [`ChatMessage`].
//! `2xx` is accepted, `404` means the peer does not host the recipient, and
//! anything else (or no answer at all) is a [`ForwardError`].
//!
//! Requests carry no overall deadline. The peer answers once the recipient's
//! mailbox has room, so only establishing the connection is bounded.

use std::time::Duration;

use parley_core::chat::forward::{ForwardOutcome, Forwarder};
use parley_types::chat::{ChatMessage, NodeAddress};
use parley_types::error::ForwardError;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// Upper bound on opening a connection to a peer node.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
}

impl HttpForwarder {
    pub fn new() -> Result<Self, ForwardError> {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ForwardError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    fn endpoint(node: &NodeAddress) -> String {
        format!("http://{node}/send")
    }
}

impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        node: &NodeAddress,
        message: &ChatMessage,
    ) -> Result<ForwardOutcome, ForwardError> {
        let body = serde_json::to_vec(message).map_err(|e| ForwardError::Encode(e.to_string()))?;
        let url = Self::endpoint(node);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), to = %message.to, "forward answered");

        if status.is_success() {
            Ok(ForwardOutcome::Accepted)
        } else if status == StatusCode::NOT_FOUND {
            Ok(ForwardOutcome::RecipientNotFound)
        } else {
            Err(ForwardError::Status(status.as_u16()))
        }
    }
}
