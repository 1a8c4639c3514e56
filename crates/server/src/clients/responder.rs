//! Client for the external conversational responder that plays black.
//!
//! The responder is reached over HTTP and keeps its own conversation state;
//! each reply hands back a continuation that must accompany the next prompt.
//! The trait seam exists so the game protocol can be driven by a scripted
//! stand-in under test.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;

/// Number of responder backends; backend N listens on port 5000 + N.
const SERVER_POOL: u32 = 10;
const BASE_PORT: u32 = 5000;

/// Opaque link to the previous exchange in the responder's own state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Continuation {
    pub server: Option<u32>,
    pub user: Option<String>,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
}

impl Continuation {
    /// True before the first exchange has happened.
    pub fn is_fresh(&self) -> bool {
        self.conversation_id.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ResponderReply {
    pub text: String,
    pub continuation: Continuation,
}

#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("Cannot reach responder: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Responder refused: {0}")]
    Refused(String),

    #[error("Malformed responder payload")]
    Malformed,
}

#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        prompt: &str,
        continuation: &Continuation,
    ) -> Result<ResponderReply, ResponderError>;
}

pub struct HttpResponder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpResponder {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .user_agent("ChatterChess/1.0")
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap();
        Self {
            client,
            base_url: config.responder_url.clone(),
            api_key: config.responder_api_key.clone(),
        }
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn respond(
        &self,
        prompt: &str,
        continuation: &Continuation,
    ) -> Result<ResponderReply, ResponderError> {
        // A fresh conversation lands on a random backend; afterwards the
        // continuation pins it, since conversation state lives per backend.
        let server = continuation
            .server
            .unwrap_or_else(|| rand::thread_rng().gen_range(1..=SERVER_POOL));
        let url = format!("{}:{}/ask", self.base_url, BASE_PORT + server);

        let body = serde_json::json!({
            "apiKey": self.api_key,
            "prompt": prompt,
            "conversationId": continuation.conversation_id,
            "parentMessageId": continuation.message_id,
            "expectedUser": continuation.user,
        });

        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            return Err(ResponderError::Refused(format!("HTTP {}", resp.status())));
        }

        let data: Value = resp.json().await?;

        if !data["success"].as_bool().unwrap_or(false) {
            let reason = data["response"]
                .as_str()
                .unwrap_or("unknown failure")
                .to_string();
            return Err(ResponderError::Refused(reason));
        }

        let message = data["response"]["message"]
            .as_str()
            .ok_or(ResponderError::Malformed)?
            .to_string();

        Ok(ResponderReply {
            text: message,
            continuation: Continuation {
                server: Some(server),
                user: data["response"]["expectedUser"]
                    .as_str()
                    .map(str::to_string),
                conversation_id: data["response"]["conversationId"]
                    .as_str()
                    .map(str::to_string),
                message_id: data["response"]["parentId"].as_str().map(str::to_string),
            },
        })
    }
}
