pub mod http;

use async_trait::async_trait;
use serde::{ Serialize, Deserialize };
use thiserror::Error;

#[derive(Serialize, Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply payload from `POST /chat`. `route` names the backend handler that
/// produced the reply; the client records it but never branches on it.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub route: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginSuccess {
    #[serde(default)]
    pub email: Option<String>,
}

/// Failure body the backend sends on a rejected login.
#[derive(Deserialize, Debug)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `detail` carries the body's message when present.
    #[error("backend rejected the request with status {status}")]
    Rejected {
        status: u16,
        detail: Option<String>,
    },
}

/// The remote chat/auth service. Kept behind a trait so the session and
/// auth layers never see reqwest, and tests can substitute a scripted
/// backend.
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn chat(&self, message: &str) -> Result<ChatReply, BackendError>;

    async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, BackendError>;
}
