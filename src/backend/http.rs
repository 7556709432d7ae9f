use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;

use super::{
    BackendClient,
    BackendError,
    ChatReply,
    ChatRequest,
    ErrorDetail,
    LoginRequest,
    LoginSuccess,
};

/// reqwest-backed client for the medical-assistant HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: HttpClient,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply, BackendError> {
        let req = ChatRequest { message: message.to_string() };
        let resp = self
            .http
            .post(self.url("/chat"))
            .json(&req)
            .send()
            .await?
            .error_for_status()?;
        let reply = resp.json::<ChatReply>().await?;
        debug!("chat reply route: {:?}", reply.route);
        Ok(reply)
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, BackendError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self.http.post(self.url("/login")).json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            // The body is best-effort; a rejection without a readable
            // detail string is still a rejection.
            let detail = resp
                .json::<ErrorDetail>()
                .await
                .ok()
                .and_then(|body| body.detail);
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(resp.json::<LoginSuccess>().await?)
    }
}
