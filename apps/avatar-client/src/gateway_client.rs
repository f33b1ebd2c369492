use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    Acknowledgement, AskRequest, AskResponse, ControlOp, ControlPlane, ControlPlaneError,
    CreateSessionRequest, ErrorBody, ProxyRequest, SessionInfo, TaskAck, TaskRequest,
    TokenResponse,
};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientSetupError {
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AskError {
    #[error("language model returned {status}: {error}")]
    Upstream { status: u16, error: String },

    #[error("ask request failed: {0}")]
    Transport(String),
}

/// Source of generated answers for user questions
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, AskError>;
}

/// Client of the credential-shielding gateway.
///
/// Implements the control plane by relaying each operation as `{op, ...}`,
/// so no provider key is ever held on this side.
pub struct GatewayClient {
    http: Client,
    control_url: Url,
    ask_url: Url,
}

impl GatewayClient {
    /// `base_url` is the gateway root; a path prefix must end with `/`
    /// (`https://host/app/`) or its last segment is replaced.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientSetupError> {
        let base = Url::parse(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            control_url: base.join("api/heygen")?,
            ask_url: base.join("api/ask")?,
        })
    }

    async fn call<T: DeserializeOwned>(&self, request: &ProxyRequest) -> Result<T, ControlPlaneError> {
        let op = request.op();
        debug!(operation = %op, "Relaying control-plane operation");

        let response = self
            .http
            .post(self.control_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ControlPlaneError::transport(op, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);

            if op == ControlOp::Token && status == StatusCode::UNAUTHORIZED {
                return Err(ControlPlaneError::Auth {
                    status: status.as_u16(),
                    body: message,
                });
            }
            return Err(ControlPlaneError::provider(op, status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| ControlPlaneError::transport(op, e))
    }
}

/// The gateway's `error` field when present, else the raw body
fn error_message(text: &str) -> String {
    serde_json::from_str::<ErrorBody>(text)
        .map(|body| body.error)
        .unwrap_or_else(|_| text.to_string())
}

#[async_trait]
impl ControlPlane for GatewayClient {
    async fn issue_token(&self) -> Result<String, ControlPlaneError> {
        let response: TokenResponse = self.call(&ProxyRequest::Token).await?;
        Ok(response.token)
    }

    async fn create_session(
        &self,
        token: &str,
        request: &CreateSessionRequest,
    ) -> Result<SessionInfo, ControlPlaneError> {
        self.call(&ProxyRequest::new_session(token, request)).await
    }

    async fn start_streaming(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError> {
        self.call(&ProxyRequest::Start {
            token: token.to_string(),
            session_id: session_id.to_string(),
        })
        .await
    }

    async fn send_task(&self, token: &str, task: &TaskRequest) -> Result<TaskAck, ControlPlaneError> {
        self.call(&ProxyRequest::task(token, task)).await
    }

    async fn stop_session(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError> {
        self.call(&ProxyRequest::Stop {
            token: token.to_string(),
            session_id: session_id.to_string(),
        })
        .await
    }
}

#[async_trait]
impl AnswerSource for GatewayClient {
    async fn ask(&self, question: &str) -> Result<String, AskError> {
        let response = self
            .http
            .post(self.ask_url.clone())
            .json(&AskRequest {
                message: question.to_string(),
            })
            .send()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AskError::Upstream {
                status: status.as_u16(),
                error: error_message(&text),
            });
        }

        let body: AskResponse = response
            .json()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;
        Ok(body.answer)
    }
}
