use serde::Serialize;
use serde_json::Value;
use shared::{
    Acknowledgement, ControlOp, CreateSessionRequest, ProxyRequest, SessionInfo, TaskAck,
    TaskRequest, TokenResponse,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::ports::{ControlPlane, ControlPlaneError};

/// Why a gateway payload could not be turned into an operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayRejection {
    #[error("Unknown op")]
    UnknownOp,

    #[error("{0}")]
    Malformed(String),
}

/// Result of a dispatched operation, relayed to the caller verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProxyResponse {
    Token(TokenResponse),
    Session(SessionInfo),
    Task(TaskAck),
    Ack(Acknowledgement),
}

/// Operation dispatcher in front of the provider control plane.
///
/// Holds the only reference to the API-key-bearing client; callers only
/// ever see the operation results.
pub struct ProxyGateway {
    control_plane: Arc<dyn ControlPlane>,
}

impl ProxyGateway {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Decode a raw `{op, ...payload}` body
    pub fn parse(payload: Value) -> Result<ProxyRequest, GatewayRejection> {
        let known = payload
            .get("op")
            .and_then(Value::as_str)
            .map(|op| op.parse::<ControlOp>().is_ok())
            .unwrap_or(false);
        if !known {
            return Err(GatewayRejection::UnknownOp);
        }

        serde_json::from_value(payload).map_err(|e| GatewayRejection::Malformed(e.to_string()))
    }

    pub async fn dispatch(&self, request: ProxyRequest) -> Result<ProxyResponse, ControlPlaneError> {
        let op = request.op();
        debug!(operation = %op, "Dispatching control-plane operation");

        let response = match request {
            ProxyRequest::Token => {
                let token = self.control_plane.issue_token().await?;
                ProxyResponse::Token(TokenResponse { token })
            }
            ProxyRequest::New {
                token,
                avatar_id,
                voice_id,
                version,
                use_custom_server,
                server_url,
                token_ttl,
            } => {
                let request = CreateSessionRequest {
                    avatar_id,
                    voice_id,
                    version,
                    use_custom_server,
                    server_url,
                    token_ttl,
                };
                let session = self.control_plane.create_session(&token, &request).await?;
                info!(session_id = %session.session_id, "Streaming session created");
                ProxyResponse::Session(session)
            }
            ProxyRequest::Start { token, session_id } => {
                ProxyResponse::Ack(self.control_plane.start_streaming(&token, &session_id).await?)
            }
            ProxyRequest::Task {
                token,
                session_id,
                text,
                action,
            } => {
                let task = TaskRequest {
                    session_id,
                    text,
                    mode: action,
                };
                ProxyResponse::Task(self.control_plane.send_task(&token, &task).await?)
            }
            ProxyRequest::Stop { token, session_id } => {
                let ack = self.control_plane.stop_session(&token, &session_id).await?;
                info!(session_id = %session_id, "Streaming session stopped");
                ProxyResponse::Ack(ack)
            }
        };

        Ok(response)
    }
}
