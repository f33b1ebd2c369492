use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::protocol::{
    Acknowledgement, ControlOp, CreateSessionRequest, SessionInfo, TaskAck, TaskRequest,
};

/// Failure of a control-plane call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlPlaneError {
    /// The provider rejected the API key at token issuance
    #[error("credential rejected by provider (status {status}): {body}")]
    Auth { status: u16, body: String },

    /// Any other non-success outcome; `http_status` is `None` when no response was received
    #[error("{operation} failed{}: {body}", StatusSuffix(.http_status))]
    Provider {
        operation: ControlOp,
        http_status: Option<u16>,
        body: String,
    },
}

struct StatusSuffix<'a>(&'a Option<u16>);

impl fmt::Display for StatusSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(status) => write!(f, " with status {}", status),
            None => Ok(()),
        }
    }
}

impl ControlPlaneError {
    pub fn provider(operation: ControlOp, http_status: u16, body: impl Into<String>) -> Self {
        ControlPlaneError::Provider {
            operation,
            http_status: Some(http_status),
            body: body.into(),
        }
    }

    /// Network failure or undecodable response
    pub fn transport(operation: ControlOp, error: impl fmt::Display) -> Self {
        ControlPlaneError::Provider {
            operation,
            http_status: None,
            body: error.to_string(),
        }
    }

    pub fn operation(&self) -> ControlOp {
        match self {
            ControlPlaneError::Auth { .. } => ControlOp::Token,
            ControlPlaneError::Provider { operation, .. } => *operation,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            ControlPlaneError::Auth { status, .. } => Some(*status),
            ControlPlaneError::Provider { http_status, .. } => *http_status,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            ControlPlaneError::Auth { body, .. } | ControlPlaneError::Provider { body, .. } => body,
        }
    }
}

/// Session-lifecycle API of the streaming-avatar provider.
///
/// Implemented by the provider REST client on the server and by the
/// gateway-backed client in the browser-side controller.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Issue a short-lived session token (API-key authorized)
    async fn issue_token(&self) -> Result<String, ControlPlaneError>;

    async fn create_session(
        &self,
        token: &str,
        request: &CreateSessionRequest,
    ) -> Result<SessionInfo, ControlPlaneError>;

    /// Must follow media-connection preparation and precede the media connect
    async fn start_streaming(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError>;

    /// Callers validate the text; implementations forward it as-is
    async fn send_task(&self, token: &str, task: &TaskRequest)
        -> Result<TaskAck, ControlPlaneError>;

    async fn stop_session(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError>;
}
