use chrono::{DateTime, Utc};
use shared::SessionInfo;
use std::fmt;

/// Lifecycle of the control-plane/media-plane binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    TokenAcquired,
    SessionCreated,
    ConnectionPrepared,
    Streaming,
    Connected,
    Stopping,
    Stopped,
    Failed,
}

impl SessionStatus {
    /// `Stopped` and `Failed` count as the previous session's end
    pub fn can_start(&self) -> bool {
        matches!(self, SessionStatus::Idle | SessionStatus::Stopped | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One observed status transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChanged {
    pub from: SessionStatus,
    pub to: SessionStatus,
    pub at: DateTime<Utc>,
}

impl StatusChanged {
    pub fn new(from: SessionStatus, to: SessionStatus) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}

/// Short-lived bearer credential for session, task and stop calls
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(***)")
    }
}

/// Media-room connection parameters, fixed for the session's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEndpoint {
    pub url: String,
    pub access_token: String,
}

/// Credentials of a created session.
///
/// Token and session id only ever exist together: the token is held
/// by the handshake until session creation succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub session_id: String,
    pub token: AuthToken,
    pub endpoint: MediaEndpoint,
}

impl ActiveSession {
    pub fn new(token: AuthToken, info: SessionInfo) -> Self {
        Self {
            session_id: info.session_id,
            token,
            endpoint: MediaEndpoint {
                url: info.url,
                access_token: info.access_token,
            },
        }
    }
}
