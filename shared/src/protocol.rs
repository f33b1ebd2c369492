use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Streaming protocol version requested from the provider
pub const PROTOCOL_VERSION: &str = "v2";

fn default_version() -> String {
    PROTOCOL_VERSION.to_string()
}

/// The five control-plane operations relayed by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlOp {
    Token,
    New,
    Start,
    Task,
    Stop,
}

impl ControlOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlOp::Token => "token",
            ControlOp::New => "new",
            ControlOp::Start => "start",
            ControlOp::Task => "task",
            ControlOp::Stop => "stop",
        }
    }

    /// Provider REST path for this operation
    pub fn path(&self) -> &'static str {
        match self {
            ControlOp::Token => "/streaming.create_token",
            ControlOp::New => "/streaming.new",
            ControlOp::Start => "/streaming.start",
            ControlOp::Task => "/streaming.task",
            ControlOp::Stop => "/streaming.stop",
        }
    }
}

impl fmt::Display for ControlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ControlOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token" => Ok(ControlOp::Token),
            "new" => Ok(ControlOp::New),
            "start" => Ok(ControlOp::Start),
            "task" => Ok(ControlOp::Task),
            "stop" => Ok(ControlOp::Stop),
            other => Err(format!("Unknown op: {}", other)),
        }
    }
}

/// How the avatar should perform a speak task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    /// Synthesize a voice performance of the text as a reply
    #[default]
    Talk,
    /// Read the text back verbatim
    Repeat,
}

impl fmt::Display for TaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskMode::Talk => write!(f, "talk"),
            TaskMode::Repeat => write!(f, "repeat"),
        }
    }
}

/// Parameters for creating a streaming session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub avatar_id: String,
    /// Provider default voice is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_custom_server: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ttl: Option<u64>,
}

impl CreateSessionRequest {
    pub fn new(avatar_id: impl Into<String>, voice_id: Option<String>) -> Self {
        Self {
            avatar_id: avatar_id.into(),
            voice_id,
            version: default_version(),
            use_custom_server: None,
            server_url: None,
            token_ttl: None,
        }
    }
}

/// Session identifiers and media-room endpoint issued at session creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub url: String,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Success marker returned by start/stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default = "acknowledged")]
    pub success: bool,
}

fn acknowledged() -> bool {
    true
}

impl Default for Acknowledgement {
    fn default() -> Self {
        Self { success: true }
    }
}

/// Acknowledgment of an accepted speak task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

/// One speak command for an active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub session_id: String,
    pub text: String,
    #[serde(rename = "action", default)]
    pub mode: TaskMode,
}

/// Body accepted by the gateway's control-plane endpoint, discriminated by `op`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ProxyRequest {
    Token,
    New {
        token: String,
        avatar_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        voice_id: Option<String>,
        #[serde(default = "default_version")]
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        use_custom_server: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        server_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_ttl: Option<u64>,
    },
    Start {
        token: String,
        session_id: String,
    },
    Task {
        token: String,
        session_id: String,
        text: String,
        #[serde(default)]
        action: TaskMode,
    },
    Stop {
        token: String,
        session_id: String,
    },
}

impl ProxyRequest {
    pub fn op(&self) -> ControlOp {
        match self {
            ProxyRequest::Token => ControlOp::Token,
            ProxyRequest::New { .. } => ControlOp::New,
            ProxyRequest::Start { .. } => ControlOp::Start,
            ProxyRequest::Task { .. } => ControlOp::Task,
            ProxyRequest::Stop { .. } => ControlOp::Stop,
        }
    }

    pub fn new_session(token: impl Into<String>, request: &CreateSessionRequest) -> Self {
        ProxyRequest::New {
            token: token.into(),
            avatar_id: request.avatar_id.clone(),
            voice_id: request.voice_id.clone(),
            version: request.version.clone(),
            use_custom_server: request.use_custom_server,
            server_url: request.server_url.clone(),
            token_ttl: request.token_ttl,
        }
    }

    pub fn task(token: impl Into<String>, task: &TaskRequest) -> Self {
        ProxyRequest::Task {
            token: token.into(),
            session_id: task.session_id.clone(),
            text: task.text.clone(),
            action: task.mode,
        }
    }
}

/// Question relayed to the language-model passthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Error payload returned by every gateway endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<ControlOp>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            operation: None,
        }
    }

    pub fn for_operation(error: impl Into<String>, operation: ControlOp) -> Self {
        Self {
            error: error.into(),
            operation: Some(operation),
        }
    }
}
