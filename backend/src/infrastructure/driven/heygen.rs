use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use shared::{
    Acknowledgement, ControlOp, ControlPlane, ControlPlaneError, CreateSessionRequest,
    SessionInfo, TaskAck, TaskRequest,
};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::ApiKey;
use crate::infrastructure::config::ProviderConfig;

/// Authorization used for one provider call
enum Auth<'a> {
    ApiKey,
    Bearer(&'a str),
}

/// Provider responses wrap their payload in `{ "data": ... }`
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct TokenData {
    token: String,
}

#[derive(Serialize)]
struct SessionRef<'a> {
    session_id: &'a str,
}

/// REST client for the streaming-avatar provider's session lifecycle
pub struct HeygenClient {
    http: Client,
    base_url: String,
    api_key: ApiKey,
}

impl HeygenClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build provider HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post<B, T>(&self, op: ControlOp, body: &B, auth: Auth<'_>) -> Result<Option<T>, ControlPlaneError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, op.path());
        debug!(operation = %op, "Calling provider");

        let request = self.http.post(&url).json(body);
        let request = match auth {
            Auth::ApiKey => request.header("X-Api-Key", self.api_key.expose()),
            Auth::Bearer(token) => request.bearer_auth(token),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ControlPlaneError::transport(op, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation = %op, status = status.as_u16(), "Provider rejected call");

            if op == ControlOp::Token
                && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
            {
                return Err(ControlPlaneError::Auth {
                    status: status.as_u16(),
                    body,
                });
            }
            return Err(ControlPlaneError::provider(op, status.as_u16(), body));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ControlPlaneError::transport(op, e))?;
        Ok(envelope.data)
    }
}

fn missing_data(op: ControlOp) -> ControlPlaneError {
    ControlPlaneError::transport(op, "provider response carried no data")
}

#[async_trait]
impl ControlPlane for HeygenClient {
    async fn issue_token(&self) -> Result<String, ControlPlaneError> {
        let data: Option<TokenData> = self.post(ControlOp::Token, &json!({}), Auth::ApiKey).await?;
        data.map(|d| d.token).ok_or_else(|| missing_data(ControlOp::Token))
    }

    async fn create_session(
        &self,
        token: &str,
        request: &CreateSessionRequest,
    ) -> Result<SessionInfo, ControlPlaneError> {
        self.post(ControlOp::New, request, Auth::Bearer(token))
            .await?
            .ok_or_else(|| missing_data(ControlOp::New))
    }

    async fn start_streaming(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError> {
        let data: Option<Acknowledgement> = self
            .post(ControlOp::Start, &SessionRef { session_id }, Auth::Bearer(token))
            .await?;
        Ok(data.unwrap_or_default())
    }

    async fn send_task(&self, token: &str, task: &TaskRequest) -> Result<TaskAck, ControlPlaneError> {
        let data: Option<TaskAck> = self.post(ControlOp::Task, task, Auth::Bearer(token)).await?;
        Ok(data.unwrap_or_default())
    }

    async fn stop_session(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError> {
        let data: Option<Acknowledgement> = self
            .post(ControlOp::Stop, &SessionRef { session_id }, Auth::Bearer(token))
            .await?;
        Ok(data.unwrap_or_default())
    }
}
