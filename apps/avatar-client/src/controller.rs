use shared::{ControlPlane, ControlPlaneError, CreateSessionRequest, TaskAck, TaskMode, TaskRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::{ActiveSession, AuthToken, SessionStatus, StatusChanged};
use crate::media::{
    MediaError, MediaRoom, MediaRoomFactory, MediaTrackAggregator, RenderSurface, RoomOptions,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("session is {0}; stop it before starting another")]
    AlreadyActive(SessionStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoActiveSession,
    EmptyText,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SayOutcome {
    Sent(TaskAck),
    Skipped(SkipReason),
}

/// Drives one avatar session through the handshake, speak tasks and teardown.
///
/// Handshake order: token, session, room (handlers registered), prepare,
/// start-streaming, connect. Any failure releases everything acquired so far
/// and surfaces the original error.
pub struct SessionController {
    control_plane: Arc<dyn ControlPlane>,
    rooms: Arc<dyn MediaRoomFactory>,
    room_options: RoomOptions,
    aggregator: Arc<MediaTrackAggregator>,
    status: SessionStatus,
    session: Option<ActiveSession>,
    room: Option<Arc<dyn MediaRoom>>,
    events: Option<mpsc::UnboundedSender<StatusChanged>>,
}

impl SessionController {
    pub fn new(control_plane: Arc<dyn ControlPlane>, rooms: Arc<dyn MediaRoomFactory>) -> Self {
        Self {
            control_plane,
            rooms,
            room_options: RoomOptions::default(),
            aggregator: Arc::new(MediaTrackAggregator::new()),
            status: SessionStatus::Idle,
            session: None,
            room: None,
            events: None,
        }
    }

    pub fn with_room_options(mut self, options: RoomOptions) -> Self {
        self.room_options = options;
        self
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    pub fn has_credentials(&self) -> bool {
        self.session.is_some()
    }

    pub fn aggregator(&self) -> &Arc<MediaTrackAggregator> {
        &self.aggregator
    }

    /// Receive every status transition from now on
    pub fn subscribe_status(&mut self) -> mpsc::UnboundedReceiver<StatusChanged> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Bind the render surface; allowed before or after the session connects
    pub fn bind_surface(&self, surface: Option<Arc<dyn RenderSurface>>) {
        self.aggregator.bind_surface(surface);
    }

    pub async fn start(&mut self, avatar_id: &str, voice_id: Option<&str>) -> Result<(), SessionError> {
        if !self.status.can_start() {
            return Err(SessionError::AlreadyActive(self.status));
        }

        info!(avatar_id, "Starting avatar session");
        match self.handshake(avatar_id, voice_id).await {
            Ok(()) => {
                info!(session_id = ?self.session_id(), "Avatar session connected");
                Ok(())
            }
            Err(e) => {
                error!("Avatar session start failed: {}", e);
                self.transition(SessionStatus::Failed);
                self.take_resources().release().await;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self, avatar_id: &str, voice_id: Option<&str>) -> Result<(), SessionError> {
        let token = AuthToken::new(self.control_plane.issue_token().await?);
        self.transition(SessionStatus::TokenAcquired);

        let request = CreateSessionRequest::new(avatar_id, voice_id.map(str::to_string));
        let info = self
            .control_plane
            .create_session(token.as_str(), &request)
            .await?;
        let session = ActiveSession::new(token, info);
        self.session = Some(session.clone());
        self.transition(SessionStatus::SessionCreated);

        // Handlers go in before any network attempt so no track event is missed
        let room = self.rooms.create_room(&self.room_options)?;
        room.set_track_sink(self.aggregator.clone());
        self.room = Some(Arc::clone(&room));

        room.prepare_connection(&session.endpoint).await?;
        self.transition(SessionStatus::ConnectionPrepared);

        // The provider expects the media side to be listening before streaming begins
        self.control_plane
            .start_streaming(session.token.as_str(), &session.session_id)
            .await?;
        self.transition(SessionStatus::Streaming);

        room.connect(&session.endpoint).await?;
        self.transition(SessionStatus::Connected);

        self.aggregator.activate_playback();
        Ok(())
    }

    /// Send a speak task. Without a connected session or with blank text this
    /// is a logged no-op.
    pub async fn say(&self, text: &str, mode: TaskMode) -> Result<SayOutcome, SessionError> {
        let session = match (&self.session, self.status) {
            (Some(session), SessionStatus::Connected) => session,
            _ => {
                debug!(status = %self.status, "Ignoring say() without a connected session");
                return Ok(SayOutcome::Skipped(SkipReason::NoActiveSession));
            }
        };
        if text.trim().is_empty() {
            debug!("Ignoring say() with empty text");
            return Ok(SayOutcome::Skipped(SkipReason::EmptyText));
        }

        let task = TaskRequest {
            session_id: session.session_id.clone(),
            text: text.to_string(),
            mode,
        };
        let ack = self
            .control_plane
            .send_task(session.token.as_str(), &task)
            .await?;
        debug!(task_id = ?ack.task_id, %mode, "Speak task accepted");
        Ok(SayOutcome::Sent(ack))
    }

    /// Release the session. Idempotent and never fails.
    pub async fn stop(&mut self) {
        if matches!(self.status, SessionStatus::Idle | SessionStatus::Stopped) {
            return;
        }

        self.transition(SessionStatus::Stopping);
        self.take_resources().release().await;
        self.transition(SessionStatus::Stopped);
        info!("Avatar session stopped");
    }

    fn take_resources(&mut self) -> Teardown {
        Teardown {
            control_plane: Arc::clone(&self.control_plane),
            session: self.session.take(),
            room: self.room.take(),
            aggregator: Arc::clone(&self.aggregator),
        }
    }

    fn transition(&mut self, to: SessionStatus) {
        let from = std::mem::replace(&mut self.status, to);
        debug!(%from, %to, "Session status changed");

        let closed = match &self.events {
            Some(tx) => tx.send(StatusChanged::new(from, to)).is_err(),
            None => false,
        };
        if closed {
            self.events = None;
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.session.is_none() && self.room.is_none() && self.aggregator.track_count() == 0 {
            return;
        }

        let teardown = self.take_resources();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(teardown.release());
            }
            Err(_) => {
                warn!("No async runtime on drop; remote session left to expire on the provider");
                teardown.release_local();
            }
        }
    }
}

/// Everything a session holds, detached from the controller so it can be
/// released on stop, failure or drop alike.
struct Teardown {
    control_plane: Arc<dyn ControlPlane>,
    session: Option<ActiveSession>,
    room: Option<Arc<dyn MediaRoom>>,
    aggregator: Arc<MediaTrackAggregator>,
}

impl Teardown {
    /// Each step runs regardless of the previous one's outcome
    async fn release(self) {
        if let Some(session) = &self.session {
            match self
                .control_plane
                .stop_session(session.token.as_str(), &session.session_id)
                .await
            {
                Ok(_) => debug!(session_id = %session.session_id, "Remote session stopped"),
                Err(e) => warn!(session_id = %session.session_id, "Stopping remote session failed: {}", e),
            }
        }

        if let Some(room) = &self.room {
            if let Err(e) = room.disconnect().await {
                warn!("Media room disconnect failed: {}", e);
            }
        }

        self.release_local();
    }

    fn release_local(self) {
        drop(self.room);
        drop(self.session);
        self.aggregator.clear();
        self.aggregator.detach_surface();
    }
}
