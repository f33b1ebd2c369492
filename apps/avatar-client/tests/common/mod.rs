// Recording fakes for the control plane, media room and render surface
#![allow(dead_code)]

use async_trait::async_trait;
use avatar_client::{
    MediaEndpoint, MediaError, MediaRoom, MediaRoomFactory, MediaStream, MediaStreamTrack,
    RemoteTrack, RenderSurface, RoomOptions, SessionController, TrackEventSink, TrackKind,
};
use parking_lot::Mutex;
use shared::{
    Acknowledgement, ControlOp, ControlPlane, ControlPlaneError, CreateSessionRequest, SessionInfo,
    TaskAck, TaskRequest,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Ordered record of every call made across the fakes
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Handshake steps at which a failure can be injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Token,
    Session,
    Room,
    Prepare,
    Start,
    Connect,
}

pub const ALL_STEPS: [Step; 6] = [
    Step::Token,
    Step::Session,
    Step::Room,
    Step::Prepare,
    Step::Start,
    Step::Connect,
];

pub struct FakeControlPlane {
    log: CallLog,
    failing: Mutex<HashSet<ControlOp>>,
    sessions: AtomicUsize,
    pub tasks: Mutex<Vec<TaskRequest>>,
    pub created: Mutex<Vec<CreateSessionRequest>>,
}

impl FakeControlPlane {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failing: Mutex::new(HashSet::new()),
            sessions: AtomicUsize::new(0),
            tasks: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(&self, op: ControlOp) {
        self.failing.lock().insert(op);
    }

    fn check(&self, op: ControlOp) -> Result<(), ControlPlaneError> {
        if self.failing.lock().contains(&op) {
            return Err(ControlPlaneError::provider(op, 500, "internal error"));
        }
        Ok(())
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn issue_token(&self) -> Result<String, ControlPlaneError> {
        self.log.push("token");
        self.check(ControlOp::Token)?;
        let n = self.sessions.load(Ordering::SeqCst) + 1;
        Ok(format!("T{}", n))
    }

    async fn create_session(
        &self,
        token: &str,
        request: &CreateSessionRequest,
    ) -> Result<SessionInfo, ControlPlaneError> {
        self.log.push(format!("new:{}", token));
        self.created.lock().push(request.clone());
        self.check(ControlOp::New)?;
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SessionInfo {
            session_id: format!("S{}", n),
            url: "wss://x".to_string(),
            access_token: format!("A{}", n),
        })
    }

    async fn start_streaming(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError> {
        self.log.push(format!("start:{}:{}", token, session_id));
        self.check(ControlOp::Start)?;
        Ok(Acknowledgement::default())
    }

    async fn send_task(&self, token: &str, task: &TaskRequest) -> Result<TaskAck, ControlPlaneError> {
        self.log.push(format!("task:{}:{}", token, task.session_id));
        self.tasks.lock().push(task.clone());
        self.check(ControlOp::Task)?;
        Ok(TaskAck {
            task_id: Some("task-1".to_string()),
            duration_ms: None,
        })
    }

    async fn stop_session(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Acknowledgement, ControlPlaneError> {
        self.log.push(format!("stop:{}:{}", token, session_id));
        self.check(ControlOp::Stop)?;
        Ok(Acknowledgement::default())
    }
}

pub struct FakeTrack {
    id: String,
    kind: TrackKind,
    stopped: AtomicBool,
}

impl FakeTrack {
    pub fn new(id: &str, kind: TrackKind) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            kind,
            stopped: AtomicBool::new(false),
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn remote(self: &Arc<Self>) -> RemoteTrack {
        RemoteTrack::new(format!("sid-{}", self.id), Arc::clone(self) as Arc<dyn MediaStreamTrack>)
    }
}

impl MediaStreamTrack for FakeTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RoomBehaviour {
    pub fail_prepare: bool,
    pub fail_connect: bool,
    pub fail_disconnect: bool,
    /// Tracks published by the provider once the room connects
    pub tracks_on_connect: Vec<Arc<FakeTrack>>,
    /// Tracks published as soon as the connection is prepared
    pub tracks_on_prepare: Vec<Arc<FakeTrack>>,
}

pub struct FakeRoom {
    log: CallLog,
    behaviour: RoomBehaviour,
    sink: Mutex<Option<Arc<dyn TrackEventSink>>>,
    connected: AtomicBool,
}

impl FakeRoom {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn publish(&self, track: &Arc<FakeTrack>) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink.track_subscribed(&track.remote());
        }
    }

    pub fn unpublish(&self, track: &Arc<FakeTrack>) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink.track_unsubscribed(&track.remote());
        }
    }
}

#[async_trait]
impl MediaRoom for FakeRoom {
    fn set_track_sink(&self, sink: Arc<dyn TrackEventSink>) {
        self.log.push("room.sink");
        *self.sink.lock() = Some(sink);
    }

    async fn prepare_connection(&self, endpoint: &MediaEndpoint) -> Result<(), MediaError> {
        self.log.push(format!("room.prepare:{}:{}", endpoint.url, endpoint.access_token));
        if self.behaviour.fail_prepare {
            return Err(MediaError::Prepare("unreachable".to_string()));
        }
        for track in &self.behaviour.tracks_on_prepare {
            self.publish(track);
        }
        Ok(())
    }

    async fn connect(&self, endpoint: &MediaEndpoint) -> Result<(), MediaError> {
        self.log.push(format!("room.connect:{}:{}", endpoint.url, endpoint.access_token));
        if self.behaviour.fail_connect {
            return Err(MediaError::Connect("handshake rejected".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        for track in &self.behaviour.tracks_on_connect {
            self.publish(track);
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), MediaError> {
        self.log.push("room.disconnect");
        self.connected.store(false, Ordering::SeqCst);
        if self.behaviour.fail_disconnect {
            return Err(MediaError::Disconnect("socket already closed".to_string()));
        }
        Ok(())
    }
}

pub struct FakeRoomFactory {
    log: CallLog,
    pub fail_create: AtomicBool,
    behaviour: Mutex<Option<RoomBehaviour>>,
    pub rooms: Mutex<Vec<Arc<FakeRoom>>>,
    pub options: Mutex<Vec<RoomOptions>>,
}

impl FakeRoomFactory {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_create: AtomicBool::new(false),
            behaviour: Mutex::new(None),
            rooms: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
        }
    }

    /// Behaviour of the next room created
    pub fn next_room(&self, behaviour: RoomBehaviour) {
        *self.behaviour.lock() = Some(behaviour);
    }

    pub fn last_room(&self) -> Option<Arc<FakeRoom>> {
        self.rooms.lock().last().cloned()
    }
}

impl MediaRoomFactory for FakeRoomFactory {
    fn create_room(&self, options: &RoomOptions) -> Result<Arc<dyn MediaRoom>, MediaError> {
        self.log.push("room.create");
        self.options.lock().push(options.clone());
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(MediaError::Create("no media support".to_string()));
        }

        let room = Arc::new(FakeRoom {
            log: self.log.clone(),
            behaviour: self.behaviour.lock().take().unwrap_or_default(),
            sink: Mutex::new(None),
            connected: AtomicBool::new(false),
        });
        self.rooms.lock().push(Arc::clone(&room));
        Ok(room)
    }
}

pub struct FakeSurface {
    pub source: Mutex<Option<MediaStream>>,
    muted: AtomicBool,
    volume: Mutex<f32>,
    plays: AtomicUsize,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            source: Mutex::new(None),
            muted: AtomicBool::new(true),
            volume: Mutex::new(0.0),
            plays: AtomicUsize::new(0),
        })
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn source(&self) -> Option<MediaStream> {
        self.source.lock().clone()
    }
}

impl RenderSurface for FakeSurface {
    fn set_source(&self, stream: Option<MediaStream>) {
        *self.source.lock() = stream;
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume;
    }

    fn play(&self) -> Result<(), MediaError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Harness {
    pub log: CallLog,
    pub control_plane: Arc<FakeControlPlane>,
    pub rooms: Arc<FakeRoomFactory>,
    pub surface: Arc<FakeSurface>,
}

impl Harness {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            control_plane: Arc::new(FakeControlPlane::new(log.clone())),
            rooms: Arc::new(FakeRoomFactory::new(log.clone())),
            surface: FakeSurface::new(),
            log,
        }
    }

    pub fn controller(&self) -> SessionController {
        SessionController::new(self.control_plane.clone(), self.rooms.clone())
    }

    pub fn fail_at(&self, step: Step) {
        match step {
            Step::Token => self.control_plane.fail(ControlOp::Token),
            Step::Session => self.control_plane.fail(ControlOp::New),
            Step::Room => self.rooms.fail_create.store(true, Ordering::SeqCst),
            Step::Prepare => self.rooms.next_room(RoomBehaviour {
                fail_prepare: true,
                ..Default::default()
            }),
            Step::Start => self.control_plane.fail(ControlOp::Start),
            Step::Connect => self.rooms.next_room(RoomBehaviour {
                fail_connect: true,
                ..Default::default()
            }),
        }
    }
}
