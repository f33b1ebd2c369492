// Media plane ports - the real-time room, its tracks and the render surface
// are consumed as opaque abstractions; transport internals live behind them.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::MediaEndpoint;

pub mod aggregator;
pub mod stream;

pub use aggregator::MediaTrackAggregator;
pub use stream::MediaStream;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("failed to create media room: {0}")]
    Create(String),

    #[error("failed to prepare media connection: {0}")]
    Prepare(String),

    #[error("failed to connect media room: {0}")]
    Connect(String),

    #[error("failed to disconnect media room: {0}")]
    Disconnect(String),

    #[error("playback refused: {0}")]
    Playback(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A live audio or video component delivered by the media plane
pub trait MediaStreamTrack: Send + Sync {
    fn id(&self) -> &str;
    fn kind(&self) -> TrackKind;
    /// Release the underlying capture/decoder; must be safe to repeat
    fn stop(&self);
}

/// Track as announced by the room's subscription events
#[derive(Clone)]
pub struct RemoteTrack {
    pub sid: String,
    pub kind: TrackKind,
    /// Absent when the room has not yet attached a playable track
    pub media_track: Option<Arc<dyn MediaStreamTrack>>,
}

impl RemoteTrack {
    pub fn new(sid: impl Into<String>, media_track: Arc<dyn MediaStreamTrack>) -> Self {
        Self {
            sid: sid.into(),
            kind: media_track.kind(),
            media_track: Some(media_track),
        }
    }
}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack")
            .field("sid", &self.sid)
            .field("kind", &self.kind)
            .field("media_track", &self.media_track.as_ref().map(|t| t.id().to_string()))
            .finish()
    }
}

/// Receiver of the room's track-subscribed/unsubscribed events.
///
/// Events can arrive at any time after registration, independent of
/// handshake progress.
pub trait TrackEventSink: Send + Sync {
    fn track_subscribed(&self, track: &RemoteTrack);
    fn track_unsubscribed(&self, track: &RemoteTrack);
}

/// Real-time media room
#[async_trait]
pub trait MediaRoom: Send + Sync {
    /// Register the track event handlers; called before any connection attempt
    fn set_track_sink(&self, sink: Arc<dyn TrackEventSink>);

    /// Pre-warm the network path without the full handshake
    async fn prepare_connection(&self, endpoint: &MediaEndpoint) -> Result<(), MediaError>;

    async fn connect(&self, endpoint: &MediaEndpoint) -> Result<(), MediaError>;

    async fn disconnect(&self) -> Result<(), MediaError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
}

/// Options used when instantiating a media room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOptions {
    pub adaptive_stream: bool,
    pub capture_resolution: Resolution,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            adaptive_stream: true,
            capture_resolution: Resolution {
                width: 1280,
                height: 720,
            },
        }
    }
}

/// Creates unconnected media rooms
pub trait MediaRoomFactory: Send + Sync {
    fn create_room(&self, options: &RoomOptions) -> Result<Arc<dyn MediaRoom>, MediaError>;
}

/// Audio/video-capable output the aggregated stream is rendered to
pub trait RenderSurface: Send + Sync {
    /// `None` detaches the current stream
    fn set_source(&self, stream: Option<MediaStream>);
    fn set_muted(&self, muted: bool);
    fn set_volume(&self, volume: f32);
    fn play(&self) -> Result<(), MediaError>;
}
