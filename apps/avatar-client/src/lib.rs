//! Client-side orchestration of a streaming talking-avatar session.
//!
//! [`SessionController`] runs the ordered handshake against the control plane
//! and the media room, [`MediaTrackAggregator`] folds the room's tracks into a
//! single output stream, and [`GatewayClient`] reaches the control plane and
//! the language model through the credential-shielding gateway.

pub mod controller;
pub mod conversation;
pub mod domain;
pub mod gateway_client;
pub mod media;

pub use controller::{SayOutcome, SessionController, SessionError, SkipReason};
pub use conversation::{Conversation, ConversationError};
pub use domain::{ActiveSession, MediaEndpoint, SessionStatus, StatusChanged};
pub use gateway_client::{AnswerSource, AskError, ClientSetupError, GatewayClient};
pub use media::{
    MediaError, MediaRoom, MediaRoomFactory, MediaStream, MediaStreamTrack, MediaTrackAggregator,
    RemoteTrack, RenderSurface, Resolution, RoomOptions, TrackEventSink, TrackKind,
};
