use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::MediaStreamTrack;

/// Shared, mutable collection of live tracks.
///
/// Clones are handles to the same stream, so a render surface holding one
/// sees tracks added or removed afterwards.
#[derive(Clone)]
pub struct MediaStream {
    id: Arc<str>,
    tracks: Arc<Mutex<Vec<Arc<dyn MediaStreamTrack>>>>,
}

impl MediaStream {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string().into(),
            tracks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns false if a track with the same id is already present
    pub fn add_track(&self, track: Arc<dyn MediaStreamTrack>) -> bool {
        let mut tracks = self.tracks.lock();
        if tracks.iter().any(|t| t.id() == track.id()) {
            return false;
        }
        tracks.push(track);
        true
    }

    /// Returns false if no track with that id is present
    pub fn remove_track(&self, track_id: &str) -> bool {
        let mut tracks = self.tracks.lock();
        let before = tracks.len();
        tracks.retain(|t| t.id() != track_id);
        tracks.len() != before
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.lock().iter().any(|t| t.id() == track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.lock().is_empty()
    }

    /// Stop and remove every track; returns how many were stopped
    pub fn stop_all(&self) -> usize {
        let drained: Vec<_> = self.tracks.lock().drain(..).collect();
        for track in &drained {
            track.stop();
        }
        drained.len()
    }

    pub fn same_stream(&self, other: &MediaStream) -> bool {
        Arc::ptr_eq(&self.tracks, &other.tracks)
    }
}

impl Default for MediaStream {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.len())
            .finish()
    }
}
