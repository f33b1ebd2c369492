use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

use super::{MediaStream, RemoteTrack, RenderSurface, TrackEventSink, TrackKind};

#[derive(Default)]
struct AggregatorState {
    stream: Option<MediaStream>,
    surface: Option<Arc<dyn RenderSurface>>,
}

/// Folds the room's subscribed tracks into one output stream bound to the
/// render surface.
///
/// Surface calls are made outside the internal lock.
#[derive(Default)]
pub struct MediaTrackAggregator {
    state: Mutex<AggregatorState>,
}

impl MediaTrackAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or unbind with `None`) the render surface. An existing stream is
    /// attached immediately; a previously bound surface is detached.
    pub fn bind_surface(&self, surface: Option<Arc<dyn RenderSurface>>) {
        let (previous, stream) = {
            let mut state = self.state.lock();
            let previous = std::mem::replace(&mut state.surface, surface.clone());
            (previous, state.stream.clone())
        };

        if let Some(previous) = previous {
            let rebinding_same = surface
                .as_ref()
                .map(|s| same_surface(s, &previous))
                .unwrap_or(false);
            if !rebinding_same {
                previous.set_source(None);
            }
        }

        if let (Some(surface), Some(stream)) = (surface, stream) {
            surface.set_source(Some(stream));
        }
    }

    pub fn stream(&self) -> Option<MediaStream> {
        self.state.lock().stream.clone()
    }

    pub fn track_count(&self) -> usize {
        self.state.lock().stream.as_ref().map_or(0, MediaStream::len)
    }

    /// Unmute and start playback on the bound surface, if any
    pub fn activate_playback(&self) {
        if let Some(surface) = self.surface() {
            unmute_and_play(surface.as_ref());
        }
    }

    /// Stop every track and drop the stream. Safe on an empty aggregator.
    pub fn clear(&self) -> usize {
        let stream = self.state.lock().stream.take();
        let stopped = stream.map_or(0, |s| s.stop_all());
        if stopped > 0 {
            debug!(stopped, "Stopped aggregated tracks");
        }
        stopped
    }

    /// Empty the surface's source while keeping the surface bound
    pub fn detach_surface(&self) {
        if let Some(surface) = self.surface() {
            surface.set_source(None);
        }
    }

    fn surface(&self) -> Option<Arc<dyn RenderSurface>> {
        self.state.lock().surface.clone()
    }
}

impl TrackEventSink for MediaTrackAggregator {
    fn track_subscribed(&self, track: &RemoteTrack) {
        info!(sid = %track.sid, kind = ?track.kind, "Track subscribed");

        let (stream, surface, created) = {
            let mut state = self.state.lock();
            let created = state.stream.is_none();
            let stream = state.stream.get_or_insert_with(MediaStream::new).clone();
            (stream, state.surface.clone(), created)
        };

        if created {
            if let Some(surface) = &surface {
                surface.set_source(Some(stream.clone()));
            }
        }

        if let Some(media_track) = &track.media_track {
            stream.add_track(Arc::clone(media_track));
        }

        // Provider streams arrive muted
        if track.kind == TrackKind::Audio {
            if let Some(surface) = &surface {
                unmute_and_play(surface.as_ref());
            }
        }
    }

    fn track_unsubscribed(&self, track: &RemoteTrack) {
        info!(sid = %track.sid, kind = ?track.kind, "Track unsubscribed");

        let Some(media_track) = &track.media_track else {
            return;
        };
        let Some(stream) = self.stream() else {
            return;
        };
        if !stream.remove_track(media_track.id()) {
            debug!(sid = %track.sid, "Unsubscribed track was not in the output stream");
        }
    }
}

fn unmute_and_play(surface: &dyn RenderSurface) {
    surface.set_muted(false);
    surface.set_volume(1.0);
    if let Err(e) = surface.play() {
        debug!("Playback not started: {}", e);
    }
}

fn same_surface(a: &Arc<dyn RenderSurface>, b: &Arc<dyn RenderSurface>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaError, MediaStreamTrack};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct TestTrack {
        id: String,
        kind: TrackKind,
        stopped: AtomicBool,
    }

    impl TestTrack {
        fn new(id: &str, kind: TrackKind) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                kind,
                stopped: AtomicBool::new(false),
            })
        }
    }

    impl MediaStreamTrack for TestTrack {
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
    struct TestSurface {
        source: Mutex<Option<MediaStream>>,
        muted: AtomicBool,
        plays: AtomicUsize,
    }

    impl RenderSurface for TestSurface {
        fn set_source(&self, stream: Option<MediaStream>) {
            *self.source.lock() = stream;
        }

        fn set_muted(&self, muted: bool) {
            self.muted.store(muted, Ordering::SeqCst);
        }

        fn set_volume(&self, _volume: f32) {}

        fn play(&self) -> Result<(), MediaError> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Err(MediaError::Playback("autoplay blocked".to_string()))
        }
    }

    fn remote(track: &Arc<TestTrack>) -> RemoteTrack {
        RemoteTrack::new(format!("sid-{}", track.id), track.clone() as Arc<dyn MediaStreamTrack>)
    }

    #[test]
    fn test_first_track_creates_stream_and_binds_surface() {
        let aggregator = MediaTrackAggregator::new();
        let surface = Arc::new(TestSurface::default());
        aggregator.bind_surface(Some(surface.clone()));

        let video = TestTrack::new("v1", TrackKind::Video);
        aggregator.track_subscribed(&remote(&video));

        let bound = surface.source.lock().clone().expect("surface bound");
        assert!(bound.contains("v1"));
        assert_eq!(aggregator.track_count(), 1);
        assert_eq!(surface.plays.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_audio_track_unmutes_and_plays() {
        let aggregator = MediaTrackAggregator::new();
        let surface = Arc::new(TestSurface {
            muted: AtomicBool::new(true),
            ..Default::default()
        });
        aggregator.bind_surface(Some(surface.clone()));

        aggregator.track_subscribed(&remote(&TestTrack::new("a1", TrackKind::Audio)));

        assert!(!surface.muted.load(Ordering::SeqCst));
        assert_eq!(surface.plays.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_binding_after_tracks_attaches_existing_stream() {
        let aggregator = MediaTrackAggregator::new();
        aggregator.track_subscribed(&remote(&TestTrack::new("v1", TrackKind::Video)));

        let surface = Arc::new(TestSurface::default());
        aggregator.bind_surface(Some(surface.clone()));

        let bound = surface.source.lock().clone().expect("surface bound");
        assert!(bound.same_stream(&aggregator.stream().unwrap()));
    }

    #[test]
    fn test_rebinding_detaches_previous_surface() {
        let aggregator = MediaTrackAggregator::new();
        let first = Arc::new(TestSurface::default());
        let second = Arc::new(TestSurface::default());
        aggregator.track_subscribed(&remote(&TestTrack::new("v1", TrackKind::Video)));

        aggregator.bind_surface(Some(first.clone()));
        aggregator.bind_surface(Some(second.clone()));

        assert!(first.source.lock().is_none());
        assert!(second.source.lock().is_some());
    }

    #[test]
    fn test_unsubscribe_unknown_track_is_tolerated() {
        let aggregator = MediaTrackAggregator::new();
        let stray = TestTrack::new("ghost", TrackKind::Video);

        aggregator.track_unsubscribed(&remote(&stray));

        aggregator.track_subscribed(&remote(&TestTrack::new("v1", TrackKind::Video)));
        aggregator.track_unsubscribed(&remote(&stray));
        assert_eq!(aggregator.track_count(), 1);
    }

    #[test]
    fn test_unsubscribe_removes_track() {
        let aggregator = MediaTrackAggregator::new();
        let video = TestTrack::new("v1", TrackKind::Video);
        aggregator.track_subscribed(&remote(&video));

        aggregator.track_unsubscribed(&remote(&video));
        aggregator.track_unsubscribed(&remote(&video));

        assert_eq!(aggregator.track_count(), 0);
    }

    #[test]
    fn test_clear_stops_tracks_and_is_repeatable() {
        let aggregator = MediaTrackAggregator::new();
        let video = TestTrack::new("v1", TrackKind::Video);
        let audio = TestTrack::new("a1", TrackKind::Audio);
        aggregator.track_subscribed(&remote(&video));
        aggregator.track_subscribed(&remote(&audio));

        assert_eq!(aggregator.clear(), 2);
        assert!(video.stopped.load(Ordering::SeqCst));
        assert!(audio.stopped.load(Ordering::SeqCst));
        assert_eq!(aggregator.clear(), 0);
        assert!(aggregator.stream().is_none());
    }

    #[test]
    fn test_track_without_media_component_is_skipped() {
        let aggregator = MediaTrackAggregator::new();
        aggregator.track_subscribed(&RemoteTrack {
            sid: "pending".to_string(),
            kind: TrackKind::Video,
            media_track: None,
        });

        assert!(aggregator.stream().is_some());
        assert_eq!(aggregator.track_count(), 0);
    }
}
