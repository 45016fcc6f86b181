//! End-to-end playback session tests over a fake decode pipeline and a
//! scripted segment fetcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;
use vidra_abr::{AbrMode, AbrOptions};
use vidra_cache::{CachedFetcher, SegmentStore};
use vidra_manifest::{Manifest, ManifestDoc};
use vidra_net::{Fetch, FetchSource, FetchedChunk, NetError};
use vidra_player::{PlaybackSession, PlayerError, SessionOptions, Track};

// --- fixtures ---------------------------------------------------------

#[derive(Default)]
struct PipelineState {
    supported: Option<Vec<String>>,
    buffered_end: Option<f64>,
    position: f64,
    seeks: Vec<f64>,
    appends: Vec<(String, usize)>,
    fail_appends: bool,
    ended: bool,
}

#[derive(Clone, Default)]
struct FakePipeline {
    state: Arc<Mutex<PipelineState>>,
}

impl FakePipeline {
    fn supporting(mimes: &[&str]) -> Self {
        let pipeline = Self::default();
        pipeline.state.lock().supported = Some(mimes.iter().map(|m| m.to_string()).collect());
        pipeline
    }

    fn with_buffered_end(self, end: f64) -> Self {
        self.state.lock().buffered_end = Some(end);
        self
    }

    fn failing_appends(self) -> Self {
        self.state.lock().fail_appends = true;
        self
    }

    fn appends_for(&self, mime_substr: &str) -> usize {
        self.state
            .lock()
            .appends
            .iter()
            .filter(|(mime, _)| mime.contains(mime_substr))
            .count()
    }

    fn ended(&self) -> bool {
        self.state.lock().ended
    }

    fn seeks(&self) -> Vec<f64> {
        self.state.lock().seeks.clone()
    }
}

struct FakeSink {
    mime: String,
    state: Arc<Mutex<PipelineState>>,
}

#[async_trait]
impl vidra_player::BufferSink for FakeSink {
    async fn append(&mut self, bytes: Bytes) -> Result<(), vidra_player::SinkError> {
        let mut state = self.state.lock();
        if state.fail_appends {
            return Err(vidra_player::SinkError::new("buffer rejected append"));
        }
        state.appends.push((self.mime.clone(), bytes.len()));
        Ok(())
    }
}

impl vidra_player::MediaPipeline for FakePipeline {
    type Sink = FakeSink;

    fn is_type_supported(&self, mime: &str) -> bool {
        match &self.state.lock().supported {
            Some(list) => list.iter().any(|m| m == mime),
            None => true,
        }
    }

    fn create_sink(&self, mime: &str) -> Result<FakeSink, vidra_player::SinkError> {
        Ok(FakeSink {
            mime: mime.to_string(),
            state: Arc::clone(&self.state),
        })
    }

    fn buffered_end_secs(&self) -> Option<f64> {
        self.state.lock().buffered_end
    }

    fn position_secs(&self) -> f64 {
        self.state.lock().position
    }

    fn seek(&self, position_secs: f64) {
        let mut state = self.state.lock();
        state.seeks.push(position_secs);
        state.position = position_secs;
    }

    fn end_of_stream(&self) {
        self.state.lock().ended = true;
    }
}

/// Serves every URL with a 200 unless overridden, and logs each fetch.
#[derive(Clone, Default)]
struct ScriptedFetcher {
    statuses: HashMap<String, u16>,
    payload_len: usize,
    elapsed: Duration,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            statuses: HashMap::new(),
            payload_len: 50_000,
            elapsed: Duration::from_millis(400),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 50_000 bytes in 400 ms is 1000 kbps: comfortably 360p territory.
    fn slow() -> Self {
        Self::new()
    }

    /// 1_000_000 bytes in 100 ms is 80_000 kbps: any ladder fits.
    fn fast() -> Self {
        Self {
            payload_len: 1_000_000,
            elapsed: Duration::from_millis(100),
            ..Self::new()
        }
    }

    fn with_status(mut self, url_suffix: &str, status: u16) -> Self {
        self.statuses.insert(url_suffix.to_string(), status);
        self
    }

    fn fetched(&self, substr: &str) -> usize {
        self.log.lock().iter().filter(|u| u.contains(substr)).count()
    }

    fn fetch_count(&self) -> usize {
        self.log.lock().len()
    }
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn fetch(&self, url: Url) -> Result<FetchedChunk, NetError> {
        self.log.lock().push(url.to_string());
        let status = self
            .statuses
            .iter()
            .find(|(suffix, _)| url.as_str().ends_with(suffix.as_str()))
            .map(|(_, status)| *status)
            .unwrap_or(200);
        Ok(FetchedChunk {
            url,
            status,
            bytes: Bytes::from(vec![0u8; self.payload_len]),
            elapsed: self.elapsed,
            source: FetchSource::Network,
        })
    }
}

fn manifest(video_chunks: u32, audio_chunks: u32) -> Manifest {
    let doc: ManifestDoc = serde_json::from_str(&format!(
        r#"{{
            "resolutions": {{
                "360p": {{"bitrate_kbps": 500, "path": "360p", "chunk_count": {video_chunks}}},
                "720p": {{"bitrate_kbps": 2500, "path": "720p", "chunk_count": {video_chunks}}}
            }},
            "audio": {{"path": "audio", "chunk_count": {audio_chunks}}},
            "init_name": "init.m4s"
        }}"#
    ))
    .unwrap();
    Manifest::new(
        doc,
        Url::parse("http://m.test/videos/v/manifest.json").unwrap(),
    )
}

fn options() -> SessionOptions {
    SessionOptions::new().with_abr(AbrOptions {
        min_switch_interval: Duration::ZERO,
        ..AbrOptions::default()
    })
}

// --- tests ------------------------------------------------------------

#[tokio::test]
async fn playback_length_is_the_shorter_track() {
    let fetcher = ScriptedFetcher::slow();
    let pipeline = FakePipeline::default();
    let (session, _handle) =
        PlaybackSession::new(manifest(10, 8), fetcher.clone(), pipeline.clone(), options());

    session.run().await.unwrap();

    // Audio has 8 chunks, so only 8 video chunks are fetched despite 10
    // being available.
    assert_eq!(fetcher.fetched("/audio/chunk_"), 8);
    assert_eq!(fetcher.fetched("/360p/chunk_"), 8);
    assert_eq!(fetcher.fetched("chunk_00008.m4s"), 2);
    assert_eq!(fetcher.fetched("chunk_00009.m4s"), 0);
    assert!(pipeline.ended());
    // 2 inits + 8 video + 8 audio appends.
    assert_eq!(pipeline.appends_for("video/"), 9);
    assert_eq!(pipeline.appends_for("audio/"), 9);
}

#[tokio::test]
async fn upward_switch_refetches_the_video_init_only() {
    let fetcher = ScriptedFetcher::fast();
    let pipeline = FakePipeline::default();
    let (session, _handle) =
        PlaybackSession::new(manifest(10, 8), fetcher.clone(), pipeline.clone(), options());

    session.run().await.unwrap();

    // Seeded at 1500 kbps the session starts on 360p; the first fast
    // sample moves it to 720p.
    assert_eq!(fetcher.fetched("/360p/init.m4s"), 1);
    assert_eq!(fetcher.fetched("/720p/init.m4s"), 1);
    assert_eq!(fetcher.fetched("/audio/init.m4s"), 1);

    // Total media fetches are unchanged by the switch.
    assert_eq!(
        fetcher.fetched("/360p/chunk_") + fetcher.fetched("/720p/chunk_"),
        8
    );
    assert_eq!(fetcher.fetched("/720p/chunk_"), 7);
    assert_eq!(fetcher.fetched("/audio/chunk_"), 8);
}

#[tokio::test]
async fn failed_segment_fetch_ends_the_session() {
    let fetcher = ScriptedFetcher::slow().with_status("360p/chunk_00003.m4s", 404);
    let pipeline = FakePipeline::default();
    let (session, _handle) =
        PlaybackSession::new(manifest(10, 8), fetcher.clone(), pipeline.clone(), options());

    let err = session.run().await.unwrap_err();
    match err {
        PlayerError::SegmentFetchFailed { track, index, .. } => {
            assert_eq!(track, Track::Video);
            assert_eq!(index, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(pipeline.ended(), "end_of_stream is best-effort on failure");
    assert_eq!(fetcher.fetched("chunk_00004.m4s"), 0);
}

#[tokio::test]
async fn rejected_sink_append_ends_the_session() {
    let fetcher = ScriptedFetcher::slow();
    let pipeline = FakePipeline::default().failing_appends();
    let (session, _handle) =
        PlaybackSession::new(manifest(10, 8), fetcher, pipeline.clone(), options());

    let err = session.run().await.unwrap_err();
    assert!(matches!(
        err,
        PlayerError::SinkAppend {
            track: Track::Video,
            ..
        }
    ));
    assert!(pipeline.ended(), "end_of_stream is best-effort on failure");
}

#[tokio::test]
async fn failed_switch_init_names_the_representation() {
    // Fast network pushes the session toward 720p, whose init is missing.
    let fetcher = ScriptedFetcher::fast().with_status("720p/init.m4s", 404);
    let pipeline = FakePipeline::default();
    let (session, _handle) =
        PlaybackSession::new(manifest(10, 8), fetcher.clone(), pipeline.clone(), options());

    let err = session.run().await.unwrap_err();
    match err {
        PlayerError::SwitchInitFailed { label, .. } => assert_eq!(label, "720p"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(fetcher.fetched("/720p/chunk_"), 0);
    assert!(pipeline.ended());
}

#[tokio::test]
async fn empty_tracks_fail_after_the_inits_are_appended() {
    let fetcher = ScriptedFetcher::slow();
    let pipeline = FakePipeline::default();
    let (session, _handle) =
        PlaybackSession::new(manifest(0, 0), fetcher.clone(), pipeline.clone(), options());

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, PlayerError::NoSegments));
    // Both inits were fetched and appended before the length check.
    assert_eq!(fetcher.fetched("/360p/init.m4s"), 1);
    assert_eq!(fetcher.fetched("/audio/init.m4s"), 1);
    assert_eq!(pipeline.appends_for("video/"), 1);
}

#[tokio::test]
async fn broken_init_wins_over_an_empty_track() {
    // A zero-chunk manifest whose init also 404s reports the init failure.
    let fetcher = ScriptedFetcher::slow().with_status("360p/init.m4s", 404);
    let pipeline = FakePipeline::default();
    let (session, _handle) =
        PlaybackSession::new(manifest(0, 0), fetcher, pipeline, options());

    let err = session.run().await.unwrap_err();
    assert!(matches!(
        err,
        PlayerError::InitFetchFailed {
            track: Track::Video,
            ..
        }
    ));
}

#[tokio::test]
async fn failed_init_fetch_names_the_track() {
    let fetcher = ScriptedFetcher::slow().with_status("audio/init.m4s", 500);
    let pipeline = FakePipeline::default();
    let (session, _handle) =
        PlaybackSession::new(manifest(10, 8), fetcher.clone(), pipeline.clone(), options());

    let err = session.run().await.unwrap_err();
    assert!(matches!(
        err,
        PlayerError::InitFetchFailed {
            track: Track::Audio,
            ..
        }
    ));
}

#[tokio::test]
async fn manual_pin_ignores_fast_network() {
    let fetcher = ScriptedFetcher::fast();
    let pipeline = FakePipeline::default();
    let (session, handle) =
        PlaybackSession::new(manifest(10, 8), fetcher.clone(), pipeline.clone(), options());

    handle.set_mode(AbrMode::Manual("360p".into()));
    session.run().await.unwrap();

    assert_eq!(fetcher.fetched("/720p/"), 0);
    assert_eq!(fetcher.fetched("/360p/chunk_"), 8);
}

#[tokio::test]
async fn switching_to_manual_nudges_playback_forward() {
    let fetcher = ScriptedFetcher::slow();
    // 3 s buffered, below the pacing target, so the loop keeps running.
    let pipeline = FakePipeline::default().with_buffered_end(3.0);
    let (session, handle) =
        PlaybackSession::new(manifest(4, 4), fetcher, pipeline.clone(), options());

    handle.set_mode(AbrMode::Manual("360p".into()));
    session.run().await.unwrap();

    let seeks = pipeline.seeks();
    assert_eq!(seeks.len(), 1);
    assert!((seeks[0] - 2.95).abs() < 1e-9);
}

#[tokio::test]
async fn unsupported_codec_fails_before_any_fetch() {
    let fetcher = ScriptedFetcher::slow();
    let pipeline = FakePipeline::supporting(&["audio/mp4; codecs=\"mp4a.40.2\""]);
    let (session, _handle) =
        PlaybackSession::new(manifest(10, 8), fetcher.clone(), pipeline, options());

    let err = session.run().await.unwrap_err();
    assert!(matches!(
        err,
        PlayerError::UnsupportedCodec {
            track: Track::Video
        }
    ));
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn cancellation_is_terminal() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let fetcher = ScriptedFetcher::slow();
    let pipeline = FakePipeline::default();
    let (session, _handle) = PlaybackSession::new(
        manifest(10, 8),
        fetcher,
        pipeline,
        options().with_cancel(cancel),
    );

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, PlayerError::Cancelled));
}

#[tokio::test]
async fn replay_over_a_shared_store_skips_the_network() {
    let store = Arc::new(SegmentStore::default());

    let first_net = ScriptedFetcher::slow();
    let (session, _handle) = PlaybackSession::new(
        manifest(6, 6),
        CachedFetcher::new(first_net.clone(), Arc::clone(&store)),
        FakePipeline::default(),
        options(),
    );
    session.run().await.unwrap();
    assert!(first_net.fetch_count() > 0);

    // Same video, fresh session, same store: everything is a cache hit.
    let second_net = ScriptedFetcher::slow();
    let pipeline = FakePipeline::default();
    let (session, _handle) = PlaybackSession::new(
        manifest(6, 6),
        CachedFetcher::new(second_net.clone(), Arc::clone(&store)),
        pipeline.clone(),
        options(),
    );
    session.run().await.unwrap();

    assert_eq!(second_net.fetch_count(), 0);
    assert!(pipeline.ended());
    assert_eq!(pipeline.appends_for("video/"), 7);
}
