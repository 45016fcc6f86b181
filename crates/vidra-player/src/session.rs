use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use vidra_abr::{AbrController, AbrMode, Rendition, SampleSource, ThroughputSample};
use vidra_manifest::Manifest;
use vidra_net::{Fetch, FetchSource, FetchedChunk};

use crate::error::{FetchFailure, PlayerError, PlayerResult, Track};
use crate::events::{EventEmitter, SessionEvent};
use crate::options::{SessionOptions, AUDIO_MIME_FALLBACKS, VIDEO_MIME_FALLBACKS};
use crate::pacer::Pacer;
use crate::pipeline::{BufferSink, MediaPipeline};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Initializing,
    /// Fetching and appending a new video init segment mid-stream.
    SwitchingTrack,
    Streaming,
    Completed,
    Failed,
}

#[derive(Default)]
struct Control {
    pending_mode: Mutex<Option<AbrMode>>,
}

/// Control surface for a running session.
///
/// Cheap to clone; all methods are safe to call from any task at any time.
#[derive(Clone)]
pub struct SessionHandle {
    control: Arc<Control>,
    emitter: EventEmitter,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Request a mode change; applied at the top of the next loop round.
    pub fn set_mode(&self, mode: AbrMode) {
        *self.control.pending_mode.lock() = Some(mode);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.emitter.subscribe()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// One playback of one video.
///
/// Drives two tracks against the decode pipeline: the video track moves
/// between representations under ABR control, the audio track has exactly
/// one. Segment indices are paired; playback length is the shorter track.
pub struct PlaybackSession<F, P: MediaPipeline> {
    manifest: Manifest,
    fetcher: F,
    pipeline: P,
    options: SessionOptions,
    controller: AbrController,
    pacer: Pacer,
    emitter: EventEmitter,
    control: Arc<Control>,
    state: SessionState,
}

impl<F: Fetch, P: MediaPipeline> PlaybackSession<F, P> {
    pub fn new(
        manifest: Manifest,
        fetcher: F,
        pipeline: P,
        options: SessionOptions,
    ) -> (Self, SessionHandle) {
        let emitter = EventEmitter::new(options.event_capacity);
        let control = Arc::new(Control::default());
        let handle = SessionHandle {
            control: Arc::clone(&control),
            emitter: emitter.clone(),
            cancel: options.cancel.clone(),
        };
        let controller = AbrController::new(options.abr.clone());
        let pacer = Pacer::new(options.pacer);

        let session = Self {
            manifest,
            fetcher,
            pipeline,
            options,
            controller,
            pacer,
            emitter,
            control,
            state: SessionState::Initializing,
        };
        (session, handle)
    }

    /// Run the session to completion.
    ///
    /// On success the pipeline is told end-of-stream. On failure the same
    /// signal is sent best-effort, the error is emitted as an event and
    /// returned; the session never retries.
    pub async fn run(mut self) -> PlayerResult<()> {
        match self.drive().await {
            Ok(()) => {
                self.set_state(SessionState::Completed);
                self.pipeline.end_of_stream();
                self.emitter.emit(SessionEvent::EndOfStream);
                info!("playback completed");
                Ok(())
            }
            Err(err) => {
                self.set_state(SessionState::Failed);
                warn!(error = %err, "playback failed");
                self.emitter.emit(SessionEvent::Error(err.to_string()));
                self.pipeline.end_of_stream();
                Err(err)
            }
        }
    }

    async fn drive(&mut self) -> PlayerResult<()> {
        self.set_state(SessionState::Initializing);

        let video_mime = self.negotiate(Track::Video)?;
        let audio_mime = self.negotiate(Track::Audio)?;
        debug!(%video_mime, %audio_mime, "codecs negotiated");

        let mut video_sink =
            self.pipeline
                .create_sink(&video_mime)
                .map_err(|source| PlayerError::SinkCreate {
                    track: Track::Video,
                    source,
                })?;
        let mut audio_sink =
            self.pipeline
                .create_sink(&audio_mime)
                .map_err(|source| PlayerError::SinkCreate {
                    track: Track::Audio,
                    source,
                })?;

        let renditions = renditions_of(&self.manifest);
        let mut label = self
            .controller
            .decide(&renditions, Instant::now())
            .ok_or(PlayerError::NoSegments)?
            .label;

        let video_init_url = self.manifest.init_url(&label)?;
        let audio_init_url = self.manifest.audio_init_url()?;
        let (video_init, audio_init) = self
            .guard(async {
                tokio::try_join!(
                    fetch_init(&self.fetcher, video_init_url, Track::Video),
                    fetch_init(&self.fetcher, audio_init_url, Track::Audio),
                )
            })
            .await?;

        append(&mut video_sink, Track::Video, video_init).await?;
        append(&mut audio_sink, Track::Audio, audio_init).await?;

        // Checked after the inits are in place, and fixed for the whole
        // session: a later switch never recomputes it.
        let total = {
            let rep = self
                .manifest
                .representation(&label)
                .ok_or(PlayerError::NoSegments)?;
            rep.chunk_count.min(self.manifest.audio().chunk_count)
        };
        if total < 1 {
            return Err(PlayerError::NoSegments);
        }
        debug!(%label, total, "session initialized");

        self.set_state(SessionState::Streaming);
        for index in 1..=total {
            self.apply_pending_mode();
            self.pacer
                .wait_for_capacity(&self.pipeline, &self.options.cancel)
                .await?;

            let decision = self
                .controller
                .decide(&renditions, Instant::now())
                .ok_or(PlayerError::NoSegments)?;
            if decision.changed && decision.label != label {
                self.switch_video_init(&mut video_sink, &decision.label)
                    .await?;
                self.emitter.emit(SessionEvent::RepresentationSwitched {
                    from: Some(label.clone()),
                    to: decision.label.clone(),
                });
                label = decision.label;
            }

            let video_url = self.manifest.media_url(&label, index)?;
            let audio_url = self.manifest.audio_media_url(index)?;
            let (video_chunk, audio_chunk) = self
                .guard(async {
                    tokio::try_join!(
                        fetch_media(&self.fetcher, video_url, Track::Video, index),
                        fetch_media(&self.fetcher, audio_url, Track::Audio, index),
                    )
                })
                .await?;

            // Only the video track feeds the estimator; audio segments are
            // small enough to skew it.
            self.controller.push_sample(sample_of(&video_chunk));
            self.emitter.emit(SessionEvent::Throughput {
                kbps: self.controller.throughput_kbps(),
            });

            append(&mut video_sink, Track::Video, video_chunk).await?;
            append(&mut audio_sink, Track::Audio, audio_chunk).await?;

            self.emitter.emit(SessionEvent::SegmentComplete {
                index,
                total,
                label: label.clone(),
            });
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    async fn switch_video_init(
        &mut self,
        sink: &mut P::Sink,
        label: &str,
    ) -> PlayerResult<()> {
        self.set_state(SessionState::SwitchingTrack);

        let url = self.manifest.init_url(label)?;
        let chunk = self
            .guard(async {
                self.fetcher
                    .fetch(url)
                    .await
                    .map_err(|err| PlayerError::SwitchInitFailed {
                        label: label.to_owned(),
                        reason: err.into(),
                    })
            })
            .await?;
        if !chunk.is_success() {
            return Err(PlayerError::SwitchInitFailed {
                label: label.to_owned(),
                reason: FetchFailure::Status(chunk.status),
            });
        }

        append(sink, Track::Video, chunk).await?;
        self.set_state(SessionState::Streaming);
        Ok(())
    }

    /// Take a pending mode request from the handle. An Auto to Manual
    /// transition also nudges the position toward the buffered edge, so the
    /// pinned representation becomes visible without draining the old
    /// buffer first.
    fn apply_pending_mode(&mut self) {
        let Some(mode) = self.control.pending_mode.lock().take() else {
            return;
        };
        let was_auto = matches!(self.controller.mode(), AbrMode::Auto);
        let to_manual = matches!(mode, AbrMode::Manual(_));
        self.controller.set_mode(mode);

        if was_auto && to_manual {
            if let Some(end) = self.pipeline.buffered_end_secs() {
                let target = (end - 0.05).max(0.0);
                debug!(position_secs = target, "nudging playback to buffered edge");
                self.pipeline.seek(target);
            }
        }
    }

    fn negotiate(&self, track: Track) -> PlayerResult<String> {
        let doc = self.manifest.doc();
        let (from_manifest, fallbacks): (Vec<&str>, &[&str]) = match track {
            Track::Video => (
                doc.video_mime
                    .as_deref()
                    .into_iter()
                    .chain(doc.mime.as_deref())
                    .collect(),
                VIDEO_MIME_FALLBACKS,
            ),
            Track::Audio => (
                doc.audio_mime.as_deref().into_iter().collect(),
                AUDIO_MIME_FALLBACKS,
            ),
        };

        from_manifest
            .into_iter()
            .chain(fallbacks.iter().copied())
            .find(|mime| self.pipeline.is_type_supported(mime))
            .map(str::to_owned)
            .ok_or(PlayerError::UnsupportedCodec { track })
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "session state");
            self.state = state;
            self.emitter.emit(SessionEvent::StateChanged(state));
        }
    }

    /// Race a future against cancellation. An abandoned fetch may still
    /// complete in the background; its result is discarded.
    async fn guard<T>(&self, fut: impl Future<Output = PlayerResult<T>>) -> PlayerResult<T> {
        tokio::select! {
            biased;
            _ = self.options.cancel.cancelled() => Err(PlayerError::Cancelled),
            res = fut => res,
        }
    }
}

fn renditions_of(manifest: &Manifest) -> Vec<Rendition> {
    manifest
        .doc()
        .resolutions
        .iter()
        .map(|(label, info)| Rendition::new(label.clone(), info.bitrate_kbps))
        .collect()
}

fn sample_of(chunk: &FetchedChunk) -> ThroughputSample {
    ThroughputSample {
        bytes: chunk.bytes.len() as u64,
        elapsed: chunk.elapsed,
        source: match chunk.source {
            FetchSource::Network => SampleSource::Network,
            FetchSource::Cache => SampleSource::Cache,
        },
    }
}

async fn fetch_init<F: Fetch>(fetcher: &F, url: Url, track: Track) -> PlayerResult<FetchedChunk> {
    let chunk = fetcher
        .fetch(url)
        .await
        .map_err(|err| PlayerError::InitFetchFailed {
            track,
            reason: err.into(),
        })?;
    if !chunk.is_success() {
        return Err(PlayerError::InitFetchFailed {
            track,
            reason: FetchFailure::Status(chunk.status),
        });
    }
    Ok(chunk)
}

async fn fetch_media<F: Fetch>(
    fetcher: &F,
    url: Url,
    track: Track,
    index: u32,
) -> PlayerResult<FetchedChunk> {
    let chunk = fetcher
        .fetch(url)
        .await
        .map_err(|err| PlayerError::SegmentFetchFailed {
            track,
            index,
            reason: err.into(),
        })?;
    if !chunk.is_success() {
        return Err(PlayerError::SegmentFetchFailed {
            track,
            index,
            reason: FetchFailure::Status(chunk.status),
        });
    }
    Ok(chunk)
}

async fn append<S: BufferSink>(sink: &mut S, track: Track, chunk: FetchedChunk) -> PlayerResult<()> {
    sink.append(chunk.bytes)
        .await
        .map_err(|source| PlayerError::SinkAppend { track, source })
}
