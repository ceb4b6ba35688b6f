use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use log::{debug, info};

use crate::config::InspectorConfig;
use crate::container::ContainerParser;
use crate::decode::{
    ensure_format, DecoderFactory, DecoderPool, FrameCache, Packet, PixelFormat, ReceiveResult,
    SoftwareDecoderFactory, VideoFrame,
};
use crate::errors::{InspectError, InspectResult, NoDecoderError};
use crate::mp4::Mp4FileParser;
use crate::tasks::runner::{FrameParsedCallback, StatusSink};
use crate::tasks::{ParseOperation, TaskRunner, TaskState};
use crate::tracks::{TrackInfo, TrackStore};

/// Per-track decode-order bookkeeping. Both indices are decode-order sample
/// indices, -1 meaning none; the gap between them models the decoder's
/// internal buffering. `last_decoded` never exceeds `last_extracted`.
#[derive(Debug, Clone, Copy)]
pub struct TrackDecodeState {
    pub last_extracted: i64,
    pub last_decoded: i64,
}

impl Default for TrackDecodeState {
    fn default() -> Self {
        Self {
            last_extracted: -1,
            last_decoded: -1,
        }
    }
}

impl TrackDecodeState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Outcome of the seek-necessity check for a target sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDecision {
    /// The frame is already cached; no decoder interaction needed
    InCache,
    /// Forward decode from the current position reaches the target
    Continue,
    /// Flush and restart extraction from this key-frame index
    SeekTo(usize),
}

/// The frame-access core: owns the container parser, track store, decoder
/// pool, decode-order trackers and frame cache, and orchestrates random
/// access over the sequential decoders.
///
/// Interactive calls run on the caller thread; background parse and
/// classification run on the task runner's worker. The caller must not
/// overlap interactive decoding with a running task against the same data.
pub struct Mp4Inspector {
    parser: Arc<Mutex<Box<dyn ContainerParser>>>,
    store: Arc<RwLock<TrackStore>>,
    factory: Box<dyn DecoderFactory>,
    pool: DecoderPool,
    trackers: Vec<TrackDecodeState>,
    cache: FrameCache,
    config: InspectorConfig,
    runner: TaskRunner,
}

impl Mp4Inspector {
    /// Inspector over the bundled MP4 parser and software decoders.
    pub fn new(config: InspectorConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(Mp4FileParser::new()),
            Box::new(SoftwareDecoderFactory),
        )
    }

    /// Inspector over injected collaborators, the seam the tests use.
    pub fn with_collaborators(
        config: InspectorConfig,
        parser: Box<dyn ContainerParser>,
        factory: Box<dyn DecoderFactory>,
    ) -> Self {
        let parser = Arc::new(Mutex::new(parser));
        let store = Arc::new(RwLock::new(TrackStore::new()));
        let runner = TaskRunner::new(Arc::clone(&parser), Arc::clone(&store));
        Self {
            parser,
            store,
            factory,
            pool: DecoderPool::new(),
            trackers: Vec::new(),
            cache: FrameCache::new(),
            config,
            runner,
        }
    }

    // ---- background tasks ----

    /// Start a full parse of `path` on the worker. Returns false when a
    /// task is already running.
    pub fn start_parse_file(&mut self, path: &Path) -> bool {
        self.runner
            .start_parse(ParseOperation::ParseFile(path.to_path_buf()))
    }

    /// Start the frame-type classification pass on the worker.
    pub fn start_parse_frame_types(&mut self) -> bool {
        self.sync_after_parse();
        self.runner.start_parse(ParseOperation::ParseFrameType)
    }

    pub fn stop(&self) {
        self.runner.stop();
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    pub fn task_state(&self) -> TaskState {
        self.runner.state()
    }

    /// Block until the current background operation finishes.
    pub fn wait(&mut self) {
        self.runner.wait();
    }

    pub fn parse_progress(&self) -> f32 {
        self.runner.parse_progress()
    }

    pub fn classification_progress(&self) -> f32 {
        self.runner.classification_progress()
    }

    pub fn is_data_available(&self) -> bool {
        self.runner.is_data_available()
    }

    pub fn set_on_frame_parsed(&mut self, callback: FrameParsedCallback) {
        self.runner.set_on_frame_parsed(callback);
    }

    pub fn set_status_sink(&mut self, sink: StatusSink) {
        self.runner.set_status_sink(sink);
    }

    // ---- data access ----

    /// Read-only view of the current track tables.
    pub fn store(&self) -> RwLockReadGuard<'_, TrackStore> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Reload metadata from the parser and rebuild decoders, trackers and
    /// cache. Called after a successful parse; also usable directly when
    /// the parser was driven outside the task runner.
    pub fn update_data(&mut self) {
        let tracks = self
            .parser
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .tracks_info();
        self.store
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .load(&tracks);
        self.recreate_decoders();
    }

    /// Tear down and re-create every decoder handle, for instance after a
    /// hardware-acceleration change. Trackers and cache become stale with
    /// the old decoders and are invalidated too.
    pub fn recreate_decoders(&mut self) {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        self.pool
            .rebuild(&store, self.factory.as_ref(), self.config.hardware_accel);
        self.trackers = store
            .tracks()
            .iter()
            .map(|_| TrackDecodeState::default())
            .collect();
        drop(store);
        self.cache.clear();
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn set_hardware_accel(&mut self, hw: crate::decode::HardwareAccel) {
        self.config.hardware_accel = hw;
        self.recreate_decoders();
    }

    /// Apply a pending decoder rebuild after the worker finished a parse.
    fn sync_after_parse(&mut self) {
        if self.runner.take_needs_decoder_rebuild() {
            self.recreate_decoders();
        }
    }

    // ---- seek/decode orchestration ----

    /// What servicing `sample_idx` (decode order) on `track` would take,
    /// given the current tracker and cache state.
    pub fn seek_decision(&self, track: usize, sample_idx: usize) -> InspectResult<SeekDecision> {
        let store = self.store();
        let info = store
            .track(track)
            .ok_or_else(|| InspectError::invalid_index(format!("track {} out of range", track)))?;
        let target = info.samples.get(sample_idx).ok_or_else(|| {
            InspectError::invalid_index(format!("sample {} out of range", sample_idx))
        })?;
        if self.cache.lookup(target.pts_ms).is_some() {
            return Ok(SeekDecision::InCache);
        }
        let tracker = self.trackers.get(track).copied().unwrap_or_default();
        if seek_needed(info, &tracker, sample_idx) {
            Ok(SeekDecision::SeekTo(
                store.preceding_key_frame(track, sample_idx),
            ))
        } else {
            Ok(SeekDecision::Continue)
        }
    }

    /// Decode the frame at `presentation_index` (play position) of `track`
    /// and return it in one of `accepted` formats (empty set accepts any).
    pub fn decode_frame_at(
        &mut self,
        track: usize,
        presentation_index: usize,
        accepted: &[PixelFormat],
    ) -> InspectResult<VideoFrame> {
        self.sync_after_parse();

        // Resolve the play position to a decode-order sample index
        let (info, sample_idx) = {
            let store = self.store();
            let sample_idx = store.sample_index_at(track, presentation_index).ok_or_else(|| {
                InspectError::invalid_index(format!(
                    "presentation index {} out of range for track {}",
                    presentation_index, track
                ))
            })?;
            let info = store
                .track(track)
                .ok_or_else(|| {
                    InspectError::invalid_index(format!("track {} out of range", track))
                })?
                .clone();
            (info, sample_idx)
        };
        let target_pts = info.samples[sample_idx].pts_ms;

        if !self.pool.has_decoder(track) {
            return Err(NoDecoderError::new(track).into());
        }

        // Cache probe: a hit never touches the live decoder
        if let Some(entry) = self.cache.lookup(target_pts) {
            debug!("cache hit for track {} pts {}ms", track, target_pts);
            let mut frame = self.cache.decode_entry(entry)?;
            frame.pts_ms = target_pts;
            return ensure_format(frame, accepted);
        }

        // Seek decision
        let tracker = self.trackers[track];
        if seek_needed(&info, &tracker, sample_idx) {
            let key_idx = {
                let store = self.store();
                store.preceding_key_frame(track, sample_idx)
            };
            debug!(
                "hard seek on track {}: target sample {}, restarting at key frame {}",
                track, sample_idx, key_idx
            );
            let decoder = self
                .pool
                .decoder_mut(track)
                .ok_or_else(|| NoDecoderError::new(track))?;
            decoder.flush()?;
            self.cache.clear();
            self.trackers[track].reset();
            self.trackers[track].last_extracted = key_idx as i64 - 1;
        }

        // Forward decode loop until the target frame has been emitted
        let decoder = self
            .pool
            .decoder_mut(track)
            .ok_or_else(|| NoDecoderError::new(track))?;
        let trackers = &mut self.trackers;
        let cache = &mut self.cache;
        let parser = &self.parser;
        let mut eos_sent = false;

        while trackers[track].last_decoded < sample_idx as i64 {
            let next = (trackers[track].last_extracted + 1) as usize;
            if next < info.samples.len() {
                let sample = parser
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .read_video_sample(track, next)?;
                decoder.send_packet(&Packet {
                    data: sample.data,
                    pts_ms: sample.pts_ms,
                    dts_ms: sample.dts_ms,
                    is_key_frame: sample.is_key_frame,
                })?;
                trackers[track].last_extracted = next as i64;
            } else if !eos_sent {
                decoder.send_eos()?;
                eos_sent = true;
            }

            loop {
                match decoder.receive_frame()? {
                    ReceiveResult::Frame(frame) => {
                        // Resolve the output back to a sample by timestamp
                        if let Some(idx) =
                            info.samples.iter().position(|s| s.pts_ms == frame.pts_ms)
                        {
                            trackers[track].last_decoded = idx as i64;
                        }
                        cache.insert(&frame)?;
                        if trackers[track].last_decoded >= sample_idx as i64 {
                            break;
                        }
                    }
                    ReceiveResult::NeedsMoreInput => break,
                    ReceiveResult::EndOfStream => {
                        return Err(InspectError::decode(format!(
                            "stream ended before sample {} was decoded",
                            sample_idx
                        )));
                    }
                }
            }
        }

        let entry = self.cache.lookup(target_pts).ok_or_else(|| {
            InspectError::decode(format!(
                "decoder never produced the frame at {}ms",
                target_pts
            ))
        })?;
        let mut frame = self.cache.decode_entry(entry)?;
        frame.pts_ms = target_pts;
        ensure_format(frame, accepted)
    }

    /// Decode (or fetch from cache) the frame at `presentation_index` and
    /// write its cached JPEG bytes to
    /// `<save_frame_path>/track<t>_frame<i>.jpg`. The write is not atomic.
    pub fn save_frame_to_file(
        &mut self,
        track: usize,
        presentation_index: usize,
    ) -> InspectResult<PathBuf> {
        self.decode_frame_at(track, presentation_index, &[])?;

        let target_pts = {
            let store = self.store();
            let sample_idx = store
                .sample_index_at(track, presentation_index)
                .ok_or_else(|| InspectError::invalid_index("presentation index out of range"))?;
            store
                .track(track)
                .and_then(|t| t.samples.get(sample_idx))
                .map(|s| s.pts_ms)
                .ok_or_else(|| InspectError::invalid_index("sample index out of range"))?
        };
        let entry = self
            .cache
            .lookup(target_pts)
            .ok_or_else(|| InspectError::decode("frame missing from cache after decode"))?;

        std::fs::create_dir_all(&self.config.save_frame_path)?;
        let path = self
            .config
            .save_frame_path
            .join(format!("track{}_frame{}.jpg", track, presentation_index));
        std::fs::write(&path, &entry.jpeg)?;
        info!("saved frame to {}", path.display());
        Ok(path)
    }

    /// Number of cached frames, exposed for cache-behavior assertions.
    pub fn cached_frame_count(&self) -> usize {
        self.cache.len()
    }

    pub fn tracker(&self, track: usize) -> Option<TrackDecodeState> {
        self.trackers.get(track).copied()
    }
}

/// The seek-necessity rule: reseek when nothing was decoded yet, when the
/// request is non-monotonic in presentation time, or when the span from the
/// last decoded sample to the target crosses a key frame the tracker has
/// not traversed. The key-frame scan is deliberately conservative; an
/// unnecessary reseek is cheaper than decoding against the wrong reference.
fn seek_needed(info: &TrackInfo, tracker: &TrackDecodeState, sample_idx: usize) -> bool {
    let last = tracker.last_decoded;
    if last < 0 {
        return true;
    }
    let last = last as usize;
    if info.samples[last].pts_ms >= info.samples[sample_idx].pts_ms {
        return true;
    }
    if sample_idx > last {
        return info.samples[last + 1..=sample_idx]
            .iter()
            .any(|s| s.is_key_frame);
    }
    false
}
