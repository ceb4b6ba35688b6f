use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;

use log::{error, info, warn};

use crate::avc::FrameType;
use crate::container::{ContainerParser, ParseProgress};
use crate::decode::CodecId;
use crate::tracks::TrackStore;

/// Long-running operations the runner can execute.
#[derive(Debug, Clone)]
pub enum ParseOperation {
    /// Full container parse of the given file
    ParseFile(PathBuf),
    /// Per-sample I/P/B classification of every classifiable video track
    ParseFrameType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Parsing,
    FrameTypeClassifying,
    Failed,
}

/// Cooperative cancellation token, checked at sample granularity by the
/// classification pass. In-flight single-sample work is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

pub type FrameParsedCallback = Arc<dyn Fn(usize, usize, FrameType) + Send + Sync>;
pub type StatusSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Runs one background operation at a time on a worker thread, publishing
/// state, progress counters and completion flags through shared atomics.
pub struct TaskRunner {
    parser: Arc<Mutex<Box<dyn ContainerParser>>>,
    store: Arc<RwLock<TrackStore>>,
    state: Arc<Mutex<TaskState>>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
    parse_progress: ParseProgress,
    processed_frames: Arc<AtomicUsize>,
    total_frames: Arc<AtomicUsize>,
    data_available: Arc<AtomicBool>,
    /// Set after a successful parse; the owner consumes it to rebuild
    /// decoders on its own thread
    needs_decoder_rebuild: Arc<AtomicBool>,
    on_frame_parsed: Option<FrameParsedCallback>,
    status_sink: Option<StatusSink>,
}

impl TaskRunner {
    pub fn new(
        parser: Arc<Mutex<Box<dyn ContainerParser>>>,
        store: Arc<RwLock<TrackStore>>,
    ) -> Self {
        let parse_progress = lock(&parser).progress_handle();
        Self {
            parser,
            store,
            state: Arc::new(Mutex::new(TaskState::Idle)),
            cancel: CancelToken::new(),
            handle: None,
            parse_progress,
            processed_frames: Arc::new(AtomicUsize::new(0)),
            total_frames: Arc::new(AtomicUsize::new(0)),
            data_available: Arc::new(AtomicBool::new(false)),
            needs_decoder_rebuild: Arc::new(AtomicBool::new(false)),
            on_frame_parsed: None,
            status_sink: None,
        }
    }

    /// Register the per-frame classification callback. Must be set before
    /// the operation starts.
    pub fn set_on_frame_parsed(&mut self, callback: FrameParsedCallback) {
        self.on_frame_parsed = Some(callback);
    }

    /// Register the sink user-visible failure text goes through.
    pub fn set_status_sink(&mut self, sink: StatusSink) {
        self.status_sink = Some(sink);
    }

    /// Spawn `operation` on the worker. Returns false without side effects
    /// when a task is already running.
    pub fn start_parse(&mut self, operation: ParseOperation) -> bool {
        if self.is_running() {
            warn!("task runner busy, {:?} not started", operation);
            return false;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.cancel.reset();

        let parser = Arc::clone(&self.parser);
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let processed = Arc::clone(&self.processed_frames);
        let total = Arc::clone(&self.total_frames);
        let data_available = Arc::clone(&self.data_available);
        let needs_rebuild = Arc::clone(&self.needs_decoder_rebuild);
        let on_frame_parsed = self.on_frame_parsed.clone();
        let status_sink = self.status_sink.clone();

        *lock(&self.state) = match operation {
            ParseOperation::ParseFile(_) => TaskState::Parsing,
            ParseOperation::ParseFrameType => TaskState::FrameTypeClassifying,
        };

        self.handle = Some(std::thread::spawn(move || match operation {
            ParseOperation::ParseFile(path) => run_parse_file(
                &path,
                &parser,
                &store,
                &state,
                &processed,
                &total,
                &data_available,
                &needs_rebuild,
                status_sink.as_ref(),
            ),
            ParseOperation::ParseFrameType => run_classification(
                &parser,
                &store,
                &state,
                &cancel,
                &processed,
                on_frame_parsed.as_ref(),
            ),
        }));
        true
    }

    /// Request cooperative cancellation of the running operation.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Shared handle to the cancellation token, usable from callbacks.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(
            *lock(&self.state),
            TaskState::Parsing | TaskState::FrameTypeClassifying
        )
    }

    pub fn state(&self) -> TaskState {
        *lock(&self.state)
    }

    /// Block until the current operation finishes.
    pub fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn parse_progress(&self) -> f32 {
        self.parse_progress.get()
    }

    /// Classification progress as processed / total decodable frames.
    pub fn classification_progress(&self) -> f32 {
        let total = self.total_frames.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.processed_frames.load(Ordering::Relaxed) as f32 / total as f32
    }

    pub fn total_video_frames(&self) -> usize {
        self.total_frames.load(Ordering::Relaxed)
    }

    pub fn is_data_available(&self) -> bool {
        self.data_available.load(Ordering::Relaxed)
    }

    /// True once after each successful parse; the caller rebuilds the
    /// decoder pool in response.
    pub fn take_needs_decoder_rebuild(&self) -> bool {
        self.needs_decoder_rebuild.swap(false, Ordering::Relaxed)
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_parse_file(
    path: &std::path::Path,
    parser: &Arc<Mutex<Box<dyn ContainerParser>>>,
    store: &Arc<RwLock<TrackStore>>,
    state: &Arc<Mutex<TaskState>>,
    processed: &Arc<AtomicUsize>,
    total: &Arc<AtomicUsize>,
    data_available: &Arc<AtomicBool>,
    needs_rebuild: &Arc<AtomicBool>,
    status_sink: Option<&StatusSink>,
) {
    let result = lock(parser).parse(path);
    match result {
        Ok(()) => {
            let tracks = lock(parser).tracks_info();
            write_lock(store).load(&tracks);

            // Frame counting only covers codecs the classification pass
            // understands
            let classifiable: usize = tracks
                .iter()
                .filter(|t| {
                    t.kind
                        .codec_fourcc()
                        .and_then(CodecId::from_fourcc)
                        .map(|c| t.is_video() && c.supports_classification())
                        .unwrap_or(false)
                })
                .map(|t| t.sample_count())
                .sum();
            total.store(classifiable, Ordering::Relaxed);
            processed.store(0, Ordering::Relaxed);
            data_available.store(true, Ordering::Relaxed);
            needs_rebuild.store(true, Ordering::Relaxed);
            info!(
                "parse of {} finished, {} classifiable frames",
                path.display(),
                classifiable
            );
            *lock(state) = TaskState::Idle;
        }
        Err(e) => {
            let text = format!("parse of {} failed: {}", path.display(), e);
            error!("{}", text);
            if let Some(sink) = status_sink {
                sink(&text);
            }
            while let Some(message) = lock(parser).next_error_message() {
                error!("{}", message);
                if let Some(sink) = status_sink {
                    sink(&message);
                }
            }
            data_available.store(false, Ordering::Relaxed);
            *lock(state) = TaskState::Failed;
        }
    }
}

fn run_classification(
    parser: &Arc<Mutex<Box<dyn ContainerParser>>>,
    store: &Arc<RwLock<TrackStore>>,
    state: &Arc<Mutex<TaskState>>,
    cancel: &CancelToken,
    processed: &Arc<AtomicUsize>,
    on_frame_parsed: Option<&FrameParsedCallback>,
) {
    // Plan from a read snapshot so the store write lock is only held per
    // sample, never across the parser call
    let plan: Vec<(usize, usize)> = {
        let store = read_lock(store);
        store
            .video_track_indices()
            .iter()
            .filter_map(|&t| {
                let track = store.track(t)?;
                let classifiable = track
                    .kind
                    .codec_fourcc()
                    .and_then(CodecId::from_fourcc)
                    .map(|c| c.supports_classification())
                    .unwrap_or(false);
                classifiable.then_some((t, track.sample_count()))
            })
            .collect()
    };

    processed.store(0, Ordering::Relaxed);
    'tracks: for (track, sample_count) in plan {
        for sample in 0..sample_count {
            if cancel.is_cancelled() {
                info!("classification cancelled at track {} sample {}", track, sample);
                break 'tracks;
            }
            match lock(parser).parse_video_nalu_type(track, sample) {
                Ok((frame_type, nalu_types)) => {
                    write_lock(store).set_frame_type(track, sample, frame_type, nalu_types);
                    if let Some(callback) = on_frame_parsed {
                        callback(track, sample, frame_type);
                    }
                }
                Err(e) => {
                    warn!(
                        "classification of track {} sample {} failed: {}",
                        track, sample, e
                    );
                }
            }
            processed.fetch_add(1, Ordering::Relaxed);
        }
    }
    *lock(state) = TaskState::Idle;
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn read_lock<T: ?Sized>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T: ?Sized>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
