//! Seam between the inspector and the container parser. The bundled
//! implementation is [`crate::mp4::Mp4FileParser`]; tests substitute
//! scripted parsers.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::avc::{FrameType, NaluType};
use crate::errors::InspectResult;
use crate::tracks::TrackInfo;

/// Raw compressed sample bytes with timing.
#[derive(Debug, Clone)]
pub struct RawSample {
    pub data: Vec<u8>,
    pub pts_ms: i64,
    pub dts_ms: i64,
}

/// A video sample as fed to the decoder.
#[derive(Debug, Clone)]
pub struct VideoSample {
    pub data: Vec<u8>,
    pub pts_ms: i64,
    pub dts_ms: i64,
    pub is_key_frame: bool,
}

/// Container parser collaborator. One parser instance serves one file at a
/// time; `parse` replaces any previously parsed state.
pub trait ContainerParser: Send {
    /// Full parse of the file at `path`. Human-readable diagnostics queue up
    /// and are drained through `next_error_message` regardless of outcome.
    fn parse(&mut self, path: &Path) -> InspectResult<()>;

    /// Snapshot of the parsed track descriptors.
    fn tracks_info(&self) -> Vec<TrackInfo>;

    /// Raw sample bytes read from the file at the sample's offset.
    fn read_sample(&mut self, track: usize, index: usize) -> InspectResult<RawSample>;

    /// Like `read_sample` but only valid for video tracks and carrying the
    /// key-frame flag.
    fn read_video_sample(&mut self, track: usize, index: usize) -> InspectResult<VideoSample>;

    /// Lazy classification of one video sample: picture type plus the NAL
    /// unit types found in it.
    fn parse_video_nalu_type(
        &mut self,
        track: usize,
        index: usize,
    ) -> InspectResult<(FrameType, Vec<NaluType>)>;

    /// Drain the next queued diagnostic message, oldest first.
    fn next_error_message(&mut self) -> Option<String>;

    /// Shared handle to the parser's progress metric.
    fn progress_handle(&self) -> ParseProgress;
}

/// Parse progress as a fraction in [0, 1], shared between the parser and
/// callers polling from other threads. The fraction is stored as f32 bits in
/// an atomic so readers never see a torn value.
#[derive(Debug, Clone, Default)]
pub struct ParseProgress {
    bits: Arc<AtomicU32>,
}

impl ParseProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, fraction: f32) {
        self.bits
            .store(fraction.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_shared_between_clones() {
        let progress = ParseProgress::new();
        let handle = progress.clone();
        progress.set(0.25);
        assert_eq!(handle.get(), 0.25);
        handle.set(2.0);
        assert_eq!(progress.get(), 1.0);
    }
}
