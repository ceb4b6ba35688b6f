use log::{debug, warn};

use super::types::TrackInfo;
use crate::avc::{FrameType, NaluType};

/// Holds the track descriptors copied from the container parser plus the
/// derived tables everything else reads: per-track max sample size, the list
/// of video track indices and the per-video-track presentation-order index.
///
/// Readers treat the store as immutable between `load` calls. The frame-type
/// classification pass is the only incremental mutator, through
/// `set_frame_type`.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: Vec<TrackInfo>,
    max_sample_sizes: Vec<u32>,
    video_track_indices: Vec<usize>,
    /// For each track, play position -> sample index (empty for non-video)
    presentation_order: Vec<Vec<usize>>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store contents with a fresh parser snapshot and rebuild
    /// every derived table. With no video tracks all derived tables end up
    /// empty and decode operations fail fast downstream.
    pub fn load(&mut self, tracks: &[TrackInfo]) {
        self.tracks = tracks.to_vec();
        self.max_sample_sizes = self
            .tracks
            .iter()
            .map(|t| t.samples.iter().map(|s| s.size).max().unwrap_or(0))
            .collect();
        self.video_track_indices = self
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_video())
            .map(|(i, _)| i)
            .collect();
        self.presentation_order = self
            .tracks
            .iter()
            .map(|t| {
                if t.is_video() {
                    build_presentation_order(t)
                } else {
                    Vec::new()
                }
            })
            .collect();

        if self.video_track_indices.is_empty() {
            warn!("no video tracks in parsed file");
        } else {
            debug!(
                "loaded {} tracks ({} video)",
                self.tracks.len(),
                self.video_track_indices.len()
            );
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.max_sample_sizes.clear();
        self.video_track_indices.clear();
        self.presentation_order.clear();
    }

    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&TrackInfo> {
        self.tracks.get(index)
    }

    pub fn video_track_indices(&self) -> &[usize] {
        &self.video_track_indices
    }

    pub fn max_sample_size(&self, track: usize) -> Option<u32> {
        self.max_sample_sizes.get(track).copied()
    }

    /// Resolve a play position to the underlying sample index.
    pub fn sample_index_at(&self, track: usize, presentation_index: usize) -> Option<usize> {
        self.presentation_order
            .get(track)?
            .get(presentation_index)
            .copied()
    }

    pub fn presentation_order(&self, track: usize) -> Option<&[usize]> {
        self.presentation_order.get(track).map(|v| v.as_slice())
    }

    /// Record the classification result for one sample.
    pub fn set_frame_type(
        &mut self,
        track: usize,
        sample: usize,
        frame_type: FrameType,
        nalu_types: Vec<NaluType>,
    ) -> bool {
        match self
            .tracks
            .get_mut(track)
            .and_then(|t| t.samples.get_mut(sample))
        {
            Some(s) => {
                s.frame_type = frame_type;
                s.nalu_types = nalu_types;
                true
            }
            None => false,
        }
    }

    /// Index of the nearest key frame at or before `sample_idx`, in decode
    /// order. Falls back to 0 when the track carries no key-frame marks.
    pub fn preceding_key_frame(&self, track: usize, sample_idx: usize) -> usize {
        let samples = match self.tracks.get(track) {
            Some(t) => &t.samples,
            None => return 0,
        };
        samples[..=sample_idx.min(samples.len().saturating_sub(1))]
            .iter()
            .rposition(|s| s.is_key_frame)
            .unwrap_or(0)
    }
}

/// Stable sort of sample indices by presentation timestamp. `sort_by_key` is
/// stable, so equal timestamps keep their original sample order.
fn build_presentation_order(track: &TrackInfo) -> Vec<usize> {
    let mut order: Vec<usize> = (0..track.samples.len()).collect();
    order.sort_by_key(|&i| track.samples[i].pts_ms);
    order
}
