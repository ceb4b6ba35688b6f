//! Scripted collaborator fakes driving the orchestrator without real media.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use mp4inspect::avc::{FrameType, NaluType};
use mp4inspect::container::{ContainerParser, ParseProgress, RawSample, VideoSample};
use mp4inspect::decode::{
    CodecId, DecoderFactory, HardwareAccel, Packet, ReceiveResult, VideoDecoder, VideoFrame,
};
use mp4inspect::errors::{InspectError, InspectResult};
use mp4inspect::tracks::{MediaKind, SampleInfo, TrackInfo};

/// Video track with the given timestamps and key-frame set.
pub fn video_track(fourcc: &str, pts: &[i64], keys: &[usize]) -> TrackInfo {
    TrackInfo {
        track_id: 1,
        kind: MediaKind::Video {
            codec_fourcc: fourcc.to_string(),
            width: 320,
            height: 240,
            avcc: None,
            nal_length_size: 4,
        },
        timescale: 1000,
        duration_ms: pts.last().copied().unwrap_or(0) as u64,
        samples: pts
            .iter()
            .enumerate()
            .map(|(i, &pts_ms)| SampleInfo {
                index: i,
                offset: i as u64 * 100,
                size: 100,
                pts_ms,
                dts_ms: i as i64 * 40,
                dts_delta_ms: if i == 0 { 0 } else { 40 },
                is_key_frame: keys.contains(&i),
                frame_type: FrameType::Unknown,
                nalu_types: Vec::new(),
            })
            .collect(),
        chunks: Vec::new(),
    }
}

/// The synthetic single-track file used by most scenarios: 10 samples at
/// 40ms spacing, key frames at 0 and 5.
pub fn ten_sample_track(fourcc: &str) -> TrackInfo {
    let pts: Vec<i64> = (0..10).map(|i| i * 40).collect();
    video_track(fourcc, &pts, &[0, 5])
}

/// Parser fake serving in-memory track tables and synthetic sample bytes.
pub struct ScriptedParser {
    tracks: Vec<TrackInfo>,
    fail_with: Option<Vec<String>>,
    progress: ParseProgress,
}

impl ScriptedParser {
    pub fn new(tracks: Vec<TrackInfo>) -> Self {
        Self {
            tracks,
            fail_with: None,
            progress: ParseProgress::new(),
        }
    }

    /// Parser whose parse call fails and leaves the given diagnostics queued.
    pub fn failing(messages: Vec<String>) -> Self {
        Self {
            tracks: Vec::new(),
            fail_with: Some(messages),
            progress: ParseProgress::new(),
        }
    }
}

impl ContainerParser for ScriptedParser {
    fn parse(&mut self, _path: &Path) -> InspectResult<()> {
        if self.fail_with.is_some() {
            return Err(InspectError::parse("scripted parse failure"));
        }
        self.progress.set(1.0);
        Ok(())
    }

    fn tracks_info(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }

    fn read_sample(&mut self, track: usize, index: usize) -> InspectResult<RawSample> {
        let sample = self
            .tracks
            .get(track)
            .and_then(|t| t.samples.get(index))
            .ok_or_else(|| InspectError::invalid_index("scripted sample out of range"))?;
        Ok(RawSample {
            data: vec![index as u8],
            pts_ms: sample.pts_ms,
            dts_ms: sample.dts_ms,
        })
    }

    fn read_video_sample(&mut self, track: usize, index: usize) -> InspectResult<VideoSample> {
        let raw = self.read_sample(track, index)?;
        let is_key_frame = self.tracks[track].samples[index].is_key_frame;
        Ok(VideoSample {
            data: raw.data,
            pts_ms: raw.pts_ms,
            dts_ms: raw.dts_ms,
            is_key_frame,
        })
    }

    fn parse_video_nalu_type(
        &mut self,
        track: usize,
        index: usize,
    ) -> InspectResult<(FrameType, Vec<NaluType>)> {
        let sample = self
            .tracks
            .get(track)
            .and_then(|t| t.samples.get(index))
            .ok_or_else(|| InspectError::invalid_index("scripted sample out of range"))?;
        if sample.is_key_frame {
            Ok((FrameType::I, vec![NaluType::IDR]))
        } else {
            Ok((FrameType::P, vec![NaluType::NonIDR]))
        }
    }

    fn next_error_message(&mut self) -> Option<String> {
        match &mut self.fail_with {
            Some(messages) if !messages.is_empty() => Some(messages.remove(0)),
            _ => None,
        }
    }

    fn progress_handle(&self) -> ParseProgress {
        self.progress.clone()
    }
}

/// Decoder fake that turns every packet into a 1x1 RGB frame stamped with
/// the packet's pts, recording which pts values were fed.
pub struct ScriptedDecoder {
    fed: Arc<Mutex<Vec<i64>>>,
    ready: Vec<VideoFrame>,
    eos: bool,
}

impl VideoDecoder for ScriptedDecoder {
    fn send_packet(&mut self, packet: &Packet) -> InspectResult<()> {
        self.fed.lock().unwrap().push(packet.pts_ms);
        self.ready.push(VideoFrame::rgb24(
            vec![(packet.pts_ms / 40) as u8, 0, 0],
            1,
            1,
            packet.pts_ms,
        ));
        Ok(())
    }

    fn send_eos(&mut self) -> InspectResult<()> {
        self.eos = true;
        Ok(())
    }

    fn receive_frame(&mut self) -> InspectResult<ReceiveResult> {
        if self.ready.is_empty() {
            if self.eos {
                Ok(ReceiveResult::EndOfStream)
            } else {
                Ok(ReceiveResult::NeedsMoreInput)
            }
        } else {
            Ok(ReceiveResult::Frame(self.ready.remove(0)))
        }
    }

    fn flush(&mut self) -> InspectResult<()> {
        self.ready.clear();
        self.eos = false;
        Ok(())
    }
}

/// Factory handing out [`ScriptedDecoder`]s that share one feed log.
pub struct ScriptedFactory {
    pub fed: Arc<Mutex<Vec<i64>>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            fed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pts values fed to any decoder so far, as sample indices (pts / 40).
    pub fn fed_indices(&self) -> Vec<i64> {
        self.fed.lock().unwrap().iter().map(|p| p / 40).collect()
    }
}

impl DecoderFactory for ScriptedFactory {
    fn create(
        &self,
        _codec: CodecId,
        _track: &TrackInfo,
        _hw: HardwareAccel,
    ) -> InspectResult<Box<dyn VideoDecoder>> {
        Ok(Box::new(ScriptedDecoder {
            fed: Arc::clone(&self.fed),
            ready: Vec::new(),
            eos: false,
        }))
    }
}
