use std::collections::VecDeque;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info, warn};

use super::avcc::AvccConfig;
use super::ctts::{build_composition_offsets, parse_ctts};
use super::moov_finder::find_and_read_moov_box;
use super::r#box::{find_box, for_each_box};
use super::stco::parse_stco_or_co64;
use super::stsc::parse_stsc;
use super::stsd::parse_stsd;
use super::stss::parse_stss;
use super::stsz::parse_stsz;
use super::stts::{build_decode_timestamps, parse_stts};
use super::mdhd;
use crate::avc::{classify_sample, extract_nalus_from_sample, FrameType, NaluType};
use crate::container::{ContainerParser, ParseProgress, RawSample, VideoSample};
use crate::errors::{InspectError, InspectResult};
use crate::tracks::{ChunkInfo, MediaKind, SampleInfo, TrackInfo};

/// ISO-BMFF file parser. Builds full per-track sample and chunk tables from
/// the moov box and serves raw sample bytes from the open file afterwards.
///
/// Tracks that fail to parse are skipped with a queued diagnostic; the parse
/// as a whole only fails when the moov box itself is unusable.
pub struct Mp4FileParser {
    file: Option<File>,
    tracks: Vec<TrackInfo>,
    messages: VecDeque<String>,
    progress: ParseProgress,
}

impl Default for Mp4FileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Mp4FileParser {
    pub fn new() -> Self {
        Self {
            file: None,
            tracks: Vec::new(),
            messages: VecDeque::new(),
            progress: ParseProgress::new(),
        }
    }

    fn queue_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.messages.push_back(message);
    }

    fn track(&self, track: usize) -> InspectResult<&TrackInfo> {
        self.tracks
            .get(track)
            .ok_or_else(|| InspectError::invalid_index(format!("track {} out of range", track)))
    }

    fn sample(&self, track: usize, index: usize) -> InspectResult<&SampleInfo> {
        let t = self.track(track)?;
        t.samples.get(index).ok_or_else(|| {
            InspectError::invalid_index(format!(
                "sample {} out of range for track {} ({} samples)",
                index,
                track,
                t.samples.len()
            ))
        })
    }

    fn read_sample_bytes(&mut self, offset: u64, size: usize) -> InspectResult<Vec<u8>> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| InspectError::parse("no file parsed"))?;
        file.seek(SeekFrom::Start(offset))?;
        let mut data = vec![0u8; size];
        file.read_exact(&mut data)?;
        Ok(data)
    }
}

impl ContainerParser for Mp4FileParser {
    fn parse(&mut self, path: &Path) -> InspectResult<()> {
        self.tracks.clear();
        self.messages.clear();
        self.progress.set(0.0);

        let mut file = File::open(path).map_err(|e| {
            let err = InspectError::parse(format!("cannot open {}: {}", path.display(), e));
            self.messages.push_back(err.to_string());
            err
        })?;

        let moov = find_and_read_moov_box(&mut file).map_err(|e| {
            let err = InspectError::parse(format!("no usable moov box: {}", e));
            self.messages.push_back(err.to_string());
            err
        })?;

        let mut trak_count = 0usize;
        for_each_box(&moov, |name, _| {
            if name == "trak" {
                trak_count += 1;
            }
            true
        });

        let mut tracks = Vec::new();
        let mut failures = Vec::new();
        let mut seen = 0usize;
        for_each_box(&moov, |name, payload| {
            if name != "trak" {
                return true;
            }
            seen += 1;
            match parse_trak(payload) {
                Ok(track) => tracks.push(track),
                Err(e) => failures.push(format!("track {} skipped: {}", seen - 1, e)),
            }
            self.progress.set(seen as f32 / trak_count.max(1) as f32);
            true
        });
        for failure in failures {
            self.queue_message(failure);
        }

        if tracks.is_empty() {
            let err = InspectError::parse("no parsable tracks in moov box");
            self.messages.push_back(err.to_string());
            return Err(err);
        }

        info!(
            "parsed {} with {} tracks",
            path.display(),
            tracks.len()
        );
        self.tracks = tracks;
        self.file = Some(file);
        self.progress.set(1.0);
        Ok(())
    }

    fn tracks_info(&self) -> Vec<TrackInfo> {
        self.tracks.clone()
    }

    fn read_sample(&mut self, track: usize, index: usize) -> InspectResult<RawSample> {
        let s = self.sample(track, index)?;
        let (offset, size, pts_ms, dts_ms) = (s.offset, s.size as usize, s.pts_ms, s.dts_ms);
        let data = self.read_sample_bytes(offset, size)?;
        Ok(RawSample {
            data,
            pts_ms,
            dts_ms,
        })
    }

    fn read_video_sample(&mut self, track: usize, index: usize) -> InspectResult<VideoSample> {
        if !self.track(track)?.is_video() {
            return Err(InspectError::invalid_index(format!(
                "track {} is not a video track",
                track
            )));
        }
        let s = self.sample(track, index)?;
        let (offset, size, pts_ms, dts_ms, is_key_frame) =
            (s.offset, s.size as usize, s.pts_ms, s.dts_ms, s.is_key_frame);
        let data = self.read_sample_bytes(offset, size)?;
        Ok(VideoSample {
            data,
            pts_ms,
            dts_ms,
            is_key_frame,
        })
    }

    fn parse_video_nalu_type(
        &mut self,
        track: usize,
        index: usize,
    ) -> InspectResult<(FrameType, Vec<NaluType>)> {
        let nal_length_size = match &self.track(track)?.kind {
            MediaKind::Video {
                nal_length_size, ..
            } => *nal_length_size,
            _ => {
                return Err(InspectError::invalid_index(format!(
                    "track {} is not a video track",
                    track
                )))
            }
        };
        let sample = self.read_video_sample(track, index)?;
        let nalu_types = extract_nalus_from_sample(&sample.data, nal_length_size)
            .map(|nalus| nalus.iter().map(|n| n.nalu_type).collect())
            .unwrap_or_default();
        let frame_type = classify_sample(&sample.data, nal_length_size);
        Ok((frame_type, nalu_types))
    }

    fn next_error_message(&mut self) -> Option<String> {
        self.messages.pop_front()
    }

    fn progress_handle(&self) -> ParseProgress {
        self.progress.clone()
    }
}

/// Parse one trak box payload into a full track descriptor.
fn parse_trak(trak: &[u8]) -> InspectResult<TrackInfo> {
    let tkhd = find_box(trak, "tkhd")
        .ok_or_else(|| InspectError::parse("tkhd box not found in trak box"))?;
    let track_id = parse_tkhd_track_id(tkhd)?;

    let mdia = find_box(trak, "mdia")
        .ok_or_else(|| InspectError::parse("mdia box not found in trak box"))?;
    let handler = parse_hdlr_handler(mdia)?;
    let mdhd_payload = find_box(mdia, "mdhd")
        .ok_or_else(|| InspectError::parse("mdhd box not found in mdia box"))?;
    let (timescale, duration) = mdhd::parse_mdhd(mdhd_payload)?;
    if timescale == 0 {
        return Err(InspectError::parse("mdhd timescale is zero"));
    }
    let duration_ms = duration * 1000 / timescale as u64;

    let minf = find_box(mdia, "minf")
        .ok_or_else(|| InspectError::parse("minf box not found in mdia box"))?;
    let stbl = find_box(minf, "stbl")
        .ok_or_else(|| InspectError::parse("stbl box not found in minf box"))?;

    let stsd = parse_stsd(stbl, &handler)?;
    let sizes = parse_stsz(stbl)?;
    let stts_entries = parse_stts(stbl)?;
    let dts = build_decode_timestamps(&stts_entries);
    let ctts_entries = parse_ctts(stbl)?;
    let cts_offsets = build_composition_offsets(ctts_entries.as_deref());
    let stsc_entries = parse_stsc(stbl)?;
    let chunk_offsets = parse_stco_or_co64(stbl)?;
    let sync_samples = parse_stss(stbl);

    let sample_count = sizes.len();
    if dts.len() < sample_count {
        return Err(InspectError::parse(format!(
            "stts covers {} samples but stsz lists {}",
            dts.len(),
            sample_count
        )));
    }

    // Expand the chunk map into per-sample byte offsets
    let mut offsets = vec![0u64; sample_count];
    let mut chunks = Vec::with_capacity(chunk_offsets.len());
    let mut sample_idx = 0usize;
    let mut stsc_idx = 0usize;
    for (chunk_idx, &chunk_offset) in chunk_offsets.iter().enumerate() {
        let chunk_number = (chunk_idx + 1) as u32;
        while stsc_idx + 1 < stsc_entries.len()
            && stsc_entries[stsc_idx + 1].first_chunk <= chunk_number
        {
            stsc_idx += 1;
        }
        let samples_per_chunk = stsc_entries
            .get(stsc_idx)
            .map(|e| e.samples_per_chunk)
            .unwrap_or(0);

        chunks.push(ChunkInfo {
            index: chunk_idx,
            offset: chunk_offset,
            first_sample: sample_idx,
            sample_count: samples_per_chunk,
        });

        let mut offset_in_chunk = 0u64;
        for _ in 0..samples_per_chunk {
            if sample_idx >= sample_count {
                break;
            }
            offsets[sample_idx] = chunk_offset + offset_in_chunk;
            offset_in_chunk += sizes[sample_idx] as u64;
            sample_idx += 1;
        }
    }
    if sample_idx < sample_count {
        return Err(InspectError::parse(format!(
            "chunk map covers {} samples but stsz lists {}",
            sample_idx, sample_count
        )));
    }

    // stss lists 1-based sample numbers; an absent box means every sample
    // is a sync sample
    let is_key = |index: usize| match &sync_samples {
        Some(numbers) => numbers.contains(&((index + 1) as u32)),
        None => true,
    };

    let to_ms = |units: i64| units * 1000 / timescale as i64;
    let mut samples = Vec::with_capacity(sample_count);
    let mut prev_dts_ms = 0i64;
    for index in 0..sample_count {
        let dts_ms = to_ms(dts[index] as i64);
        let cts_offset = cts_offsets.get(index).copied().unwrap_or(0);
        let pts_ms = to_ms(dts[index] as i64 + cts_offset);
        samples.push(SampleInfo {
            index,
            offset: offsets[index],
            size: sizes[index],
            pts_ms,
            dts_ms,
            dts_delta_ms: if index == 0 { 0 } else { dts_ms - prev_dts_ms },
            is_key_frame: is_key(index),
            frame_type: FrameType::Unknown,
            nalu_types: Vec::new(),
        });
        prev_dts_ms = dts_ms;
    }

    let kind = match handler.as_str() {
        "vide" => {
            let (avcc, nal_length_size) = match &stsd.avcc {
                Some(data) => {
                    let config = AvccConfig::parse(data)?;
                    (Some(data.clone()), config.nal_length_size())
                }
                None => (None, 4),
            };
            MediaKind::Video {
                codec_fourcc: stsd.fourcc.clone(),
                width: stsd.width.unwrap_or(0),
                height: stsd.height.unwrap_or(0),
                avcc,
                nal_length_size,
            }
        }
        "soun" => MediaKind::Audio {
            codec_fourcc: stsd.fourcc.clone(),
            channels: stsd.channels.unwrap_or(0),
            sample_rate: stsd.sample_rate.unwrap_or(0),
        },
        other => MediaKind::Other {
            handler: other.to_string(),
        },
    };

    debug!(
        "track {}: {} handler, {} samples, {} chunks",
        track_id,
        handler,
        samples.len(),
        chunks.len()
    );

    Ok(TrackInfo {
        track_id,
        kind,
        timescale,
        duration_ms,
        samples,
        chunks,
    })
}

fn parse_tkhd_track_id(tkhd: &[u8]) -> InspectResult<u32> {
    if tkhd.is_empty() {
        return Err(InspectError::parse("tkhd box is empty"));
    }
    // Version 1 carries 64-bit creation/modification times before the id
    let id_pos = if tkhd[0] == 1 { 20 } else { 12 };
    if id_pos + 4 > tkhd.len() {
        return Err(InspectError::parse("tkhd box too small"));
    }
    Ok(u32::from_be_bytes([
        tkhd[id_pos],
        tkhd[id_pos + 1],
        tkhd[id_pos + 2],
        tkhd[id_pos + 3],
    ]))
}

fn parse_hdlr_handler(mdia: &[u8]) -> InspectResult<String> {
    let hdlr = find_box(mdia, "hdlr")
        .ok_or_else(|| InspectError::parse("hdlr box not found in mdia box"))?;
    if hdlr.len() < 12 {
        return Err(InspectError::parse("hdlr box too small"));
    }
    Ok(String::from_utf8_lossy(&hdlr[8..12]).into_owned())
}
