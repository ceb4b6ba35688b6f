use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::decoder::{CodecId, VideoDecoder};
use super::h264::H264Decoder;
use super::mjpeg::MjpegDecoder;
use crate::errors::{InspectError, InspectResult};
use crate::tracks::{MediaKind, TrackInfo, TrackStore};

/// Hardware device types a decoder may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    D3d11va,
    Vaapi,
    VideoToolbox,
    Cuda,
}

/// Hardware-acceleration preference passed to decoder construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HardwareAccel {
    #[default]
    Off,
    /// Probe for any usable device
    Auto,
    Device(DeviceType),
}

/// Creates decoder handles for the pool. Injectable so tests can substitute
/// scripted decoders.
pub trait DecoderFactory: Send {
    fn create(
        &self,
        codec: CodecId,
        track: &TrackInfo,
        hw: HardwareAccel,
    ) -> InspectResult<Box<dyn VideoDecoder>>;
}

/// Factory over the bundled software backends. Hardware attachment is not
/// available for these backends; a non-Off preference logs the fallback and
/// continues in software, which is non-fatal per the pool contract.
pub struct SoftwareDecoderFactory;

impl DecoderFactory for SoftwareDecoderFactory {
    fn create(
        &self,
        codec: CodecId,
        track: &TrackInfo,
        hw: HardwareAccel,
    ) -> InspectResult<Box<dyn VideoDecoder>> {
        if hw != HardwareAccel::Off {
            warn!(
                "hardware acceleration {:?} unavailable for {}, using software decode",
                hw, codec
            );
        }
        match codec {
            CodecId::H264 => {
                let avcc = match &track.kind {
                    MediaKind::Video { avcc, .. } => avcc.as_deref(),
                    _ => None,
                };
                Ok(Box::new(H264Decoder::new(avcc)?))
            }
            CodecId::Mjpeg => Ok(Box::new(MjpegDecoder::new())),
            other => Err(InspectError::decode(format!(
                "no bundled decode backend for {}",
                other
            ))),
        }
    }
}

/// One decoder handle per decodable video track, indexed by track index.
/// Slots stay `None` for non-video tracks and for tracks whose codec has no
/// decoder. Rebuilding drops every handle; the orchestrator is responsible
/// for also invalidating trackers and the frame cache.
#[derive(Default)]
pub struct DecoderPool {
    slots: Vec<Option<Box<dyn VideoDecoder>>>,
}

impl DecoderPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, store: &TrackStore, factory: &dyn DecoderFactory, hw: HardwareAccel) {
        self.slots = store.tracks().iter().map(|_| None).collect();

        for &track_idx in store.video_track_indices() {
            let track = match store.track(track_idx) {
                Some(t) => t,
                None => continue,
            };
            let fourcc = track.kind.codec_fourcc().unwrap_or("");
            let codec = match CodecId::from_fourcc(fourcc) {
                Some(c) => c,
                None => {
                    warn!(
                        "track {}: unsupported codec '{}', excluded from decoding",
                        track_idx, fourcc
                    );
                    continue;
                }
            };
            match factory.create(codec, track, hw) {
                Ok(decoder) => {
                    info!("track {}: {} decoder ready", track_idx, codec);
                    self.slots[track_idx] = Some(decoder);
                }
                Err(e) => {
                    warn!(
                        "track {}: decoder creation failed, excluded from decoding: {}",
                        track_idx, e
                    );
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn has_decoder(&self, track: usize) -> bool {
        matches!(self.slots.get(track), Some(Some(_)))
    }

    pub fn decoder_mut(&mut self, track: usize) -> Option<&mut dyn VideoDecoder> {
        match self.slots.get_mut(track) {
            Some(Some(decoder)) => Some(decoder.as_mut()),
            _ => None,
        }
    }

    pub fn decodable_tracks(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| i)
            .collect()
    }
}
