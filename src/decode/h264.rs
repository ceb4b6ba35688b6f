use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use log::warn;
use openh264::decoder::Decoder;
use openh264::formats::YUVSource;

use super::decoder::{Packet, ReceiveResult, VideoDecoder};
use super::frame::VideoFrame;
use crate::avc::{get_parameter_sets, nalu_to_annexb, sample_to_annexb};
use crate::errors::{InspectError, InspectResult};
use crate::mp4::AvccConfig;

/// H.264 decode backend over OpenH264. Samples arrive length-prefixed and
/// are rebuilt as Annex B; SPS/PPS from the avcC record seed the decoder
/// once at creation and again after every flush.
///
/// OpenH264 emits frames in decode order without timestamps. Output pts is
/// assigned smallest-pending-first, which matches presentation order for
/// conformant streams where reordering depth equals the decoder's buffering.
pub struct H264Decoder {
    inner: Decoder,
    sps: Vec<Vec<u8>>,
    pps: Vec<Vec<u8>>,
    nal_length_size: usize,
    pending_pts: BinaryHeap<Reverse<i64>>,
    ready: VecDeque<VideoFrame>,
    eos: bool,
}

impl H264Decoder {
    /// `avcc` is the raw AVCDecoderConfigurationRecord from the sample
    /// entry. Without one the decoder captures parameter sets in-band from
    /// the first sample that carries them.
    pub fn new(avcc: Option<&[u8]>) -> InspectResult<Self> {
        let (sps, pps, nal_length_size) = match avcc {
            Some(data) => {
                let config = AvccConfig::parse(data)?;
                (config.sps.clone(), config.pps.clone(), config.nal_length_size())
            }
            None => (Vec::new(), Vec::new(), 4),
        };

        let mut inner = Decoder::new()
            .map_err(|e| InspectError::decode(format!("failed to create H.264 decoder: {}", e)))?;
        seed_parameter_sets(&mut inner, &sps, &pps)?;

        Ok(Self {
            inner,
            sps,
            pps,
            nal_length_size,
            pending_pts: BinaryHeap::new(),
            ready: VecDeque::new(),
            eos: false,
        })
    }

    fn collect_output(&mut self, data: &[u8]) -> InspectResult<()> {
        match self.inner.decode(data) {
            Ok(Some(yuv)) => {
                let (width, height) = yuv.dimensions();
                let mut rgb = vec![0u8; yuv.rgb8_len()];
                yuv.write_rgb8(&mut rgb);
                let pts_ms = self
                    .pending_pts
                    .pop()
                    .map(|Reverse(pts)| pts)
                    .unwrap_or_default();
                self.ready
                    .push_back(VideoFrame::rgb24(rgb, width as u32, height as u32, pts_ms));
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(InspectError::decode(format!(
                "H.264 decoding failed: {}",
                e
            ))),
        }
    }
}

impl VideoDecoder for H264Decoder {
    fn send_packet(&mut self, packet: &Packet) -> InspectResult<()> {
        // No avcC at creation: pick up SPS/PPS carried in-band ahead of the
        // first slice and keep them for reseeding after a flush
        if self.sps.is_empty() && self.pps.is_empty() {
            let (sps, pps) = get_parameter_sets(&packet.data, self.nal_length_size);
            if !sps.is_empty() || !pps.is_empty() {
                seed_parameter_sets(&mut self.inner, &sps, &pps)?;
                self.sps = sps;
                self.pps = pps;
            }
        }
        let annexb = sample_to_annexb(&packet.data, self.nal_length_size)
            .ok_or_else(|| InspectError::decode("sample carries no video NAL units"))?;
        self.pending_pts.push(Reverse(packet.pts_ms));
        self.collect_output(&annexb)
    }

    fn send_eos(&mut self) -> InspectResult<()> {
        self.eos = true;
        Ok(())
    }

    fn receive_frame(&mut self) -> InspectResult<ReceiveResult> {
        if let Some(frame) = self.ready.pop_front() {
            return Ok(ReceiveResult::Frame(frame));
        }
        if self.eos {
            Ok(ReceiveResult::EndOfStream)
        } else {
            Ok(ReceiveResult::NeedsMoreInput)
        }
    }

    fn flush(&mut self) -> InspectResult<()> {
        // OpenH264 has no reset call; a fresh instance is the flush
        self.inner = Decoder::new()
            .map_err(|e| InspectError::decode(format!("failed to recreate H.264 decoder: {}", e)))?;
        seed_parameter_sets(&mut self.inner, &self.sps, &self.pps)?;
        self.pending_pts.clear();
        self.ready.clear();
        self.eos = false;
        Ok(())
    }
}

fn seed_parameter_sets(
    decoder: &mut Decoder,
    sps: &[Vec<u8>],
    pps: &[Vec<u8>],
) -> InspectResult<()> {
    for set in sps.iter().chain(pps.iter()) {
        if let Err(e) = decoder.decode(&nalu_to_annexb(set)) {
            warn!("parameter set rejected by decoder: {}", e);
        }
    }
    Ok(())
}
