use std::collections::VecDeque;

use super::decoder::{Packet, ReceiveResult, VideoDecoder};
use super::frame::VideoFrame;
use crate::errors::{InspectError, InspectResult};

/// Motion JPEG decode backend. Every sample is an independent JPEG image,
/// so there is no inter-frame state: each packet yields exactly one frame
/// and flush only drops queued output.
#[derive(Default)]
pub struct MjpegDecoder {
    ready: VecDeque<VideoFrame>,
    eos: bool,
}

impl MjpegDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoDecoder for MjpegDecoder {
    fn send_packet(&mut self, packet: &Packet) -> InspectResult<()> {
        let image = image::load_from_memory(&packet.data)
            .map_err(|e| InspectError::decode(format!("JPEG decoding failed: {}", e)))?
            .to_rgb8();
        let (width, height) = image.dimensions();
        self.ready.push_back(VideoFrame::rgb24(
            image.into_raw(),
            width,
            height,
            packet.pts_ms,
        ));
        Ok(())
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
        self.ready.clear();
        self.eos = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::frame::PixelFormat;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut out)
            .encode_image(&image)
            .unwrap();
        out
    }

    #[test]
    fn test_decode_one_sample() {
        let mut decoder = MjpegDecoder::new();
        let packet = Packet {
            data: jpeg_bytes(16, 8),
            pts_ms: 120,
            dts_ms: 120,
            is_key_frame: true,
        };
        decoder.send_packet(&packet).unwrap();
        match decoder.receive_frame().unwrap() {
            ReceiveResult::Frame(frame) => {
                assert_eq!((frame.width, frame.height), (16, 8));
                assert_eq!(frame.pts_ms, 120);
                assert_eq!(frame.format, PixelFormat::Rgb24);
            }
            other => panic!("expected a frame, got {:?}", other),
        }
        assert!(matches!(
            decoder.receive_frame().unwrap(),
            ReceiveResult::NeedsMoreInput
        ));
        decoder.send_eos().unwrap();
        assert!(matches!(
            decoder.receive_frame().unwrap(),
            ReceiveResult::EndOfStream
        ));
    }

    #[test]
    fn test_invalid_jpeg_is_rejected() {
        let mut decoder = MjpegDecoder::new();
        let packet = Packet {
            data: vec![0u8; 32],
            pts_ms: 0,
            dts_ms: 0,
            is_key_frame: true,
        };
        assert!(decoder.send_packet(&packet).is_err());
    }
}
