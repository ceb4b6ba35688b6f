use log::debug;

use super::frame::{PixelFormat, VideoFrame};
use crate::errors::{InspectError, InspectResult};

const JPEG_QUALITY: u8 = 85;

/// One cached frame, held as a re-encoded JPEG to bound memory.
#[derive(Debug, Clone)]
pub struct CachedFrame {
    pub pts_ms: i64,
    pub jpeg: Vec<u8>,
    pub jpeg_size: usize,
    pub width: u32,
    pub height: u32,
}

/// Cache of frames decoded during the current forward-decode run, keyed by
/// presentation timestamp. Entries are only valid relative to the last flush
/// point, so a hard seek or a pool rebuild clears everything; there is no
/// other eviction.
#[derive(Debug, Default)]
pub struct FrameCache {
    entries: Vec<CachedFrame>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-encode an RGB frame to JPEG and append it.
    pub fn insert(&mut self, frame: &VideoFrame) -> InspectResult<()> {
        if frame.format != PixelFormat::Rgb24 {
            return Err(InspectError::conversion(
                "frame cache only accepts packed RGB frames",
            ));
        }
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode(&frame.data, frame.width, frame.height, image::ColorType::Rgb8)
            .map_err(|e| InspectError::conversion(format!("JPEG encoding failed: {}", e)))?;
        let jpeg_size = jpeg.len();
        debug!(
            "cached frame at {}ms ({}x{}, {} bytes)",
            frame.pts_ms, frame.width, frame.height, jpeg_size
        );
        self.entries.push(CachedFrame {
            pts_ms: frame.pts_ms,
            jpeg,
            jpeg_size,
            width: frame.width,
            height: frame.height,
        });
        Ok(())
    }

    pub fn lookup(&self, pts_ms: i64) -> Option<&CachedFrame> {
        self.entries.iter().find(|e| e.pts_ms == pts_ms)
    }

    /// Decode a cached entry back into an RGB frame.
    pub fn decode_entry(&self, entry: &CachedFrame) -> InspectResult<VideoFrame> {
        let image = image::load_from_memory(&entry.jpeg)
            .map_err(|e| InspectError::conversion(format!("cached JPEG unreadable: {}", e)))?
            .to_rgb8();
        let (width, height) = image.dimensions();
        Ok(VideoFrame::rgb24(
            image.into_raw(),
            width,
            height,
            entry.pts_ms,
        ))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_frame(pts_ms: i64) -> VideoFrame {
        VideoFrame::rgb24(vec![128u8; 16 * 8 * 3], 16, 8, pts_ms)
    }

    #[test]
    fn test_insert_lookup_roundtrip() {
        let mut cache = FrameCache::new();
        cache.insert(&rgb_frame(40)).unwrap();
        cache.insert(&rgb_frame(80)).unwrap();
        assert_eq!(cache.len(), 2);

        let entry = cache.lookup(80).unwrap();
        assert_eq!(entry.pts_ms, 80);
        assert_eq!((entry.width, entry.height), (16, 8));
        assert_eq!(entry.jpeg_size, entry.jpeg.len());
        assert!(cache.lookup(120).is_none());

        let frame = cache.decode_entry(entry).unwrap();
        assert_eq!((frame.width, frame.height), (16, 8));
        assert_eq!(frame.pts_ms, 80);
        assert_eq!(frame.format, PixelFormat::Rgb24);
    }

    #[test]
    fn test_clear() {
        let mut cache = FrameCache::new();
        cache.insert(&rgb_frame(0)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_rejects_non_rgb() {
        let mut cache = FrameCache::new();
        let mut frame = rgb_frame(0);
        frame.format = PixelFormat::Yuv420;
        assert!(cache.insert(&frame).is_err());
    }
}
