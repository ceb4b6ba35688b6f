/// Pixel layout of a decoded frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0
    Yuv420,
    /// Packed RGB, 3 bytes per pixel
    Rgb24,
    /// Packed RGBA, 4 bytes per pixel
    Rgba,
}

/// Whether the frame buffer lives in host or device (GPU) memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameLocation {
    #[default]
    Host,
    Device,
}

/// One decoded video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub location: FrameLocation,
    /// Presentation timestamp in milliseconds
    pub pts_ms: i64,
}

impl VideoFrame {
    /// Host-memory RGB frame, the form every bundled decoder emits.
    pub fn rgb24(data: Vec<u8>, width: u32, height: u32, pts_ms: i64) -> Self {
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgb24,
            location: FrameLocation::Host,
            pts_ms,
        }
    }
}
