use super::frame::{FrameLocation, PixelFormat, VideoFrame};
use crate::errors::{InspectError, InspectResult};

/// Bring `frame` into one of `accepted` formats. An empty accepted set means
/// any format. Device-resident frames are transferred to host memory first;
/// format conversion then targets the first accepted format. Metadata
/// (timestamp, dimensions) survives every transform.
pub fn ensure_format(mut frame: VideoFrame, accepted: &[PixelFormat]) -> InspectResult<VideoFrame> {
    if frame.location == FrameLocation::Device {
        frame = transfer_to_host(frame)?;
    }

    if accepted.is_empty() || accepted.contains(&frame.format) {
        return Ok(frame);
    }

    let target = accepted[0];
    match (frame.format, target) {
        (PixelFormat::Rgb24, PixelFormat::Rgba) => {
            let mut data = Vec::with_capacity(frame.data.len() / 3 * 4);
            for px in frame.data.chunks_exact(3) {
                data.extend_from_slice(px);
                data.push(0xFF);
            }
            frame.data = data;
            frame.format = PixelFormat::Rgba;
            Ok(frame)
        }
        (PixelFormat::Rgba, PixelFormat::Rgb24) => {
            let mut data = Vec::with_capacity(frame.data.len() / 4 * 3);
            for px in frame.data.chunks_exact(4) {
                data.extend_from_slice(&px[..3]);
            }
            frame.data = data;
            frame.format = PixelFormat::Rgb24;
            Ok(frame)
        }
        (from, to) => Err(InspectError::conversion(format!(
            "no conversion from {:?} to {:?}",
            from, to
        ))),
    }
}

/// The bundled decoders only produce host frames, so a device frame can
/// only come from an external decoder; all we can do is flip the marker
/// once the bytes are host-visible.
fn transfer_to_host(mut frame: VideoFrame) -> InspectResult<VideoFrame> {
    if frame.data.is_empty() {
        return Err(InspectError::conversion(
            "device frame has no host-visible data",
        ));
    }
    frame.location = FrameLocation::Host;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(format: PixelFormat, data: Vec<u8>) -> VideoFrame {
        VideoFrame {
            data,
            width: 2,
            height: 1,
            format,
            location: FrameLocation::Host,
            pts_ms: 33,
        }
    }

    #[test]
    fn test_passthrough_when_accepted() {
        let f = frame(PixelFormat::Rgb24, vec![1, 2, 3, 4, 5, 6]);
        let out = ensure_format(f.clone(), &[]).unwrap();
        assert_eq!(out, f);
        // Already in an accepted format, even when it is not the first one
        let out = ensure_format(f.clone(), &[PixelFormat::Rgba, PixelFormat::Rgb24]).unwrap();
        assert_eq!(out, f);
        let out = ensure_format(f.clone(), &[PixelFormat::Rgb24]).unwrap();
        assert_eq!(out, f);
    }

    #[test]
    fn test_rgb_rgba_roundtrip() {
        let f = frame(PixelFormat::Rgb24, vec![1, 2, 3, 4, 5, 6]);
        let rgba = ensure_format(f, &[PixelFormat::Rgba]).unwrap();
        assert_eq!(rgba.data, vec![1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(rgba.pts_ms, 33);
        let rgb = ensure_format(rgba, &[PixelFormat::Rgb24]).unwrap();
        assert_eq!(rgb.data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unsupported_conversion() {
        let f = frame(PixelFormat::Yuv420, vec![0; 3]);
        assert!(ensure_format(f, &[PixelFormat::Rgba]).is_err());
    }

    #[test]
    fn test_device_frame_transferred() {
        let mut f = frame(PixelFormat::Rgb24, vec![1, 2, 3, 4, 5, 6]);
        f.location = FrameLocation::Device;
        let out = ensure_format(f, &[PixelFormat::Rgb24]).unwrap();
        assert_eq!(out.location, FrameLocation::Host);
    }
}
