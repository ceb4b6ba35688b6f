pub mod cache;
pub mod convert;
pub mod decoder;
pub mod frame;
pub mod h264;
pub mod mjpeg;
pub mod pool;

pub use cache::{CachedFrame, FrameCache};
pub use convert::ensure_format;
pub use decoder::{CodecId, Packet, ReceiveResult, VideoDecoder};
pub use frame::{FrameLocation, PixelFormat, VideoFrame};
pub use h264::H264Decoder;
pub use mjpeg::MjpegDecoder;
pub use pool::{DecoderFactory, DecoderPool, DeviceType, HardwareAccel, SoftwareDecoderFactory};
