pub mod bits;
pub use bits::BitReader;

pub mod mp4;
pub use mp4::{AvccConfig, Mp4FileParser};

pub mod avc;
pub use avc::{FrameType, NaluType};

pub mod container;
pub use container::{ContainerParser, ParseProgress, RawSample, VideoSample};

pub mod tracks;
pub use tracks::{ChunkInfo, MediaKind, SampleInfo, TrackInfo, TrackStore};

pub mod decode;
pub use decode::{
    CodecId, DecoderFactory, DecoderPool, FrameCache, HardwareAccel, Packet, PixelFormat,
    ReceiveResult, VideoDecoder, VideoFrame,
};

pub mod config;
pub use config::InspectorConfig;

pub mod inspector;
pub use inspector::{Mp4Inspector, SeekDecision, TrackDecodeState};

pub mod tasks;
pub use tasks::{CancelToken, ParseOperation, TaskRunner, TaskState};

pub mod errors;
pub use errors::{
    ConversionError, DecodeError, InspectError, InspectResult, InvalidIndexError, NoDecoderError,
    ParseError,
};
