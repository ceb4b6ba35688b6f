use crate::avc::{FrameType, NaluType};

/// Media-specific track details.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaKind {
    Video {
        codec_fourcc: String,
        width: u32,
        height: u32,
        /// Raw AVCDecoderConfigurationRecord for avc1/avc3 tracks
        avcc: Option<Vec<u8>>,
        /// Byte width of the NAL length prefix in samples (1, 2 or 4)
        nal_length_size: usize,
    },
    Audio {
        codec_fourcc: String,
        channels: u16,
        sample_rate: u32,
    },
    Other {
        handler: String,
    },
}

impl MediaKind {
    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video { .. })
    }

    pub fn codec_fourcc(&self) -> Option<&str> {
        match self {
            MediaKind::Video { codec_fourcc, .. } | MediaKind::Audio { codec_fourcc, .. } => {
                Some(codec_fourcc)
            }
            MediaKind::Other { .. } => None,
        }
    }
}

/// One sample (frame) of a track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleInfo {
    /// Storage (decode) order index within the track
    pub index: usize,
    /// Absolute byte offset of the sample in the file
    pub offset: u64,
    pub size: u32,
    /// Presentation timestamp in milliseconds
    pub pts_ms: i64,
    /// Decode timestamp in milliseconds
    pub dts_ms: i64,
    /// Delta to the previous sample's decode timestamp
    pub dts_delta_ms: i64,
    pub is_key_frame: bool,
    /// Picture type, populated lazily by the classification pass
    pub frame_type: FrameType,
    /// NAL unit types carried by the sample, populated lazily
    pub nalu_types: Vec<NaluType>,
}

/// One chunk of a track as described by stsc/stco.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkInfo {
    pub index: usize,
    pub offset: u64,
    /// Index of the first sample stored in this chunk
    pub first_sample: usize,
    pub sample_count: u32,
}

/// Full descriptor of one track, immutable once parsed. Replaced wholesale
/// on re-parse; the classification pass only touches `frame_type` and
/// `nalu_types` of individual samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub track_id: u32,
    pub kind: MediaKind,
    /// mdhd timescale in units per second
    pub timescale: u32,
    pub duration_ms: u64,
    pub samples: Vec<SampleInfo>,
    pub chunks: Vec<ChunkInfo>,
}

impl TrackInfo {
    pub fn is_video(&self) -> bool {
        self.kind.is_video()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
