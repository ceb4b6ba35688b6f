use super::frame::VideoFrame;
use crate::errors::InspectResult;

/// Decoder codec identifiers resolvable from a container fourCC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecId {
    H264,
    Hevc,
    Mpeg4,
    Mjpeg,
    Jpeg2000,
    Mpeg1Video,
    Mpeg2Video,
    Vp9,
}

impl CodecId {
    /// Map a sample-entry fourCC to a codec id. Unknown codes map to `None`
    /// and the track is excluded from decode capability.
    pub fn from_fourcc(fourcc: &str) -> Option<Self> {
        match fourcc {
            "avc1" | "avc3" => Some(CodecId::H264),
            "hev1" | "hvc1" => Some(CodecId::Hevc),
            "mp4v" => Some(CodecId::Mpeg4),
            "mjpa" | "mjpb" | "jpeg" => Some(CodecId::Mjpeg),
            "mjp2" => Some(CodecId::Jpeg2000),
            "mp1v" => Some(CodecId::Mpeg1Video),
            "mp2v" => Some(CodecId::Mpeg2Video),
            "vp09" => Some(CodecId::Vp9),
            _ => None,
        }
    }

    /// Whether the per-sample frame-type classification pass can run on this
    /// codec (NAL-structured streams only).
    pub fn supports_classification(&self) -> bool {
        matches!(self, CodecId::H264 | CodecId::Hevc)
    }
}

impl std::fmt::Display for CodecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CodecId::H264 => "H.264/AVC",
            CodecId::Hevc => "H.265/HEVC",
            CodecId::Mpeg4 => "MPEG-4 Visual",
            CodecId::Mjpeg => "Motion JPEG",
            CodecId::Jpeg2000 => "JPEG 2000",
            CodecId::Mpeg1Video => "MPEG-1 Video",
            CodecId::Mpeg2Video => "MPEG-2 Video",
            CodecId::Vp9 => "VP9",
        };
        f.write_str(s)
    }
}

/// One compressed sample as handed to a decoder.
#[derive(Debug, Clone)]
pub struct Packet {
    pub data: Vec<u8>,
    pub pts_ms: i64,
    pub dts_ms: i64,
    pub is_key_frame: bool,
}

/// Outcome of a single `receive_frame` call.
#[derive(Debug)]
pub enum ReceiveResult {
    Frame(VideoFrame),
    /// The decoder is buffering and needs more packets before it can emit
    NeedsMoreInput,
    /// All buffered frames drained after end-of-stream
    EndOfStream,
}

/// Stateful streaming decoder for one track. Packets arrive in decode
/// order; frames come back in decode order too, with the implementation
/// responsible for assigning correct presentation timestamps when the
/// stream reorders (B-frames).
pub trait VideoDecoder: Send {
    fn send_packet(&mut self, packet: &Packet) -> InspectResult<()>;

    /// Signal that no more packets follow; subsequent `receive_frame` calls
    /// drain buffered output and then report `EndOfStream`.
    fn send_eos(&mut self) -> InspectResult<()>;

    fn receive_frame(&mut self) -> InspectResult<ReceiveResult>;

    /// Drop all internal decode state so the next packet can start a fresh
    /// run from a key frame. The handle itself stays usable.
    fn flush(&mut self) -> InspectResult<()>;
}
