use std::io::Cursor;

use crate::bits::BitReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaluType {
    NonIDR,
    IDR,
    SEI,
    SPS,
    PPS,
    AUD,
    EOSeq,
    EOStream,
    Fill,
    Other(u8),
}

impl std::fmt::Display for NaluType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NaluType::NonIDR => "NonIDR_1",
            NaluType::IDR => "IDR_5",
            NaluType::SEI => "SEI_6",
            NaluType::SPS => "SPS_7",
            NaluType::PPS => "PPS_8",
            NaluType::AUD => "AUD_9",
            NaluType::EOSeq => "EndOfSequence_10",
            NaluType::EOStream => "EndOfStream_11",
            NaluType::Fill => "FILL_12",
            NaluType::Other(v) => return write!(f, "Other_{v}"),
        };
        f.write_str(s)
    }
}

impl NaluType {
    pub fn from_header_byte(b: u8) -> Self {
        match b & 0x1f {
            1 => NaluType::NonIDR,
            5 => NaluType::IDR,
            6 => NaluType::SEI,
            7 => NaluType::SPS,
            8 => NaluType::PPS,
            9 => NaluType::AUD,
            10 => NaluType::EOSeq,
            11 => NaluType::EOStream,
            12 => NaluType::Fill,
            v => NaluType::Other(v),
        }
    }

    /// Raw NAL unit type value (the low five bits of the header byte).
    pub fn raw(&self) -> u8 {
        match self {
            NaluType::NonIDR => 1,
            NaluType::IDR => 5,
            NaluType::SEI => 6,
            NaluType::SPS => 7,
            NaluType::PPS => 8,
            NaluType::AUD => 9,
            NaluType::EOSeq => 10,
            NaluType::EOStream => 11,
            NaluType::Fill => 12,
            NaluType::Other(v) => *v,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, NaluType::NonIDR | NaluType::IDR)
    }
}

/// Picture type of a classified sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameType {
    I,
    P,
    B,
    #[default]
    Unknown,
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FrameType::I => "I",
            FrameType::P => "P",
            FrameType::B => "B",
            FrameType::Unknown => "?",
        };
        f.write_str(s)
    }
}

/// Classify an H.264 sample into I/P/B by inspecting its slice NAL units.
///
/// IDR slices are I frames by definition. Non-IDR slices carry the picture
/// type in the slice header (`slice_type`, Exp-Golomb after
/// `first_mb_in_slice`). Samples without any video slice stay `Unknown`.
pub fn classify_sample(sample: &[u8], nal_length_size: usize) -> FrameType {
    let nalus = match super::nalus::extract_nalus_from_sample(sample, nal_length_size) {
        Some(n) => n,
        None => return FrameType::Unknown,
    };

    for nalu in &nalus {
        match nalu.nalu_type {
            NaluType::IDR => return FrameType::I,
            NaluType::NonIDR => {
                if let Some(ft) = classify_slice_header(&nalu.data) {
                    return ft;
                }
            }
            _ => {}
        }
    }
    FrameType::Unknown
}

/// Parse the start of a non-IDR slice header and map `slice_type` to a
/// picture type. `nalu` includes the one-byte NAL header.
fn classify_slice_header(nalu: &[u8]) -> Option<FrameType> {
    if nalu.len() < 2 {
        return None;
    }
    // The first handful of header bytes is enough for two Exp-Golomb values;
    // strip emulation prevention bytes before bit-reading.
    let rbsp = unescape_rbsp(&nalu[1..nalu.len().min(16)]);
    let mut r = BitReader::new(Cursor::new(&rbsp));
    let _first_mb_in_slice = r.read_ue();
    let slice_type = r.read_ue();
    if r.acc_error().is_some() {
        return None;
    }
    // slice_type 5..9 mean "all slices in this picture share the type"
    match slice_type % 5 {
        0 | 3 => Some(FrameType::P),
        1 => Some(FrameType::B),
        2 | 4 => Some(FrameType::I),
        _ => None,
    }
}

/// Remove 0x03 emulation prevention bytes from an escaped RBSP prefix.
fn unescape_rbsp(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut zeros = 0u32;
    for &b in data {
        if zeros >= 2 && b == 3 {
            zeros = 0;
            continue;
        }
        if b == 0 {
            zeros += 1;
        } else {
            zeros = 0;
        }
        out.push(b);
    }
    out
}
