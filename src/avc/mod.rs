pub mod avc_type;
pub mod nalus;

pub use avc_type::{classify_sample, FrameType, NaluType};
pub use nalus::{
    extract_nalus_from_sample, get_parameter_sets, nalu_to_annexb, sample_to_annexb, Nalu,
    START_CODE,
};
