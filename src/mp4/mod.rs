pub mod r#box;
pub use r#box::{find_box, find_box_range, parse_box_header};
pub mod moov_finder;
pub use moov_finder::{find_and_read_moov_box, find_moov_box, MoovBoxInfo};
pub mod mdhd;
pub use mdhd::parse_mdhd;
pub mod stts;
pub use stts::{parse_stts, SttsEntry};
pub mod ctts;
pub use ctts::{parse_ctts, CttsEntry};
pub mod stsz;
pub use stsz::parse_stsz;
pub mod stsc;
pub use stsc::{parse_stsc, SampleToChunkEntry};
pub mod stco;
pub use stco::parse_stco_or_co64;
pub mod stss;
pub use stss::parse_stss;
pub mod stsd;
pub use stsd::{parse_stsd, StsdInfo};
pub mod avcc;
pub use avcc::AvccConfig;
pub mod parser;
pub use parser::Mp4FileParser;
