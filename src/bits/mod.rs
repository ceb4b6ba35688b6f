pub mod reader;

pub use reader::{read_u32, read_u64, BitReader};
