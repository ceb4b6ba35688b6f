pub mod store;
pub mod types;

pub use store::TrackStore;
pub use types::{ChunkInfo, MediaKind, SampleInfo, TrackInfo};
