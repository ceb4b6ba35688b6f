use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::decode::HardwareAccel;

/// User-level configuration of the inspector. Passed explicitly at
/// construction; there is no global settings object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Hardware-acceleration preference for decoder creation
    #[serde(default)]
    pub hardware_accel: HardwareAccel,
    /// Directory saved frames are written into
    #[serde(default = "default_save_frame_path")]
    pub save_frame_path: PathBuf,
}

fn default_save_frame_path() -> PathBuf {
    PathBuf::from(".")
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            hardware_accel: HardwareAccel::Off,
            save_frame_path: default_save_frame_path(),
        }
    }
}
