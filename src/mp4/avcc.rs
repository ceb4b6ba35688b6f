//! A module for parsing AVCConfigurationBox (avcC) data.
//! Parses SPS and PPS NAL units for H.264 streams in AVCC format.

use crate::errors::{InspectError, InspectResult};

/// Represents the parsed AVCDecoderConfigurationRecord (avcC) configuration.
#[derive(Debug, Clone)]
pub struct AvccConfig {
    /// configurationVersion
    pub configuration_version: u8,
    /// AVCProfileIndication
    pub profile: u8,
    /// profileCompatibility
    pub compatibility: u8,
    /// AVCLevelIndication
    pub level: u8,
    /// lengthSizeMinusOne
    pub length_size_minus_one: u8,
    /// Sequence Parameter Sets
    pub sps: Vec<Vec<u8>>,
    /// Picture Parameter Sets
    pub pps: Vec<Vec<u8>>,
}

impl AvccConfig {
    /// Parse AVCDecoderConfigurationRecord as defined in ISO/IEC 14496-15.
    ///
    /// data: full contents of the avcC box (excluding header).
    pub fn parse(data: &[u8]) -> InspectResult<Self> {
        let mut pos = 0;
        if data.len() < 7 {
            return Err(InspectError::parse("avcC data too short"));
        }
        // configurationVersion
        let configuration_version = data[pos];
        pos += 1;
        // AVCProfileIndication
        let profile = data[pos];
        pos += 1;
        // profileCompatibility
        let compatibility = data[pos];
        pos += 1;
        // AVCLevelIndication
        let level = data[pos];
        pos += 1;
        // lengthSizeMinusOne: 6 bits reserved + 2 bits
        let length_size_minus_one = data[pos] & 0x03;
        pos += 1;
        // numOfSequenceParameterSets: 3 bits reserved + 5 bits count
        let num_sps = data[pos] & 0x1F;
        pos += 1;
        let mut sps = Vec::with_capacity(num_sps as usize);
        for _ in 0..num_sps {
            if pos + 2 > data.len() {
                return Err(InspectError::parse(
                    "Unexpected EOF while reading SPS length",
                ));
            }
            let len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            pos += 2;
            if pos + len > data.len() {
                return Err(InspectError::parse("Unexpected EOF while reading SPS data"));
            }
            sps.push(data[pos..pos + len].to_vec());
            pos += len;
        }
        // numOfPictureParameterSets
        if pos >= data.len() {
            return Err(InspectError::parse(
                "Unexpected EOF while reading PPS count",
            ));
        }
        let num_pps = data[pos];
        pos += 1;
        let mut pps = Vec::with_capacity(num_pps as usize);
        for _ in 0..num_pps {
            if pos + 2 > data.len() {
                return Err(InspectError::parse(
                    "Unexpected EOF while reading PPS length",
                ));
            }
            let len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            pos += 2;
            if pos + len > data.len() {
                return Err(InspectError::parse("Unexpected EOF while reading PPS data"));
            }
            pps.push(data[pos..pos + len].to_vec());
            pos += len;
        }
        Ok(AvccConfig {
            configuration_version,
            profile,
            compatibility,
            level,
            length_size_minus_one,
            sps,
            pps,
        })
    }

    /// Length in bytes of the NAL size prefix used by samples of this stream.
    pub fn nal_length_size(&self) -> usize {
        self.length_size_minus_one as usize + 1
    }

    /// Check if configuration is valid
    pub fn is_valid(&self) -> bool {
        !self.sps.is_empty() && !self.pps.is_empty()
    }
}
