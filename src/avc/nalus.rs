use super::NaluType;

/// Annex B start code used when rebuilding a bytestream for the decoder.
pub const START_CODE: [u8; 4] = [0, 0, 0, 1];

/// Represents a NAL unit with its type and data
#[derive(Debug, Clone)]
pub struct Nalu {
    pub nalu_type: NaluType,
    pub data: Vec<u8>,
}

impl Nalu {
    /// Create a NALU from raw data
    pub fn new(data: Vec<u8>) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let nalu_type = NaluType::from_header_byte(data[0]);
        Some(Nalu { nalu_type, data })
    }

    /// Check if this NALU is a video slice
    pub fn is_video(&self) -> bool {
        self.nalu_type.is_video()
    }

    /// Check if this NALU is a parameter set (SPS/PPS)
    pub fn is_parameter_set(&self) -> bool {
        matches!(self.nalu_type, NaluType::SPS | NaluType::PPS)
    }
}

/// Extract NAL units from an MP4 sample with length prefixes.
/// `nal_length_size` is 1, 2 or 4 bytes (from avcC); 4 is by far the common
/// case. If the sample is malformed, `None` is returned.
pub fn extract_nalus_from_sample(sample: &[u8], nal_length_size: usize) -> Option<Vec<Nalu>> {
    if !(matches!(nal_length_size, 1 | 2 | 4)) || sample.len() < nal_length_size {
        return None;
    }
    let mut pos = 0usize;
    let mut nalus = Vec::new();
    while pos + nal_length_size <= sample.len() {
        let mut len = 0usize;
        for &b in &sample[pos..pos + nal_length_size] {
            len = (len << 8) | b as usize;
        }
        pos += nal_length_size;
        if len == 0 || pos + len > sample.len() {
            return None;
        }
        if let Some(nalu) = Nalu::new(sample[pos..pos + len].to_vec()) {
            nalus.push(nalu);
        }
        pos += len;
    }
    Some(nalus)
}

/// Collect SPS and PPS NAL units that precede the first video slice.
pub fn get_parameter_sets(sample: &[u8], nal_length_size: usize) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
    let mut sps = Vec::new();
    let mut pps = Vec::new();
    let nalus = match extract_nalus_from_sample(sample, nal_length_size) {
        Some(n) => n,
        None => return (sps, pps),
    };
    for nalu in nalus {
        match nalu.nalu_type {
            NaluType::SPS => sps.push(nalu.data),
            NaluType::PPS => pps.push(nalu.data),
            t if t.is_video() => break,
            _ => {}
        }
    }
    (sps, pps)
}

/// Rebuild a length-prefixed MP4 sample as an Annex B bytestream,
/// skipping parameter sets (the decoder is seeded with them separately).
pub fn sample_to_annexb(sample: &[u8], nal_length_size: usize) -> Option<Vec<u8>> {
    let nalus = extract_nalus_from_sample(sample, nal_length_size)?;
    let mut out = Vec::with_capacity(sample.len() + nalus.len() * 4);
    for nalu in &nalus {
        if nalu.is_parameter_set() {
            continue;
        }
        out.extend_from_slice(&START_CODE);
        out.extend_from_slice(&nalu.data);
    }
    if out.is_empty() {
        return None;
    }
    Some(out)
}

/// Prefix a bare NAL unit with an Annex B start code.
pub fn nalu_to_annexb(nalu: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(nalu.len() + 4);
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(nalu);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_length_prefixed() {
        let sample = [
            0x00, 0x00, 0x00, 0x02, 0x65, 0xaa, // IDR, 2 bytes
            0x00, 0x00, 0x00, 0x01, 0x41, // NonIDR, 1 byte
        ];
        let nalus = extract_nalus_from_sample(&sample, 4).unwrap();
        assert_eq!(nalus.len(), 2);
        assert_eq!(nalus[0].nalu_type, NaluType::IDR);
        assert_eq!(nalus[1].nalu_type, NaluType::NonIDR);
    }

    #[test]
    fn test_extract_two_byte_lengths() {
        let sample = [0x00, 0x03, 0x67, 0x42, 0x00];
        let nalus = extract_nalus_from_sample(&sample, 2).unwrap();
        assert_eq!(nalus.len(), 1);
        assert_eq!(nalus[0].nalu_type, NaluType::SPS);
    }

    #[test]
    fn test_extract_truncated_sample() {
        let sample = [0x00, 0x00, 0x00, 0x09, 0x65, 0xaa];
        assert!(extract_nalus_from_sample(&sample, 4).is_none());
    }

    #[test]
    fn test_sample_to_annexb_skips_parameter_sets() {
        let sample = [
            0x00, 0x00, 0x00, 0x02, 0x67, 0x42, // SPS
            0x00, 0x00, 0x00, 0x02, 0x68, 0xce, // PPS
            0x00, 0x00, 0x00, 0x02, 0x65, 0xaa, // IDR
        ];
        let annexb = sample_to_annexb(&sample, 4).unwrap();
        assert_eq!(annexb, vec![0, 0, 0, 1, 0x65, 0xaa]);
    }

    #[test]
    fn test_parameter_set_collection() {
        let sample = [
            0x00, 0x00, 0x00, 0x02, 0x67, 0x42, // SPS
            0x00, 0x00, 0x00, 0x02, 0x68, 0xce, // PPS
            0x00, 0x00, 0x00, 0x02, 0x65, 0xaa, // IDR
        ];
        let (sps, pps) = get_parameter_sets(&sample, 4);
        assert_eq!(sps.len(), 1);
        assert_eq!(pps.len(), 1);
        assert_eq!(sps[0], vec![0x67, 0x42]);
    }
}
