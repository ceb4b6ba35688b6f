use super::r#box::find_box;
use crate::errors::{InspectError, InspectResult};

/// Parse stsz (sample size) box.
pub fn parse_stsz(stbl: &[u8]) -> InspectResult<Vec<u32>> {
    let stsz = find_box(stbl, "stsz")
        .ok_or_else(|| InspectError::parse("stsz box not found in stbl box"))?;

    if stsz.len() < 12 {
        return Err(InspectError::parse(
            "stsz box too small: expected at least 12 bytes",
        ));
    }

    let sample_size = u32::from_be_bytes([stsz[4], stsz[5], stsz[6], stsz[7]]);
    let sample_count = u32::from_be_bytes([stsz[8], stsz[9], stsz[10], stsz[11]]);

    if sample_size != 0 {
        // All samples have the same size
        Ok(vec![sample_size; sample_count as usize])
    } else {
        // Individual sample sizes
        let required_size = 12 + (sample_count as usize * 4);
        if required_size > stsz.len() {
            return Err(InspectError::parse(format!(
                "stsz box too small for {} samples: expected {} bytes, got {}",
                sample_count,
                required_size,
                stsz.len()
            )));
        }

        let mut sizes = Vec::with_capacity(sample_count as usize);
        for i in 0..sample_count {
            let size_pos = 12 + (i * 4) as usize;
            let size = u32::from_be_bytes([
                stsz[size_pos],
                stsz[size_pos + 1],
                stsz[size_pos + 2],
                stsz[size_pos + 3],
            ]);
            sizes.push(size);
        }
        Ok(sizes)
    }
}
