use crate::errors::{InspectError, InspectResult};

/// Parse mdhd box to get timescale and duration
pub fn parse_mdhd(mdhd: &[u8]) -> InspectResult<(u32, u64)> {
    if mdhd.len() < 20 {
        return Err(InspectError::parse("mdhd box too small"));
    }

    let version = mdhd[0];
    if version == 1 {
        // Version 1: 64-bit values
        if mdhd.len() < 32 {
            return Err(InspectError::parse("mdhd v1 box too small"));
        }
        let timescale = u32::from_be_bytes([mdhd[20], mdhd[21], mdhd[22], mdhd[23]]);
        let duration = u64::from_be_bytes([
            mdhd[24], mdhd[25], mdhd[26], mdhd[27], mdhd[28], mdhd[29], mdhd[30], mdhd[31],
        ]);
        Ok((timescale, duration))
    } else {
        // Version 0: 32-bit values
        let timescale = u32::from_be_bytes([mdhd[12], mdhd[13], mdhd[14], mdhd[15]]);
        let duration = u32::from_be_bytes([mdhd[16], mdhd[17], mdhd[18], mdhd[19]]) as u64;
        Ok((timescale, duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mdhd_v0() {
        let mut mdhd = vec![0u8; 24];
        mdhd[12..16].copy_from_slice(&90000u32.to_be_bytes());
        mdhd[16..20].copy_from_slice(&180000u32.to_be_bytes());
        let (timescale, duration) = parse_mdhd(&mdhd).unwrap();
        assert_eq!(timescale, 90000);
        assert_eq!(duration, 180000);
    }

    #[test]
    fn test_parse_mdhd_too_small() {
        assert!(parse_mdhd(&[0u8; 8]).is_err());
    }
}
