use super::r#box::find_box;
use crate::errors::{InspectError, InspectResult};

#[derive(Debug, PartialEq)]
pub struct SttsEntry {
    pub sample_count: u32,
    pub sample_delta: u32,
}

/// Parse stts (decode timing) box
pub fn parse_stts(stbl: &[u8]) -> InspectResult<Vec<SttsEntry>> {
    let stts = find_box(stbl, "stts")
        .ok_or_else(|| InspectError::parse("stts box not found in stbl box"))?;

    if stts.len() < 8 {
        return Err(InspectError::parse(
            "stts box too small: expected at least 8 bytes",
        ));
    }

    let entry_count = u32::from_be_bytes([stts[4], stts[5], stts[6], stts[7]]);

    // Verify that the box has enough space for all entries
    let required_size = 8 + (entry_count as usize * 8);
    if required_size > stts.len() {
        return Err(InspectError::parse(format!(
            "stts box too small for {} entries: expected {} bytes, got {}",
            entry_count,
            required_size,
            stts.len()
        )));
    }

    let mut entries = Vec::with_capacity(entry_count as usize);

    for i in 0..entry_count {
        let entry_pos = 8 + (i * 8) as usize;
        let sample_count = u32::from_be_bytes([
            stts[entry_pos],
            stts[entry_pos + 1],
            stts[entry_pos + 2],
            stts[entry_pos + 3],
        ]);
        let sample_delta = u32::from_be_bytes([
            stts[entry_pos + 4],
            stts[entry_pos + 5],
            stts[entry_pos + 6],
            stts[entry_pos + 7],
        ]);

        entries.push(SttsEntry {
            sample_count,
            sample_delta,
        });
    }

    Ok(entries)
}

/// Expand STTS entries into per-sample decode timestamps in timescale units.
pub fn build_decode_timestamps(entries: &[SttsEntry]) -> Vec<u64> {
    let mut timestamps = Vec::new();
    let mut time_offset = 0u64;

    for entry in entries {
        for _ in 0..entry.sample_count {
            timestamps.push(time_offset);
            time_offset += entry.sample_delta as u64;
        }
    }

    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stts_box(entries: &[(u32, u32)]) -> Vec<u8> {
        let mut payload = vec![0u8; 4];
        payload.extend_from_slice(&(entries.len() as u32).to_be_bytes());
        for (count, delta) in entries {
            payload.extend_from_slice(&count.to_be_bytes());
            payload.extend_from_slice(&delta.to_be_bytes());
        }
        let mut out = Vec::new();
        out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(b"stts");
        out.extend_from_slice(&payload);
        out
    }

    #[test]
    fn test_parse_and_expand() {
        let stbl = stts_box(&[(2, 1000), (1, 2000)]);
        let entries = parse_stts(&stbl).unwrap();
        assert_eq!(entries.len(), 2);
        let dts = build_decode_timestamps(&entries);
        assert_eq!(dts, vec![0, 1000, 2000]);
    }

    #[test]
    fn test_missing_stts() {
        assert!(parse_stts(&[0u8; 16]).is_err());
    }
}
