use super::r#box::find_box;
use crate::errors::{InspectError, InspectResult};

#[derive(Debug, PartialEq)]
pub struct CttsEntry {
    pub sample_count: u32,
    /// Composition time offset in timescale units. Version 1 boxes allow
    /// negative offsets; version 0 values are reinterpreted as unsigned.
    pub sample_offset: i64,
}

/// Parse ctts (composition time offset) box. The box is optional; streams
/// without B-frames usually omit it, in which case pts == dts for every
/// sample and `None` is returned.
pub fn parse_ctts(stbl: &[u8]) -> InspectResult<Option<Vec<CttsEntry>>> {
    let ctts = match find_box(stbl, "ctts") {
        Some(b) => b,
        None => return Ok(None),
    };

    if ctts.len() < 8 {
        return Err(InspectError::parse(
            "ctts box too small: expected at least 8 bytes",
        ));
    }

    let version = ctts[0];
    let entry_count = u32::from_be_bytes([ctts[4], ctts[5], ctts[6], ctts[7]]);

    let required_size = 8 + (entry_count as usize * 8);
    if required_size > ctts.len() {
        return Err(InspectError::parse(format!(
            "ctts box too small for {} entries: expected {} bytes, got {}",
            entry_count,
            required_size,
            ctts.len()
        )));
    }

    let mut entries = Vec::with_capacity(entry_count as usize);

    for i in 0..entry_count {
        let entry_pos = 8 + (i * 8) as usize;
        let sample_count = u32::from_be_bytes([
            ctts[entry_pos],
            ctts[entry_pos + 1],
            ctts[entry_pos + 2],
            ctts[entry_pos + 3],
        ]);
        let raw_offset = u32::from_be_bytes([
            ctts[entry_pos + 4],
            ctts[entry_pos + 5],
            ctts[entry_pos + 6],
            ctts[entry_pos + 7],
        ]);
        let sample_offset = if version == 1 {
            raw_offset as i32 as i64
        } else {
            raw_offset as i64
        };

        entries.push(CttsEntry {
            sample_count,
            sample_offset,
        });
    }

    Ok(Some(entries))
}

/// Expand CTTS entries into per-sample composition offsets.
/// Returns an empty vector when `entries` is `None`.
pub fn build_composition_offsets(entries: Option<&[CttsEntry]>) -> Vec<i64> {
    let mut offsets = Vec::new();
    if let Some(entries) = entries {
        for entry in entries {
            for _ in 0..entry.sample_count {
                offsets.push(entry.sample_offset);
            }
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctts_box(version: u8, entries: &[(u32, i32)]) -> Vec<u8> {
        let mut payload = vec![version, 0, 0, 0];
        payload.extend_from_slice(&(entries.len() as u32).to_be_bytes());
        for (count, offset) in entries {
            payload.extend_from_slice(&count.to_be_bytes());
            payload.extend_from_slice(&offset.to_be_bytes());
        }
        let mut out = Vec::new();
        out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(b"ctts");
        out.extend_from_slice(&payload);
        out
    }

    #[test]
    fn test_missing_ctts_is_ok() {
        assert!(parse_ctts(&[0u8; 16]).unwrap().is_none());
    }

    #[test]
    fn test_parse_v1_negative_offsets() {
        let stbl = ctts_box(1, &[(1, 2000), (2, -1000)]);
        let entries = parse_ctts(&stbl).unwrap().unwrap();
        let offsets = build_composition_offsets(Some(&entries));
        assert_eq!(offsets, vec![2000, -1000, -1000]);
    }

    #[test]
    fn test_parse_v0_offsets_unsigned() {
        let stbl = ctts_box(0, &[(1, 3000)]);
        let entries = parse_ctts(&stbl).unwrap().unwrap();
        assert_eq!(entries[0].sample_offset, 3000);
    }
}
