use super::r#box::find_box;
use crate::errors::{InspectError, InspectResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SampleToChunkEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_index: u32,
}

/// Parse stsc (sample to chunk) box.
pub fn parse_stsc(stbl: &[u8]) -> InspectResult<Vec<SampleToChunkEntry>> {
    let stsc = find_box(stbl, "stsc")
        .ok_or_else(|| InspectError::parse("stsc box not found in stbl box"))?;

    if stsc.len() < 8 {
        return Err(InspectError::parse(
            "stsc box too small: expected at least 8 bytes",
        ));
    }

    let entry_count = u32::from_be_bytes([stsc[4], stsc[5], stsc[6], stsc[7]]);

    // Verify that the box has enough space for all entries
    let required_size = 8 + (entry_count as usize * 12);
    if required_size > stsc.len() {
        return Err(InspectError::parse(format!(
            "stsc box too small for {} entries: expected {} bytes, got {}",
            entry_count,
            required_size,
            stsc.len()
        )));
    }

    let mut entries = Vec::with_capacity(entry_count as usize);

    for i in 0..entry_count {
        let entry_pos = 8 + (i * 12) as usize;
        let first_chunk = u32::from_be_bytes([
            stsc[entry_pos],
            stsc[entry_pos + 1],
            stsc[entry_pos + 2],
            stsc[entry_pos + 3],
        ]);
        let samples_per_chunk = u32::from_be_bytes([
            stsc[entry_pos + 4],
            stsc[entry_pos + 5],
            stsc[entry_pos + 6],
            stsc[entry_pos + 7],
        ]);
        let sample_description_index = u32::from_be_bytes([
            stsc[entry_pos + 8],
            stsc[entry_pos + 9],
            stsc[entry_pos + 10],
            stsc[entry_pos + 11],
        ]);

        entries.push(SampleToChunkEntry {
            first_chunk,
            samples_per_chunk,
            sample_description_index,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stsc_box(entries: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut payload = vec![0u8; 4];
        payload.extend_from_slice(&(entries.len() as u32).to_be_bytes());
        for (first, per_chunk, desc) in entries {
            payload.extend_from_slice(&first.to_be_bytes());
            payload.extend_from_slice(&per_chunk.to_be_bytes());
            payload.extend_from_slice(&desc.to_be_bytes());
        }
        let mut out = Vec::new();
        out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(b"stsc");
        out.extend_from_slice(&payload);
        out
    }

    #[test]
    fn test_parse_entries() {
        let stbl = stsc_box(&[(1, 3, 1), (4, 1, 1)]);
        let entries = parse_stsc(&stbl).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].first_chunk, 1);
        assert_eq!(entries[0].samples_per_chunk, 3);
        assert_eq!(entries[1].first_chunk, 4);
        assert_eq!(entries[1].samples_per_chunk, 1);
    }

    #[test]
    fn test_truncated_box() {
        let mut stbl = stsc_box(&[(1, 3, 1)]);
        // Claim two entries but only carry one
        stbl[15] = 2;
        assert!(parse_stsc(&stbl).is_err());
    }
}
