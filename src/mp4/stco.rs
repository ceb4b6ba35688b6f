use super::r#box::find_box;
use crate::errors::{InspectError, InspectResult};

/// Parse stco (chunk offset) or co64 box.
pub fn parse_stco_or_co64(stbl: &[u8]) -> InspectResult<Vec<u64>> {
    // Try stco first (32-bit offsets)
    if let Some(stco) = find_box(stbl, "stco") {
        if stco.len() < 8 {
            return Err(InspectError::parse(
                "stco box too small: expected at least 8 bytes",
            ));
        }
        let entry_count = u32::from_be_bytes([stco[4], stco[5], stco[6], stco[7]]);
        let mut offsets = Vec::new();

        for i in 0..entry_count {
            let offset_pos = 8 + (i * 4) as usize;
            if offset_pos + 4 <= stco.len() {
                let offset = u32::from_be_bytes([
                    stco[offset_pos],
                    stco[offset_pos + 1],
                    stco[offset_pos + 2],
                    stco[offset_pos + 3],
                ]) as u64;
                offsets.push(offset);
            }
        }
        return Ok(offsets);
    }

    // Try co64 (64-bit offsets)
    if let Some(co64) = find_box(stbl, "co64") {
        if co64.len() < 8 {
            return Err(InspectError::parse(
                "co64 box too small: expected at least 8 bytes",
            ));
        }
        let entry_count = u32::from_be_bytes([co64[4], co64[5], co64[6], co64[7]]);
        let mut offsets = Vec::new();

        for i in 0..entry_count {
            let offset_pos = 8 + (i * 8) as usize;
            if offset_pos + 8 <= co64.len() {
                let offset = u64::from_be_bytes([
                    co64[offset_pos],
                    co64[offset_pos + 1],
                    co64[offset_pos + 2],
                    co64[offset_pos + 3],
                    co64[offset_pos + 4],
                    co64[offset_pos + 5],
                    co64[offset_pos + 6],
                    co64[offset_pos + 7],
                ]);
                offsets.push(offset);
            }
        }
        return Ok(offsets);
    }

    Err(InspectError::parse(
        "No chunk offset box found: missing both stco and co64",
    ))
}
