use super::r#box::find_box;

/// Parse stss (sync samples / I-frames) box (optional). When the box is
/// absent every sample is a sync sample and `None` is returned.
pub fn parse_stss(stbl: &[u8]) -> Option<Vec<u32>> {
    let stss = find_box(stbl, "stss")?;

    if stss.len() < 8 {
        return None;
    }

    let entry_count = u32::from_be_bytes([stss[4], stss[5], stss[6], stss[7]]);
    let mut sync_samples = Vec::new();

    for i in 0..entry_count {
        let entry_pos = 8 + (i * 4) as usize;
        if entry_pos + 4 <= stss.len() {
            let sample_number = u32::from_be_bytes([
                stss[entry_pos],
                stss[entry_pos + 1],
                stss[entry_pos + 2],
                stss[entry_pos + 3],
            ]);
            sync_samples.push(sample_number);
        }
    }

    Some(sync_samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stss() {
        let mut stbl = Vec::new();
        stbl.extend_from_slice(&24u32.to_be_bytes());
        stbl.extend_from_slice(b"stss");
        stbl.extend_from_slice(&[0, 0, 0, 0]);
        stbl.extend_from_slice(&2u32.to_be_bytes());
        stbl.extend_from_slice(&1u32.to_be_bytes());
        stbl.extend_from_slice(&31u32.to_be_bytes());

        assert_eq!(parse_stss(&stbl), Some(vec![1, 31]));
    }

    #[test]
    fn test_missing_stss() {
        assert_eq!(parse_stss(&[0u8; 16]), None);
    }
}
