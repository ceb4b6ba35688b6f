use super::r#box::find_box;
use crate::errors::{InspectError, InspectResult};

/// Details extracted from the first sample description entry of an stsd box.
#[derive(Debug, Clone, Default)]
pub struct StsdInfo {
    /// Codec fourCC of the first sample entry ("avc1", "mp4a", ...)
    pub fourcc: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub channels: Option<u16>,
    pub sample_rate: Option<u32>,
    /// Raw AVCDecoderConfigurationRecord payload for avc1/avc3 entries
    pub avcc: Option<Vec<u8>>,
}

/// Parse the first sample description entry of the stsd box found in `stbl`.
/// `handler` is the track's hdlr handler type ("vide", "soun", ...). Only
/// the fields relevant to that handler are populated.
pub fn parse_stsd(stbl: &[u8], handler: &str) -> InspectResult<StsdInfo> {
    let stsd = find_box(stbl, "stsd")
        .ok_or_else(|| InspectError::parse("stsd box not found in stbl box"))?;

    if stsd.len() < 16 {
        return Err(InspectError::parse(
            "stsd box too small: expected at least 16 bytes",
        ));
    }

    // Skip version and flags (4 bytes) and entry count (4 bytes)
    let entry_start = 8;
    let entry_size = u32::from_be_bytes([
        stsd[entry_start],
        stsd[entry_start + 1],
        stsd[entry_start + 2],
        stsd[entry_start + 3],
    ]) as usize;
    let entry_end = (entry_start + entry_size).min(stsd.len());

    let fourcc_pos = entry_start + 4;
    let fourcc = std::str::from_utf8(&stsd[fourcc_pos..fourcc_pos + 4])
        .unwrap_or("unknown")
        .to_string();

    let mut info = StsdInfo {
        fourcc,
        ..StsdInfo::default()
    };

    match handler {
        "vide" => {
            // Visual sample entry body: 6 reserved + 2 data reference index,
            // then 16 bytes of version/vendor/quality fields before width
            let mut pos = fourcc_pos + 4 + 8 + 16;
            if pos + 4 <= entry_end {
                info.width = Some(u16::from_be_bytes([stsd[pos], stsd[pos + 1]]) as u32);
                pos += 2;
                info.height = Some(u16::from_be_bytes([stsd[pos], stsd[pos + 1]]) as u32);
            }

            // Child boxes start after the 78-byte visual sample entry body
            let children_start = entry_start + 8 + 78;
            if children_start < entry_end {
                if let Some(avcc) = find_box(&stsd[children_start..entry_end], "avcC") {
                    info.avcc = Some(avcc.to_vec());
                }
            }
        }
        "soun" => {
            // Audio sample entry body: 6 reserved + 2 data reference index,
            // then version/revision/vendor (8 bytes) before the channel count
            let channels_pos = fourcc_pos + 4 + 8 + 8;
            if channels_pos + 2 <= entry_end {
                info.channels = Some(u16::from_be_bytes([
                    stsd[channels_pos],
                    stsd[channels_pos + 1],
                ]));
            }
            // Sample rate is 16.16 fixed point after sample size and
            // compression/packet size fields
            let rate_pos = channels_pos + 2 + 2 + 4;
            if rate_pos + 4 <= entry_end {
                info.sample_rate = Some(u32::from_be_bytes([
                    stsd[rate_pos],
                    stsd[rate_pos + 1],
                    stsd[rate_pos + 2],
                    stsd[rate_pos + 3],
                ]) >> 16);
            }
        }
        _ => {}
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_stsd(entry: &[u8]) -> Vec<u8> {
        let mut payload = vec![0u8; 4];
        payload.extend_from_slice(&1u32.to_be_bytes());
        payload.extend_from_slice(entry);
        let mut out = Vec::new();
        out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(b"stsd");
        out.extend_from_slice(&payload);
        out
    }

    fn video_entry(fourcc: &[u8; 4], width: u16, height: u16, avcc: Option<&[u8]>) -> Vec<u8> {
        let mut body = vec![0u8; 8]; // reserved + data reference index
        body.extend_from_slice(&[0u8; 16]); // version/vendor/quality fields
        body.extend_from_slice(&width.to_be_bytes());
        body.extend_from_slice(&height.to_be_bytes());
        body.extend_from_slice(&vec![0u8; 78 - body.len()]);
        if let Some(avcc) = avcc {
            body.extend_from_slice(&((avcc.len() + 8) as u32).to_be_bytes());
            body.extend_from_slice(b"avcC");
            body.extend_from_slice(avcc);
        }
        let mut entry = Vec::new();
        entry.extend_from_slice(&((body.len() + 8) as u32).to_be_bytes());
        entry.extend_from_slice(fourcc);
        entry.extend_from_slice(&body);
        entry
    }

    #[test]
    fn test_parse_video_entry() {
        let stbl = wrap_stsd(&video_entry(b"avc1", 1920, 1080, Some(&[1, 2, 3, 4])));
        let info = parse_stsd(&stbl, "vide").unwrap();
        assert_eq!(info.fourcc, "avc1");
        assert_eq!(info.width, Some(1920));
        assert_eq!(info.height, Some(1080));
        assert_eq!(info.avcc, Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn test_parse_audio_entry() {
        let mut body = vec![0u8; 8];
        body.extend_from_slice(&[0u8; 8]); // version/revision/vendor
        body.extend_from_slice(&2u16.to_be_bytes()); // channels
        body.extend_from_slice(&16u16.to_be_bytes()); // sample size
        body.extend_from_slice(&[0u8; 4]); // compression/packet size
        body.extend_from_slice(&(48000u32 << 16).to_be_bytes());
        let mut entry = Vec::new();
        entry.extend_from_slice(&((body.len() + 8) as u32).to_be_bytes());
        entry.extend_from_slice(b"mp4a");
        entry.extend_from_slice(&body);

        let info = parse_stsd(&wrap_stsd(&entry), "soun").unwrap();
        assert_eq!(info.fourcc, "mp4a");
        assert_eq!(info.channels, Some(2));
        assert_eq!(info.sample_rate, Some(48000));
    }

    #[test]
    fn test_missing_stsd() {
        assert!(parse_stsd(&[0u8; 16], "vide").is_err());
    }
}
