use crate::bits::reader::{read_u32, read_u64};

/// Parse a box header from a byte slice advancing the cursor
pub fn parse_box_header(data: &[u8], pos: &mut usize) -> Option<(String, u64)> {
    if *pos + 8 > data.len() {
        return None;
    }
    let size = read_u32(data, pos)? as u64;
    let name = &data[*pos..*pos + 4];
    *pos += 4;
    let mut real_size = size;
    if size == 1 {
        if *pos + 8 > data.len() {
            return None;
        }
        real_size = read_u64(data, pos)?;
    }
    Some((std::str::from_utf8(name).ok()?.to_string(), real_size))
}

/// Find a box and return the contained slice
pub fn find_box<'a>(data: &'a [u8], name: &str) -> Option<&'a [u8]> {
    let (_, start, end) = find_box_range(data, name)?;
    Some(&data[start..end])
}

/// Find a box and return the start and end indices of its payload
pub fn find_box_range(data: &[u8], name: &str) -> Option<(usize, usize, usize)> {
    let mut pos = 0usize;
    let mut iterations = 0; // Add safety counter

    while pos + 8 <= data.len() && iterations < 10000 {
        let start = pos;
        let (box_name, size) = parse_box_header(data, &mut pos)?;

        if size == 0 {
            // Skip empty boxes
            iterations += 1;
            continue;
        }

        if size < 8 {
            // Invalid box size
            return None;
        }

        if size as usize > data.len() - start {
            return None;
        }

        let payload_start = pos;
        let payload_end = start + size as usize;

        if box_name == name {
            return Some((start, payload_start, payload_end));
        }

        pos = payload_end;
        iterations += 1;

        // Ensure we're making progress
        if pos <= start {
            return None;
        }
    }
    None
}

/// Iterate top-level boxes of a payload, calling `f` for each (name, payload).
/// Stops early when `f` returns false.
pub fn for_each_box(data: &[u8], mut f: impl FnMut(&str, &[u8]) -> bool) {
    let mut pos = 0usize;
    while pos + 8 <= data.len() {
        let start = pos;
        let (name, size) = match parse_box_header(data, &mut pos) {
            Some(v) => v,
            None => break,
        };
        if size < 8 || size as usize > data.len() - start {
            break;
        }
        let payload = &data[pos..start + size as usize];
        if !f(&name, payload) {
            break;
        }
        pos = start + size as usize;
    }
}
