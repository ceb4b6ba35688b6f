/*
# Bits Reader Module

 Byte-aligned big endian readers for box parsing plus a BitReader with
 error accumulation for codec payloads (slice headers, avcC). The BitReader
 also provides Exp-Golomb decoding, which H.264 slice-type classification
 needs.
*/

use std::io::{self, Read};

/// Read a 32-bit big endian value from a byte slice advancing the position.
pub fn read_u32(data: &[u8], pos: &mut usize) -> Option<u32> {
    if *pos + 4 > data.len() {
        return None;
    }
    let v = u32::from_be_bytes([data[*pos], data[*pos + 1], data[*pos + 2], data[*pos + 3]]);
    *pos += 4;
    Some(v)
}

/// Read a 64-bit big endian value from a byte slice advancing the position.
pub fn read_u64(data: &[u8], pos: &mut usize) -> Option<u64> {
    if *pos + 8 > data.len() {
        return None;
    }
    let v = u64::from_be_bytes([
        data[*pos],
        data[*pos + 1],
        data[*pos + 2],
        data[*pos + 3],
        data[*pos + 4],
        data[*pos + 5],
        data[*pos + 6],
        data[*pos + 7],
    ]);
    *pos += 8;
    Some(v)
}

/// `BitReader` reads bits from an underlying reader and accumulates the first
/// error that occurs.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    rd: R,
    err: Option<io::Error>,
    n: u32,
    value: u64,
    pos: i64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` that starts accumulating errors.
    pub fn new(rd: R) -> Self {
        Self {
            rd,
            err: None,
            n: 0,
            value: 0,
            pos: -1,
        }
    }

    /// Return the accumulated error if any.
    pub fn acc_error(&self) -> Option<&io::Error> {
        self.err.as_ref()
    }

    /// Read `n` bits and return them as the lowest bits of a `u32`.
    /// If an error has occurred, 0 is returned.
    pub fn read(&mut self, n: u32) -> u32 {
        if self.err.is_some() {
            return 0;
        }
        while self.n < n {
            let mut buf = [0u8; 1];
            match self.rd.read_exact(&mut buf) {
                Ok(()) => {
                    self.pos += 1;
                    self.value = (self.value << 8) | u64::from(buf[0]);
                    self.n += 8;
                }
                Err(e) => {
                    self.err = Some(e);
                    return 0;
                }
            }
        }
        let value = (self.value >> (self.n - n)) as u32;
        self.n -= n;
        self.value &= (1u64 << self.n) - 1;
        value
    }

    /// Read a single bit interpreted as a boolean flag.
    pub fn read_flag(&mut self) -> bool {
        self.read(1) == 1
    }

    /// Read an unsigned Exp-Golomb coded value (ue(v) in the H.264 spec).
    /// If an error has occurred or the code is malformed, 0 is returned.
    pub fn read_ue(&mut self) -> u32 {
        let mut leading_zeros = 0u32;
        loop {
            if self.err.is_some() {
                return 0;
            }
            if self.read(1) == 1 {
                break;
            }
            leading_zeros += 1;
            if leading_zeros > 31 {
                self.err = Some(io::Error::other("exp-golomb code longer than 32 bits"));
                return 0;
            }
        }
        if leading_zeros == 0 {
            return 0;
        }
        let rest = self.read(leading_zeros);
        (1u32 << leading_zeros) - 1 + rest
    }

    /// Number of bytes read from the underlying reader.
    pub fn nr_bytes_read(&self) -> i64 {
        self.pos + 1
    }
}

#[cfg(test)]
mod tests {
    use super::BitReader;
    use std::io::Cursor;

    #[test]
    fn test_read_bits() {
        let data = [0xffu8, 0x0f];
        let mut r = BitReader::new(Cursor::new(&data));
        assert_eq!(r.read(2), 3); // 11
        assert_eq!(r.read(3), 7); // 111
        assert_eq!(r.read(5), 28); // 11100
        assert_eq!(r.read(3), 1); // 001
        assert_eq!(r.read(3), 7); // 111
        assert!(r.acc_error().is_none());
    }

    #[test]
    fn test_read_ue() {
        // 1 | 010 | 011 | 00100 -> 0, 1, 2, 3
        let data = [0b1_010_011_0u8, 0b0100_0000];
        let mut r = BitReader::new(Cursor::new(&data));
        assert_eq!(r.read_ue(), 0);
        assert_eq!(r.read_ue(), 1);
        assert_eq!(r.read_ue(), 2);
        assert_eq!(r.read_ue(), 3);
        assert!(r.acc_error().is_none());
    }

    #[test]
    fn test_read_flag() {
        let data = [0b1010_0000u8];
        let mut r = BitReader::new(Cursor::new(&data));
        assert!(r.read_flag());
        assert!(!r.read_flag());
        assert!(r.read_flag());
        assert!(!r.read_flag());
    }
}
