//! On-disk layout: fixed-record packers and format constants.
//!
//! A Scavenger file is `header ‖ payload ‖ padding ‖ index ‖ count`:
//!
//! | Region  | Size   | Contents                                            |
//! |---------|--------|-----------------------------------------------------|
//! | Header  | 16 B   | primary(4) ‖ secondary(6) ‖ total lo(u32) ‖ hi(u16) |
//! | Payload | var    | object byte ranges, each at least 1 B               |
//! | Padding | 0–3 B  | pads the index to a 4-byte boundary                 |
//! | Index   | 12·N B | one record per object, in index order               |
//! | Count   | 6 B    | object count lo(u32) ‖ hi(u16)                      |
//!
//! All integers are big-endian and unsigned. An index record interleaves
//! its halves — `off_lo(u32) ‖ sz_lo(u32) ‖ off_hi(u16) ‖ sz_hi(u16)` —
//! so both low halves precede both high halves.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::num48::{join_48, split_48};
use crate::signature::{Primary, Secondary};

/// Fixed header length.
pub const HEADER_SIZE: u64 = 16;
/// Byte offset of the split total-size field within the header.
pub const TOTAL_SIZE_OFFSET: u64 = 10;
/// Length of one index record.
pub const RECORD_SIZE: u64 = 12;
/// Length of the trailing object-count field.
pub const COUNT_SIZE: u64 = 6;
/// Smallest well-formed file: header plus count trailer, zero objects.
pub const MIN_ARCHIVE_SIZE: u64 = HEADER_SIZE + COUNT_SIZE;
/// Byte value used for alignment padding.
pub const PAD_BYTE: u8 = 0x20;

/// The 16-byte file header.
#[derive(Debug, Clone)]
pub struct Header {
    pub primary: Primary,
    pub secondary: Secondary,
    pub total_size: u64,
}

impl Header {
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let (low, high) = split_48(self.total_size)?;
        writer.write_all(self.primary.as_bytes())?;
        writer.write_all(self.secondary.as_bytes())?;
        writer.write_u32::<BigEndian>(low)?;
        writer.write_u16::<BigEndian>(high)?;
        Ok(())
    }

    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut primary = [0u8; 4];
        reader.read_exact(&mut primary)?;
        let mut secondary = [0u8; 6];
        reader.read_exact(&mut secondary)?;
        let low = reader.read_u32::<BigEndian>()?;
        let high = reader.read_u16::<BigEndian>()?;
        Ok(Self {
            primary: Primary::from_bytes(primary),
            secondary: Secondary::from_bytes(secondary),
            total_size: join_48(low, high),
        })
    }
}

/// One 12-byte index record locating an object inside the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRecord {
    pub offset: u64,
    pub size: u64,
}

impl IndexRecord {
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let (off_lo, off_hi) = split_48(self.offset)?;
        let (sz_lo, sz_hi) = split_48(self.size)?;
        writer.write_u32::<BigEndian>(off_lo)?;
        writer.write_u32::<BigEndian>(sz_lo)?;
        writer.write_u16::<BigEndian>(off_hi)?;
        writer.write_u16::<BigEndian>(sz_hi)?;
        Ok(())
    }

    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let off_lo = reader.read_u32::<BigEndian>()?;
        let sz_lo = reader.read_u32::<BigEndian>()?;
        let off_hi = reader.read_u16::<BigEndian>()?;
        let sz_hi = reader.read_u16::<BigEndian>()?;
        Ok(Self {
            offset: join_48(off_lo, off_hi),
            size: join_48(sz_lo, sz_hi),
        })
    }

    /// Check this record against the containing file's length.
    ///
    /// Records may overlap the header, the index, or each other; the only
    /// requirements are a non-zero size and a byte range inside the file.
    pub fn validate(&self, file_size: u64) -> Result<()> {
        if self.size == 0 {
            return Err(Error::Malformed(format!(
                "index record at offset {} has size 0", self.offset
            )));
        }
        if self.offset >= file_size {
            return Err(Error::Malformed(format!(
                "object offset {} lies beyond the file ({} bytes)",
                self.offset, file_size
            )));
        }
        if self.size > file_size - self.offset {
            return Err(Error::Malformed(format!(
                "object range {}+{} exceeds the file ({} bytes)",
                self.offset, self.size, file_size
            )));
        }
        Ok(())
    }
}

/// Write the 6-byte count trailer.
pub fn write_count<W: Write>(mut writer: W, count: u64) -> Result<()> {
    let (low, high) = split_48(count)?;
    writer.write_u32::<BigEndian>(low)?;
    writer.write_u16::<BigEndian>(high)?;
    Ok(())
}

/// Read the 6-byte count trailer.
pub fn read_count<R: Read>(mut reader: R) -> Result<u64> {
    let low = reader.read_u32::<BigEndian>()?;
    let high = reader.read_u16::<BigEndian>()?;
    Ok(join_48(low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = Header {
            primary: Primary::parse("01020304").unwrap(),
            secondary: Secondary::parse("exampl").unwrap(),
            total_size: 0x1234_5678_9ABC,
        };
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE as usize);
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
        assert_eq!(&buf[4..10], b"exampl");
        // Split total: low half first, then high half, both big-endian.
        assert_eq!(&buf[10..14], &[0x56, 0x78, 0x9A, 0xBC]);
        assert_eq!(&buf[14..16], &[0x12, 0x34]);

        let parsed = Header::read(&buf[..]).unwrap();
        assert_eq!(parsed.primary.to_hex(), "01020304");
        assert_eq!(parsed.secondary.to_hex(), "6578616d706c");
        assert_eq!(parsed.total_size, 0x1234_5678_9ABC);
    }

    #[test]
    fn record_interleaves_low_halves_before_high_halves() {
        let rec = IndexRecord { offset: 0x0001_0000_0010, size: 0x0002_0000_0020 };
        let mut buf = Vec::new();
        rec.write(&mut buf).unwrap();
        assert_eq!(
            buf,
            [
                0x00, 0x00, 0x00, 0x10, // offset low
                0x00, 0x00, 0x00, 0x20, // size low
                0x00, 0x01, // offset high
                0x00, 0x02, // size high
            ]
        );
        assert_eq!(IndexRecord::read(&buf[..]).unwrap(), rec);
    }

    #[test]
    fn record_validation() {
        assert!(IndexRecord { offset: 16, size: 1 }.validate(38).is_ok());
        // Overlap with the trailer is legal.
        assert!(IndexRecord { offset: 0, size: 38 }.validate(38).is_ok());
        assert!(matches!(
            IndexRecord { offset: 16, size: 0 }.validate(38),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            IndexRecord { offset: 38, size: 1 }.validate(38),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            IndexRecord { offset: 30, size: 9 }.validate(38),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn count_trailer_round_trip() {
        let mut buf = Vec::new();
        write_count(&mut buf, 3).unwrap();
        assert_eq!(buf, [0, 0, 0, 3, 0, 0]);
        assert_eq!(read_count(&buf[..]).unwrap(), 3);
    }
}
