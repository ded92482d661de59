//! Random-access archive decoder.
//!
//! `open` validates the global structure once — length, alignment, header
//! total-size, count trailer — and keeps the file handle for the lifetime
//! of the instance. Index records are read and validated lazily on each
//! object access: a record with size 0 (or a range outside the file) is
//! accepted at open time and only rejected when that object is touched.
//! Records may overlap anything, including the header and the index
//! itself; the decoder only ever serves the byte range a record names.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};
use crate::layout::{read_count, Header, IndexRecord, COUNT_SIZE, HEADER_SIZE, MIN_ARCHIVE_SIZE, RECORD_SIZE};
use crate::signature::{Primary, Secondary};

pub struct Decoder {
    file:         File,
    size:         u64,
    primary:      Primary,
    secondary:    Secondary,
    count:        u64,
    index_offset: u64,
}

impl Decoder {
    /// Open an archive and validate its global structure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        if size < MIN_ARCHIVE_SIZE {
            return Err(Error::FileTooSmall { size });
        }
        // header(16) + padding-aligned index + count(6) always lands on 2 mod 4
        if size % 4 != 2 {
            return Err(Error::FileNotAligned { size });
        }

        let header = Header::read(&mut file)?;
        if header.total_size != size {
            return Err(Error::SizeMismatch { declared: header.total_size, actual: size });
        }

        file.seek(SeekFrom::End(-(COUNT_SIZE as i64)))?;
        let count = read_count(&mut file)?;
        let capacity = (size - MIN_ARCHIVE_SIZE) / RECORD_SIZE;
        if count > capacity {
            return Err(Error::Malformed(format!(
                "object count {count} exceeds index capacity {capacity}"
            )));
        }
        let index_offset = size - COUNT_SIZE - count * RECORD_SIZE;
        if index_offset < HEADER_SIZE {
            return Err(Error::Malformed(format!(
                "index offset {index_offset} overlaps the header"
            )));
        }

        tracing::debug!(size, count, "opened archive");
        Ok(Self {
            file,
            size,
            primary: header.primary,
            secondary: header.secondary,
            count,
            index_offset,
        })
    }

    // ── Metadata ─────────────────────────────────────────────────────────────

    /// Primary signature as 8 lowercase hex digits.
    pub fn primary(&self) -> String {
        self.primary.to_hex()
    }

    /// Secondary signature as 12 lowercase hex digits.
    pub fn secondary(&self) -> String {
        self.secondary.to_hex()
    }

    /// Secondary signature as text, when all six bytes are printable ASCII.
    pub fn secondary_ascii(&self) -> Option<String> {
        self.secondary.as_ascii()
    }

    /// Compare both signatures against caller-supplied values.
    ///
    /// `primary` is 8 hex digits; `secondary` is 12 hex digits or 6
    /// printable ASCII bytes. Hex is case-insensitive.
    pub fn matches(&self, primary: &str, secondary: &str) -> Result<bool> {
        let p = Primary::parse(primary)?;
        let s = Secondary::parse(secondary)?;
        Ok(p == self.primary && s == self.secondary)
    }

    /// Number of objects in the archive.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Total file length in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    // ── Object access ────────────────────────────────────────────────────────

    /// Size in bytes of object `index`.
    pub fn measure(&mut self, index: u64) -> Result<u64> {
        Ok(self.record(index)?.size)
    }

    /// Read `len` bytes of object `index` starting at `offset` within it.
    pub fn read(&mut self, index: u64, offset: u64, len: u64) -> Result<Vec<u8>> {
        let record = self.record(index)?;
        if offset >= record.size {
            return Err(Error::OutOfRange(format!(
                "offset {offset} is past the end of object {index} ({} bytes)",
                record.size
            )));
        }
        if len == 0 || len > record.size - offset {
            return Err(Error::OutOfRange(format!(
                "length {len} at offset {offset} is outside object {index} ({} bytes)",
                record.size
            )));
        }
        self.read_range(record.offset + offset, len)
    }

    /// Read the complete contents of object `index`.
    pub fn read_full(&mut self, index: u64) -> Result<Vec<u8>> {
        let record = self.record(index)?;
        self.read_range(record.offset, record.size)
    }

    /// Like [`read`](Self::read), decoding the bytes as UTF-8.
    pub fn read_str(&mut self, index: u64, offset: u64, len: u64) -> Result<String> {
        Ok(String::from_utf8(self.read(index, offset, len)?)?)
    }

    /// Like [`read_full`](Self::read_full), decoding the bytes as UTF-8.
    pub fn read_full_str(&mut self, index: u64) -> Result<String> {
        Ok(String::from_utf8(self.read_full(index)?)?)
    }

    /// A read cursor positioned at the start of object `index`, bounded to
    /// its size.
    pub fn object_reader(&mut self, index: u64) -> Result<ObjectReader<'_>> {
        let record = self.record(index)?;
        self.file.seek(SeekFrom::Start(record.offset))?;
        Ok(ObjectReader { file: &mut self.file, remaining: record.size })
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Fetch and validate the index record for object `index`.
    fn record(&mut self, index: u64) -> Result<IndexRecord> {
        if index >= self.count {
            return Err(Error::OutOfRange(format!(
                "object index {index} out of range (count {})", self.count
            )));
        }
        self.file.seek(SeekFrom::Start(self.index_offset + index * RECORD_SIZE))?;
        let record = IndexRecord::read(&mut self.file)?;
        record.validate(self.size)?;
        Ok(record)
    }

    fn read_range(&mut self, pos: u64, len: u64) -> Result<Vec<u8>> {
        let len = usize::try_from(len).map_err(|_| {
            Error::OutOfRange(format!("{len} bytes do not fit in this host's memory"))
        })?;
        self.file.seek(SeekFrom::Start(pos))?;
        let mut buf = vec![0u8; len];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Bounded read cursor over one object, returned by
/// [`Decoder::object_reader`].
pub struct ObjectReader<'a> {
    file:      &'a mut File,
    remaining: u64,
}

impl ObjectReader<'_> {
    /// Bytes of the object not yet consumed.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Read for ObjectReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let cap = buf.len().min(self.remaining.min(usize::MAX as u64) as usize);
        let n = self.file.read(&mut buf[..cap])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}
