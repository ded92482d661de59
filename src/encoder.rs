//! Streaming archive encoder.
//!
//! ```no_run
//! use scavenger::Encoder;
//!
//! let mut enc = Encoder::new("out.scv", "01020304", "exampl")?;
//! enc.begin_object()?;
//! enc.write(b"Hi")?;
//! enc.complete()?;
//! # Ok::<(), scavenger::Error>(())
//! ```
//!
//! # Two-phase completion
//!
//! Object payloads stream straight into the destination file; the 16-byte
//! header is written up front with a zero total-size placeholder. Index
//! records accumulate in an anonymous scratch file so that archives with
//! millions of objects never hold their index in memory. `complete()` pads
//! the payload to a 4-byte boundary, copies the scratch index into the
//! destination in 16 KiB blocks, appends the object count, then seeks back
//! and patches the header's total-size field.
//!
//! # Failure latching
//!
//! The first failing `begin_object`, `write`, or `complete` moves the
//! encoder to `Errored` and every later call fails fast. Dropping the
//! encoder before a successful `complete` unlinks the destination, so a
//! partial file is never left behind looking like a valid archive.

use byteorder::{BigEndian, WriteBytesExt};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::{
    write_count, Header, IndexRecord, COUNT_SIZE, HEADER_SIZE, PAD_BYTE, RECORD_SIZE,
    TOTAL_SIZE_OFFSET,
};
use crate::num48::{split_48, MAX_ARCHIVE_SIZE};
use crate::signature::{Primary, Secondary};

/// Block size used when copying the scratch index into the destination.
const COPY_CHUNK_SIZE: usize = 16 * 1024;

/// Encoder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Open,
    Completed,
    Errored,
}

pub struct Encoder {
    status:       Status,
    dest:         File,
    path:         PathBuf,
    /// Anonymous temp file accumulating index records, 12 bytes per object.
    scratch:      File,
    /// Objects begun so far, including the currently open one.
    count:        u64,
    /// Payload bytes rolled in from finished objects.
    bytes:        u64,
    /// Payload bytes written into the currently open object.
    local:        u64,
    object_open:  bool,
    object_start: u64,
    last_error:   Option<String>,
}

impl Encoder {
    /// Create the destination file and write the placeholder header.
    ///
    /// `primary` must be 8 hex digits; `secondary` must be 12 hex digits or
    /// 6 printable ASCII bytes.
    pub fn new<P: AsRef<Path>>(path: P, primary: &str, secondary: &str) -> Result<Self> {
        let primary = Primary::parse(primary)?;
        let secondary = Secondary::parse(secondary)?;
        let path = path.as_ref().to_owned();

        let mut dest = File::create(&path)?;
        let header = Header { primary, secondary, total_size: 0 };
        let scratch = header
            .write(&mut dest)
            .and_then(|_| Ok(tempfile::tempfile()?))
            .map_err(|e| {
                // No instance yet, so no drop will run the rollback.
                let _ = std::fs::remove_file(&path);
                e
            })?;

        Ok(Self {
            status:       Status::Open,
            dest,
            path,
            scratch,
            count:        0,
            bytes:        0,
            local:        0,
            object_open:  false,
            object_start: 0,
            last_error:   None,
        })
    }

    // ── Object streaming ─────────────────────────────────────────────────────

    /// Start the next object, finalizing the previous one if any.
    pub fn begin_object(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.object_open {
            self.finish_object()?;
        }
        let projected = (self.count + 1) * RECORD_SIZE + COUNT_SIZE + self.bytes;
        if projected > MAX_ARCHIVE_SIZE {
            return self.fail(Error::FileTooLarge);
        }
        self.object_start = HEADER_SIZE + self.bytes;
        self.object_open = true;
        self.count += 1;
        Ok(())
    }

    /// Append a chunk to the currently open object.
    ///
    /// A zero-length chunk is a no-op. Calling `write` before any
    /// `begin_object` fails with [`Error::NoObjectOpen`] without latching
    /// the encoder.
    pub fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.ensure_open()?;
        if !self.object_open {
            return Err(Error::NoObjectOpen);
        }
        if chunk.is_empty() {
            return Ok(());
        }
        let projected =
            self.count * RECORD_SIZE + COUNT_SIZE + self.bytes + self.local + chunk.len() as u64;
        if projected > MAX_ARCHIVE_SIZE {
            return self.fail(Error::FileTooLarge);
        }
        if let Err(e) = self.dest.write_all(chunk) {
            return self.fail(e.into());
        }
        self.local += chunk.len() as u64;
        Ok(())
    }

    // ── Completion ───────────────────────────────────────────────────────────

    /// Finalize the archive: padding, index, count trailer, header patch.
    pub fn complete(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.object_open {
            self.finish_object()?;
        }
        match self.write_trailer() {
            Ok(total) => {
                self.status = Status::Completed;
                tracing::debug!(objects = self.count, total_size = total, "archive completed");
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn write_trailer(&mut self) -> Result<u64> {
        // (-bytes) mod 4: the header is 16 bytes, so the payload's own
        // remainder decides the padding that aligns the index.
        let padding = ((4 - self.bytes % 4) % 4) as usize;
        let total =
            HEADER_SIZE + self.bytes + padding as u64 + self.count * RECORD_SIZE + COUNT_SIZE;
        if total > MAX_ARCHIVE_SIZE {
            return Err(Error::FileTooLarge);
        }

        self.dest.write_all(&[PAD_BYTE; 3][..padding])?;

        // Stream the scratch index into place.
        self.scratch.seek(SeekFrom::Start(0))?;
        let mut buf = vec![0u8; COPY_CHUNK_SIZE];
        loop {
            let n = self.scratch.read(&mut buf)?;
            if n == 0 {
                break;
            }
            self.dest.write_all(&buf[..n])?;
        }

        write_count(&mut self.dest, self.count)?;

        // Patch the header's split total-size field.
        let (low, high) = split_48(total)?;
        self.dest.seek(SeekFrom::Start(TOTAL_SIZE_OFFSET))?;
        self.dest.write_u32::<BigEndian>(low)?;
        self.dest.write_u16::<BigEndian>(high)?;

        self.dest.flush()?;
        self.dest.sync_all()?;
        Ok(total)
    }

    /// Roll the open object into `bytes` and append its index record.
    fn finish_object(&mut self) -> Result<()> {
        if self.local == 0 {
            return self.fail(Error::EmptyObject);
        }
        let record = IndexRecord { offset: self.object_start, size: self.local };
        if let Err(e) = record.write(&mut self.scratch) {
            return self.fail(e);
        }
        self.bytes += self.local;
        self.local = 0;
        self.object_open = false;
        Ok(())
    }

    // ── State ────────────────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<()> {
        match self.status {
            Status::Open => Ok(()),
            Status::Completed => Err(Error::BadState { state: "completed" }),
            Status::Errored => Err(Error::BadState { state: "errored" }),
        }
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        self.status = Status::Errored;
        self.last_error = Some(err.to_string());
        Err(err)
    }

    /// Objects begun so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a previous failure latched this encoder.
    pub fn is_errored(&self) -> bool {
        self.status == Status::Errored
    }

    /// Message of the failure that latched this encoder, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Drop for Encoder {
    /// Unless `complete` succeeded, the partial destination is unlinked.
    /// The scratch file is anonymous and vanishes when its handle closes.
    fn drop(&mut self) {
        if self.status != Status::Completed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
