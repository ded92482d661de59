use std::io;
use thiserror::Error;

/// Unified error type for all Scavenger operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("File too small: {size} bytes (minimum 22)")]
    FileTooSmall { size: u64 },
    #[error("File length {size} is not congruent to 2 mod 4")]
    FileNotAligned { size: u64 },
    #[error("Malformed archive: {0}")]
    Malformed(String),
    #[error("Header declares {declared} bytes but file is {actual} bytes")]
    SizeMismatch { declared: u64, actual: u64 },
    #[error("Out of range: {0}")]
    OutOfRange(String),
    #[error("Object is empty")]
    EmptyObject,
    #[error("Archive would exceed the 48-bit size limit")]
    FileTooLarge,
    #[error("No object is open")]
    NoObjectOpen,
    #[error("Encoder is {state}")]
    BadState { state: &'static str },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Object bytes are not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
