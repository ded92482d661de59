//! Archive signatures.
//!
//! The primary signature is 4 opaque bytes identifying a format family; the
//! secondary is 6 opaque bytes identifying the schema within it. Callers
//! supply the primary as 8 hex digits and the secondary as either 12 hex
//! digits or 6 printable-ASCII bytes. Hex input is case-insensitive; hex
//! output is always lowercase.

use crate::error::{Error, Result};

/// Inclusive printable-ASCII range accepted for the 6-byte secondary form.
const ASCII_MIN: u8 = 0x20;
const ASCII_MAX: u8 = 0x7E;

/// 4-byte primary signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primary([u8; 4]);

impl Primary {
    /// Parse from exactly 8 hex digits.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != 8 {
            return Err(Error::InvalidSignature(format!(
                "primary must be 8 hex digits, got {:?}", s
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|_| Error::InvalidSignature(format!(
                "primary must be 8 hex digits, got {:?}", s
            )))?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }

    pub fn from_bytes(raw: [u8; 4]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// 8 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// 6-byte secondary signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Secondary([u8; 6]);

impl Secondary {
    /// Parse from 12 hex digits or 6 printable-ASCII bytes.
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.as_bytes();
        if s.len() == 12 {
            let bytes = hex::decode(s)
                .map_err(|_| Error::InvalidSignature(format!(
                    "secondary must be 12 hex digits or 6 printable ASCII bytes, got {:?}", s
                )))?;
            let mut out = [0u8; 6];
            out.copy_from_slice(&bytes);
            Ok(Self(out))
        } else if raw.len() == 6 && raw.iter().all(|&b| (ASCII_MIN..=ASCII_MAX).contains(&b)) {
            let mut out = [0u8; 6];
            out.copy_from_slice(raw);
            Ok(Self(out))
        } else {
            Err(Error::InvalidSignature(format!(
                "secondary must be 12 hex digits or 6 printable ASCII bytes, got {:?}", s
            )))
        }
    }

    pub fn from_bytes(raw: [u8; 6]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// 12 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The six raw bytes as text, when every byte is printable ASCII.
    pub fn as_ascii(&self) -> Option<String> {
        if self.0.iter().all(|&b| (ASCII_MIN..=ASCII_MAX).contains(&b)) {
            Some(self.0.iter().map(|&b| b as char).collect())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hex_round_trip() {
        let p = Primary::parse("01020304").unwrap();
        assert_eq!(p.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(p.to_hex(), "01020304");
    }

    #[test]
    fn primary_hex_is_case_insensitive() {
        let upper = Primary::parse("DEADBEEF").unwrap();
        let lower = Primary::parse("deadbeef").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.to_hex(), "deadbeef");
    }

    #[test]
    fn primary_rejects_bad_lengths_and_digits() {
        assert!(Primary::parse("0102030").is_err());
        assert!(Primary::parse("010203040").is_err());
        assert!(Primary::parse("zzzzzzzz").is_err());
        assert!(Primary::parse("").is_err());
    }

    #[test]
    fn secondary_ascii_form() {
        let s = Secondary::parse("exampl").unwrap();
        assert_eq!(s.to_hex(), "6578616d706c");
        assert_eq!(s.as_ascii().as_deref(), Some("exampl"));
    }

    #[test]
    fn secondary_hex_form() {
        let s = Secondary::parse("6578616D706C").unwrap();
        assert_eq!(s.to_hex(), "6578616d706c");
        assert_eq!(s.as_ascii().as_deref(), Some("exampl"));
    }

    #[test]
    fn secondary_rejects_non_printable_and_bad_lengths() {
        assert!(Secondary::parse("ex\tpl!").is_err());
        assert!(Secondary::parse("exam").is_err());
        assert!(Secondary::parse("examples").is_err());
        // 12 characters that are not hex digits are not a valid ASCII form
        // either (the ASCII form is exactly 6 bytes).
        assert!(Secondary::parse("not-hex-data").is_err());
    }

    #[test]
    fn non_printable_bytes_have_no_ascii_view() {
        let s = Secondary::from_bytes([0x00, 0x61, 0x62, 0x63, 0x64, 0x65]);
        assert_eq!(s.as_ascii(), None);
        assert_eq!(s.to_hex(), "006162636465");
    }
}
