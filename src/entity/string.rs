use std::fmt;

use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// A length-prefixed ASCII string from the strings section.
///
/// Strings are referenced from other entities by their byte offset within
/// the section. The on-disk record is an `i16` length, the string bytes,
/// and a NUL terminator; ASCII in practice, decoded here as UTF-8.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AsciiString {
    offset: i32,
    bytes: Box<[u8]>,
}

impl AsciiString {
    /// Byte offset of this string within the strings section.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The decoded string, or an empty string slice if the bytes are not
    /// valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Byte length of the record on disk: the two-byte length prefix, the
    /// string bytes and the NUL terminator.
    #[must_use]
    pub fn record_length(&self) -> usize {
        self.bytes.len() + 3
    }
}

impl fmt::Display for AsciiString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AsciiStringFactory;

impl EntityFactory for AsciiStringFactory {
    type Entity = AsciiString;

    fn create(
        &self,
        key: i32,
        reader: &mut BinaryReader,
    ) -> Result<AsciiString, DatasetError> {
        let record_offset = reader.position();

        let length = reader.read_i16()?;
        if length < 0 {
            return Err(DatasetError::Malformed {
                section: "strings",
                offset: record_offset,
                detail: "negative string length",
            });
        }

        let bytes = reader.read_bytes(length as usize)?;
        if reader.read_u8()? != 0 {
            return Err(DatasetError::Malformed {
                section: "strings",
                offset: record_offset,
                detail: "missing string terminator",
            });
        }

        Ok(AsciiString {
            offset: key,
            bytes: bytes.into_boxed_slice(),
        })
    }

    fn stride(&self) -> Option<usize> {
        None
    }

    fn length_of(&self, entity: &AsciiString) -> Option<usize> {
        Some(entity.record_length())
    }
}
