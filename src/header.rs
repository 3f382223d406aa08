use std::{fmt, io::Read};

use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
    version::DatasetVersion,
};

/// Delimits one typed record region within the data file.
///
/// On disk a section is preceded by a 16-byte preamble holding the record
/// count and the total byte length (the remaining preamble bytes are
/// reserved). The start offset is not stored: it is the cursor position
/// after the preamble, so section starts are cumulative by construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SectionHeader {
    name: &'static str,
    start: u64,
    count: u32,
    length: u32,
}

impl SectionHeader {
    const RESERVED_LEN: usize = 8;

    pub(crate) fn read_from(
        name: &'static str,
        reader: &mut BinaryReader,
    ) -> Result<Self, DatasetError> {
        let count = reader.read_u32()?;
        let length = reader.read_u32()?;
        reader.read_bytes(Self::RESERVED_LEN)?;

        Ok(Self {
            name,
            start: reader.position(),
            count,
            length,
        })
    }

    /// Section name, used for error context.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Absolute byte offset of the first record.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of records in the section.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Total byte length of the section's records.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Absolute byte offset one past the last record.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start + u64::from(self.length)
    }
}

/// A calendar date as stored in the data file header.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Date {
    pub year: i16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    fn read_from(reader: &mut BinaryReader) -> Result<Self, DatasetError> {
        Ok(Self {
            year: reader.read_i16()?,
            month: reader.read_u8()?,
            day: reader.read_u8()?,
        })
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// The global header at the start of every data file.
///
/// Everything here is metadata about the dataset as published: identity
/// tags, publication dates, string offsets for the name/format/copyright
/// strings, and the counts and limits the matcher sizes its working state
/// from. Two of the counts (`signature_profiles_count` and
/// `signature_nodes_count`) also fix the signature record stride.
#[derive(Clone, Debug)]
pub struct DatasetHeader {
    version: DatasetVersion,
    pub tag: [u8; 16],
    /// Present in V32 files only.
    pub export_tag: Option<[u8; 16]>,
    pub copyright_offset: i32,
    pub age_months: i16,
    pub min_user_agent_count: i32,
    pub name_offset: i32,
    pub format_offset: i32,
    pub published: Date,
    pub next_update: Date,
    pub device_combinations: i32,
    pub max_user_agent_length: i16,
    pub min_user_agent_length: i16,
    pub lowest_character: u8,
    pub highest_character: u8,
    pub max_signatures: i32,
    pub signature_profiles_count: i32,
    pub signature_nodes_count: i32,
    pub max_values: i16,
    pub csv_buffer_length: i32,
    pub json_buffer_length: i32,
    pub xml_buffer_length: i32,
    pub max_signatures_closest: i32,
    /// Highest signature rank; zero in V31 files, which do not store it.
    pub maximum_rank: i32,
}

impl DatasetHeader {
    pub(crate) fn read_from(reader: &mut BinaryReader) -> Result<Self, DatasetError> {
        let version = DatasetVersion::read_from(&mut *reader)?;

        let mut tag = [0u8; 16];
        reader.read_exact(&mut tag)?;

        let export_tag = if version >= DatasetVersion::V32 {
            let mut export_tag = [0u8; 16];
            reader.read_exact(&mut export_tag)?;
            Some(export_tag)
        } else {
            None
        };

        Ok(Self {
            version,
            tag,
            export_tag,
            copyright_offset: reader.read_i32()?,
            age_months: reader.read_i16()?,
            min_user_agent_count: reader.read_i32()?,
            name_offset: reader.read_i32()?,
            format_offset: reader.read_i32()?,
            published: Date::read_from(reader)?,
            next_update: Date::read_from(reader)?,
            device_combinations: reader.read_i32()?,
            max_user_agent_length: reader.read_i16()?,
            min_user_agent_length: reader.read_i16()?,
            lowest_character: reader.read_u8()?,
            highest_character: reader.read_u8()?,
            max_signatures: reader.read_i32()?,
            signature_profiles_count: reader.read_i32()?,
            signature_nodes_count: reader.read_i32()?,
            max_values: reader.read_i16()?,
            csv_buffer_length: reader.read_i32()?,
            json_buffer_length: reader.read_i32()?,
            xml_buffer_length: reader.read_i32()?,
            max_signatures_closest: reader.read_i32()?,
            maximum_rank: if version >= DatasetVersion::V32 {
                reader.read_i32()?
            } else {
                0
            },
        })
    }

    #[must_use]
    pub fn version(&self) -> DatasetVersion {
        self.version
    }
}
