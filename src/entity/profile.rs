use std::io;

use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// A collection of property values describing one device component.
///
/// Profiles are variable-length: the record carries the indices of its
/// values in the values section and of the signatures it appears in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    offset: i32,
    pub component_index: u8,
    pub profile_id: i32,
    pub value_indexes: Vec<i32>,
    pub signature_indexes: Vec<i32>,
}

impl Profile {
    /// Byte offset of this profile within the profiles section, the key it
    /// is addressed by.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.offset
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileFactory;

impl ProfileFactory {
    const BASE_LENGTH: usize = 13;
}

impl EntityFactory for ProfileFactory {
    type Entity = Profile;

    fn create(&self, key: i32, reader: &mut BinaryReader) -> Result<Profile, DatasetError> {
        let component_index = reader.read_u8()?;
        let profile_id = reader.read_i32()?;
        let value_count = reader.read_i32()?;
        let signature_count = reader.read_i32()?;

        let record_offset = reader.position();
        if value_count < 0 || signature_count < 0 {
            return Err(DatasetError::Malformed {
                section: "profiles",
                offset: record_offset,
                detail: "negative index count",
            });
        }

        let value_indexes = (0..value_count)
            .map(|_| reader.read_i32())
            .collect::<io::Result<_>>()?;
        let signature_indexes = (0..signature_count)
            .map(|_| reader.read_i32())
            .collect::<io::Result<_>>()?;

        Ok(Profile {
            offset: key,
            component_index,
            profile_id,
            value_indexes,
            signature_indexes,
        })
    }

    fn stride(&self) -> Option<usize> {
        None
    }

    fn length_of(&self, entity: &Profile) -> Option<usize> {
        Some(
            Self::BASE_LENGTH
                + 4 * (entity.value_indexes.len() + entity.signature_indexes.len()),
        )
    }
}
