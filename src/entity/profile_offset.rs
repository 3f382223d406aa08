use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// Maps a profile id to the byte offset of its record in the profiles
/// section, enabling lookup by id.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProfileOffset {
    pub profile_id: i32,
    pub offset: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileOffsetFactory;

impl ProfileOffsetFactory {
    const RECORD_LENGTH: usize = 8;
}

impl EntityFactory for ProfileOffsetFactory {
    type Entity = ProfileOffset;

    fn create(
        &self,
        _key: i32,
        reader: &mut BinaryReader,
    ) -> Result<ProfileOffset, DatasetError> {
        Ok(ProfileOffset {
            profile_id: reader.read_i32()?,
            offset: reader.read_i32()?,
        })
    }

    fn stride(&self) -> Option<usize> {
        Some(Self::RECORD_LENGTH)
    }

    fn length_of(&self, _entity: &ProfileOffset) -> Option<usize> {
        None
    }
}
