use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// A named grouping of property values used by export tooling.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Map {
    pub name_offset: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MapFactory;

impl MapFactory {
    const RECORD_LENGTH: usize = 4;
}

impl EntityFactory for MapFactory {
    type Entity = Map;

    fn create(&self, _key: i32, reader: &mut BinaryReader) -> Result<Map, DatasetError> {
        Ok(Map {
            name_offset: reader.read_i32()?,
        })
    }

    fn stride(&self) -> Option<usize> {
        Some(Self::RECORD_LENGTH)
    }

    fn length_of(&self, _entity: &Map) -> Option<usize> {
        None
    }
}
