use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// One value a property can take, with optional description and URL.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Value {
    pub property_index: i16,
    pub name_offset: i32,
    pub description_offset: i32,
    pub url_offset: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ValueFactory;

impl ValueFactory {
    const RECORD_LENGTH: usize = 14;
}

impl EntityFactory for ValueFactory {
    type Entity = Value;

    fn create(&self, _key: i32, reader: &mut BinaryReader) -> Result<Value, DatasetError> {
        Ok(Value {
            property_index: reader.read_i16()?,
            name_offset: reader.read_i32()?,
            description_offset: reader.read_i32()?,
            url_offset: reader.read_i32()?,
        })
    }

    fn stride(&self) -> Option<usize> {
        Some(Self::RECORD_LENGTH)
    }

    fn length_of(&self, _entity: &Value) -> Option<usize> {
        None
    }
}
