use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// Factory for the packed integer sections: `ranked_signature_indexes` and,
/// in V32 files, `signature_node_offsets` and
/// `node_ranked_signature_indexes`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegerFactory;

impl IntegerFactory {
    const RECORD_LENGTH: usize = 4;
}

impl EntityFactory for IntegerFactory {
    type Entity = i32;

    fn create(&self, _key: i32, reader: &mut BinaryReader) -> Result<i32, DatasetError> {
        Ok(reader.read_i32()?)
    }

    fn stride(&self) -> Option<usize> {
        Some(Self::RECORD_LENGTH)
    }

    fn length_of(&self, _entity: &i32) -> Option<usize> {
        None
    }
}
