use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
};

/// Entry point into the matching trie, one per component in V32 files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RootNode {
    /// Byte offset of the root's node record in the nodes section.
    pub node_offset: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RootNodeFactory;

impl RootNodeFactory {
    const RECORD_LENGTH: usize = 4;
}

impl EntityFactory for RootNodeFactory {
    type Entity = RootNode;

    fn create(&self, _key: i32, reader: &mut BinaryReader) -> Result<RootNode, DatasetError> {
        Ok(RootNode {
            node_offset: reader.read_i32()?,
        })
    }

    fn stride(&self) -> Option<usize> {
        Some(Self::RECORD_LENGTH)
    }

    fn length_of(&self, _entity: &RootNode) -> Option<usize> {
        None
    }
}
