use std::io;

use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
    version::DatasetVersion,
};

/// One of the four parts a device signature is made of: hardware, software,
/// browser or crawler.
///
/// Components are always resident. V32 files additionally list the HTTP
/// header names relevant to the component, so that matching can consume a
/// header bundle rather than just the User-Agent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Component {
    pub component_id: i32,
    pub name_offset: i32,
    pub default_profile_offset: i32,
    /// String offsets of the HTTP header names to consult for this
    /// component. Empty in V31 files, which predate multi-header matching.
    pub http_header_offsets: Vec<i32>,
}

#[derive(Clone, Copy, Debug)]
pub struct ComponentFactory {
    version: DatasetVersion,
}

impl ComponentFactory {
    const BASE_LENGTH: usize = 12;

    pub fn new(version: DatasetVersion) -> Self {
        Self { version }
    }
}

impl EntityFactory for ComponentFactory {
    type Entity = Component;

    fn create(
        &self,
        _key: i32,
        reader: &mut BinaryReader,
    ) -> Result<Component, DatasetError> {
        let mut component = Component {
            component_id: reader.read_i32()?,
            name_offset: reader.read_i32()?,
            default_profile_offset: reader.read_i32()?,
            http_header_offsets: Vec::new(),
        };

        if self.version >= DatasetVersion::V32 {
            let header_count = reader.read_u16()?;
            component.http_header_offsets = (0..header_count)
                .map(|_| reader.read_i32())
                .collect::<io::Result<_>>()?;
        }

        Ok(component)
    }

    fn stride(&self) -> Option<usize> {
        match self.version {
            DatasetVersion::V31 => Some(Self::BASE_LENGTH),
            DatasetVersion::V32 => None,
        }
    }

    fn length_of(&self, entity: &Component) -> Option<usize> {
        match self.version {
            DatasetVersion::V31 => None,
            DatasetVersion::V32 => {
                Some(Self::BASE_LENGTH + 2 + 4 * entity.http_header_offsets.len())
            }
        }
    }
}
