mod component;
mod integer;
mod map;
mod node;
mod profile;
mod profile_offset;
mod property;
mod root_node;
mod signature;
mod string;
mod value;

pub use component::{Component, ComponentFactory};
pub use integer::IntegerFactory;
pub use map::{Map, MapFactory};
pub use node::{Node, NodeFactory, NodeIndex, NodeNumericIndex, RankedSignatures};
pub use profile::{Profile, ProfileFactory};
pub use profile_offset::{ProfileOffset, ProfileOffsetFactory};
pub use property::{Property, PropertyFactory, PropertyType};
pub use root_node::{RootNode, RootNodeFactory};
pub use signature::{Signature, SignatureFactory, SignatureNodes};
pub use string::{AsciiString, AsciiStringFactory};
pub use value::{Value, ValueFactory};

use crate::{error::DatasetError, read::BinaryReader};

/// Decodes one record of a specific kind at the reader's current position.
///
/// Exactly one of [`stride`] and [`length_of`] returns a value for every
/// factory: fixed-length kinds report their record stride up front,
/// variable-length kinds report the byte length a record occupied once it
/// has been decoded.
///
/// [`stride`]: EntityFactory::stride
/// [`length_of`]: EntityFactory::length_of
pub trait EntityFactory {
    type Entity;

    /// Decodes a record. `key` is the record's position within its section:
    /// the ordinal for fixed-length kinds, the byte offset from the section
    /// start for variable-length kinds.
    fn create(
        &self,
        key: i32,
        reader: &mut BinaryReader,
    ) -> Result<Self::Entity, DatasetError>;

    /// Fixed record length in bytes, or `None` for variable-length kinds.
    fn stride(&self) -> Option<usize>;

    /// Byte length a decoded variable-length record occupied, or `None` for
    /// fixed-length kinds.
    fn length_of(&self, entity: &Self::Entity) -> Option<usize>;
}
