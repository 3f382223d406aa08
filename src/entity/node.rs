use std::io;

use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
    version::DatasetVersion,
};

/// A child edge of a trie node.
///
/// `value` is a byte offset: into the strings section when `is_string` is
/// set (a multi-character edge label), into the nodes section otherwise.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeIndex {
    pub is_string: bool,
    pub value: i32,
}

/// A numeric child edge, used when walking digit sequences.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeNumericIndex {
    pub value: i16,
    pub node_offset: i32,
}

/// The ranked signatures a node takes part in.
///
/// V31 nodes carry the signature indices inline; V32 nodes refer into the
/// shared `node_ranked_signature_indexes` section, except that a node with
/// no ranked signatures stores nothing at all.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RankedSignatures {
    Inline(Vec<i32>),
    Indexed { first_index: i32, count: u16 },
}

impl RankedSignatures {
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Inline(indexes) => indexes.len(),
            Self::Indexed { count, .. } => usize::from(*count),
        }
    }
}

/// A vertex in the matching trie, addressed by its byte offset within the
/// nodes section (as produced by other nodes' child references).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    offset: i32,
    /// Character position within the User-Agent this node consumes.
    pub position: i16,
    pub next_character_position: i16,
    pub parent_offset: i32,
    /// String offset of the characters this node matched, -1 at the root.
    pub character_string_offset: i32,
    pub children: Vec<NodeIndex>,
    pub numeric_children: Vec<NodeNumericIndex>,
    pub ranked_signatures: RankedSignatures,
}

impl Node {
    /// Byte offset of this node within the nodes section, the key it is
    /// addressed by.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Whether the node carries matched characters, as opposed to being a
    /// component root.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.character_string_offset >= 0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct NodeFactory {
    version: DatasetVersion,
}

impl NodeFactory {
    /// position, next character position, parent offset, character string
    /// offset and the two child counts.
    const PREFIX_LENGTH: usize = 16;
    const CHILD_LENGTH: usize = 5;
    const NUMERIC_CHILD_LENGTH: usize = 6;

    pub fn new(version: DatasetVersion) -> Self {
        Self { version }
    }
}

impl EntityFactory for NodeFactory {
    type Entity = Node;

    fn create(&self, key: i32, reader: &mut BinaryReader) -> Result<Node, DatasetError> {
        let record_offset = reader.position();

        let position = reader.read_i16()?;
        let next_character_position = reader.read_i16()?;
        let parent_offset = reader.read_i32()?;
        let character_string_offset = reader.read_i32()?;
        let child_count = reader.read_i16()?;
        let numeric_child_count = reader.read_i16()?;

        if child_count < 0 || numeric_child_count < 0 {
            return Err(DatasetError::Malformed {
                section: "nodes",
                offset: record_offset,
                detail: "negative child count",
            });
        }

        let ranked_signature_count = match self.version {
            DatasetVersion::V31 => {
                let count = reader.read_i32()?;
                if count < 0 {
                    return Err(DatasetError::Malformed {
                        section: "nodes",
                        offset: record_offset,
                        detail: "negative ranked signature count",
                    });
                }
                count as usize
            }
            DatasetVersion::V32 => usize::from(reader.read_u16()?),
        };

        let children = (0..child_count)
            .map(|_| {
                Ok(NodeIndex {
                    is_string: reader.read_u8()? != 0,
                    value: reader.read_i32()?,
                })
            })
            .collect::<io::Result<_>>()?;

        let numeric_children = (0..numeric_child_count)
            .map(|_| {
                Ok(NodeNumericIndex {
                    value: reader.read_i16()?,
                    node_offset: reader.read_i32()?,
                })
            })
            .collect::<io::Result<_>>()?;

        let ranked_signatures = match self.version {
            DatasetVersion::V31 => RankedSignatures::Inline(
                (0..ranked_signature_count)
                    .map(|_| reader.read_i32())
                    .collect::<io::Result<_>>()?,
            ),
            DatasetVersion::V32 => RankedSignatures::Indexed {
                first_index: if ranked_signature_count > 0 {
                    reader.read_i32()?
                } else {
                    -1
                },
                count: ranked_signature_count as u16,
            },
        };

        Ok(Node {
            offset: key,
            position,
            next_character_position,
            parent_offset,
            character_string_offset,
            children,
            numeric_children,
            ranked_signatures,
        })
    }

    fn stride(&self) -> Option<usize> {
        None
    }

    fn length_of(&self, entity: &Node) -> Option<usize> {
        let mut length = Self::PREFIX_LENGTH
            + Self::CHILD_LENGTH * entity.children.len()
            + Self::NUMERIC_CHILD_LENGTH * entity.numeric_children.len();

        length += match &entity.ranked_signatures {
            RankedSignatures::Inline(indexes) => 4 + 4 * indexes.len(),
            RankedSignatures::Indexed { count, .. } => {
                2 + if *count > 0 { 4 } else { 0 }
            }
        };

        Some(length)
    }
}
