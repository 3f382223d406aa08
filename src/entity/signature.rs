use std::io;

use super::EntityFactory;
use crate::{
    error::DatasetError,
    read::{BinaryReader, ReadBytesExt},
    version::DatasetVersion,
};

/// How a signature refers to the nodes it was built from.
///
/// V31 records carry the node offsets inline; V32 records refer into the
/// shared `signature_node_offsets` section, which keeps the record stride
/// independent of how many nodes a signature spans.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignatureNodes {
    Offsets(Vec<i32>),
    Indexed { first_index: i32, count: u8 },
}

/// An ordered set of profile indices representing a matched fingerprint.
///
/// Every signature record reserves one profile slot per component; unused
/// slots hold -1.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    index: i32,
    pub profile_offsets: Vec<i32>,
    pub rank: i32,
    pub nodes: SignatureNodes,
}

impl Signature {
    /// Ordinal of this signature within the signatures section.
    #[must_use]
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Profile offsets with the unused -1 slots filtered out.
    pub fn used_profile_offsets(&self) -> impl Iterator<Item = i32> + '_ {
        self.profile_offsets.iter().copied().filter(|&offset| offset >= 0)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SignatureFactory {
    version: DatasetVersion,
    profiles_per_signature: usize,
    nodes_per_signature: usize,
}

impl SignatureFactory {
    pub fn new(
        version: DatasetVersion,
        profiles_per_signature: i32,
        nodes_per_signature: i32,
    ) -> Self {
        Self {
            version,
            profiles_per_signature: profiles_per_signature.max(0) as usize,
            nodes_per_signature: nodes_per_signature.max(0) as usize,
        }
    }
}

impl EntityFactory for SignatureFactory {
    type Entity = Signature;

    fn create(
        &self,
        key: i32,
        reader: &mut BinaryReader,
    ) -> Result<Signature, DatasetError> {
        let profile_offsets = (0..self.profiles_per_signature)
            .map(|_| reader.read_i32())
            .collect::<io::Result<_>>()?;
        let rank = reader.read_i32()?;

        let nodes = match self.version {
            DatasetVersion::V31 => SignatureNodes::Offsets(
                (0..self.nodes_per_signature)
                    .map(|_| reader.read_i32())
                    .collect::<io::Result<_>>()?,
            ),
            DatasetVersion::V32 => SignatureNodes::Indexed {
                first_index: reader.read_i32()?,
                count: reader.read_u8()?,
            },
        };

        Ok(Signature {
            index: key,
            profile_offsets,
            rank,
            nodes,
        })
    }

    fn stride(&self) -> Option<usize> {
        Some(match self.version {
            DatasetVersion::V31 => 4 * (self.profiles_per_signature + self.nodes_per_signature + 1),
            DatasetVersion::V32 => 4 * self.profiles_per_signature + 9,
        })
    }

    fn length_of(&self, _entity: &Signature) -> Option<usize> {
        None
    }
}
