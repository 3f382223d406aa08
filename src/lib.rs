//! Library for reading stream-mode device-detection datasets.
//!
//! A dataset file is a sequence of typed sections behind a global header.
//! Small tables (components, maps, properties, root nodes, profile offsets)
//! are materialised eagerly; the large sections (strings, values, profiles,
//! signatures, nodes) are decoded lazily on access through a pool of shared
//! readers, with an optional cache per entity kind.

pub mod cache;
pub mod entity;
pub mod error;
pub mod header;
mod loader;
pub mod read;
pub mod version;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use itertools::Itertools;
use tracing::{debug, warn};

use cache::{CacheConfig, Caches};
use entity::{
    AsciiString, AsciiStringFactory, Component, ComponentFactory, EntityFactory,
    IntegerFactory, Map, MapFactory, Node, NodeFactory, Profile, ProfileFactory,
    ProfileOffset, ProfileOffsetFactory, PropertyFactory, RankedSignatures, RootNode,
    RootNodeFactory, Signature, SignatureFactory, SignatureNodes, ValueFactory,
};
use error::DatasetError;
use header::{Date, DatasetHeader, SectionHeader};
pub use loader::{Entities, EntityLoader, LazyList, MemoryList, PropertiesList};
use read::{BinaryReader, ReaderPool, Source};
use version::DatasetVersion;

/// The in-memory handle over a parsed detection data file.
///
/// A `Dataset` serves many concurrent readers once constructed: the eager
/// lists are immutable, lazy loads synchronise only on the reader pool and
/// their caches. Closing (or dropping) the dataset drains the pool and, for
/// datasets built from a temporary file, deletes the backing file.
pub struct Dataset {
    header: DatasetHeader,
    pool: Arc<ReaderPool>,
    strings: LazyList<AsciiStringFactory>,
    components: MemoryList<Component>,
    maps: MemoryList<Map>,
    properties: PropertiesList,
    values: LazyList<ValueFactory>,
    profiles: LazyList<ProfileFactory>,
    signatures: LazyList<SignatureFactory>,
    signature_node_offsets: Option<LazyList<IntegerFactory>>,
    node_ranked_signature_indexes: Option<LazyList<IntegerFactory>>,
    ranked_signature_indexes: LazyList<IntegerFactory>,
    nodes: LazyList<NodeFactory>,
    root_nodes: MemoryList<RootNode>,
    profile_offsets: MemoryList<ProfileOffset>,
    profile_id_offsets: HashMap<i32, i32>,
    last_modified: Option<SystemTime>,
    temp_path: Option<PathBuf>,
    closed: AtomicBool,
}

impl Dataset {
    /// Opens a dataset over an in-memory buffer with the default LRU
    /// caches.
    pub fn from_buffer(data: impl Into<Arc<[u8]>>) -> Result<Self, DatasetError> {
        DatasetBuilder::new().default_caches().build_buffer(data)
    }

    /// Opens a dataset over a file with the default LRU caches.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        DatasetBuilder::new().default_caches().build_file(path)
    }

    fn load_for_streaming(
        source: Source,
        caches: Caches,
        last_modified: Option<SystemTime>,
        temp_path: Option<PathBuf>,
    ) -> Result<Self, DatasetError> {
        let pool = Arc::new(ReaderPool::new(source));
        let mut guard = pool.acquire()?;
        let reader: &mut BinaryReader = &mut guard;
        reader.set_position(0)?;

        let header = DatasetHeader::read_from(reader)?;
        let version = header.version();
        debug!(%version, published = %header.published, "parsed dataset header");

        let read_section = |name, reader: &mut BinaryReader| -> Result<SectionHeader, DatasetError> {
            let section = SectionHeader::read_from(name, reader)?;
            reader.set_position(section.end())?;
            Ok(section)
        };

        let strings_header = read_section("strings", reader)?;
        let components_header = read_section("components", reader)?;
        let maps_header = read_section("maps", reader)?;
        let properties_header = read_section("properties", reader)?;
        let values_header = read_section("values", reader)?;
        let profiles_header = read_section("profiles", reader)?;
        let signatures_header = read_section("signatures", reader)?;

        let (signature_node_offsets_header, node_ranked_signature_indexes_header) =
            if version >= DatasetVersion::V32 {
                (
                    Some(read_section("signature node offsets", reader)?),
                    Some(read_section("node ranked signature indexes", reader)?),
                )
            } else {
                (None, None)
            };

        let ranked_signature_indexes_header =
            read_section("ranked signature indexes", reader)?;
        let nodes_header = read_section("nodes", reader)?;
        let root_nodes_header = read_section("root nodes", reader)?;
        let profile_offsets_header = read_section("profile offsets", reader)?;

        let strings = lazy_list(strings_header, &pool, AsciiStringFactory, caches.strings)?;
        let values = lazy_list(values_header, &pool, ValueFactory, caches.values)?;
        let profiles = lazy_list(profiles_header, &pool, ProfileFactory, caches.profiles)?;
        let signatures = lazy_list(
            signatures_header,
            &pool,
            SignatureFactory::new(
                version,
                header.signature_profiles_count,
                header.signature_nodes_count,
            ),
            caches.signatures,
        )?;
        let signature_node_offsets = signature_node_offsets_header
            .map(|header| lazy_list(header, &pool, IntegerFactory, CacheConfig::None))
            .transpose()?;
        let node_ranked_signature_indexes = node_ranked_signature_indexes_header
            .map(|header| lazy_list(header, &pool, IntegerFactory, CacheConfig::None))
            .transpose()?;
        let ranked_signature_indexes = lazy_list(
            ranked_signature_indexes_header,
            &pool,
            IntegerFactory,
            CacheConfig::None,
        )?;
        let nodes = lazy_list(nodes_header, &pool, NodeFactory::new(version), caches.nodes)?;

        // Read into memory the small lists which are frequently accessed.
        let component_factory = ComponentFactory::new(version);
        let components =
            MemoryList::read_from(components_header, reader, &component_factory)?;
        let maps = MemoryList::read_from(maps_header, reader, &MapFactory)?;
        let properties = PropertiesList::new(
            MemoryList::read_from(properties_header, reader, &PropertyFactory)?,
            &strings,
        )?;
        let root_nodes =
            MemoryList::read_from(root_nodes_header, reader, &RootNodeFactory)?;
        let profile_offsets =
            MemoryList::read_from(profile_offsets_header, reader, &ProfileOffsetFactory)?;

        let profile_id_offsets = profile_offsets
            .iter()
            .map(|entry| (entry.profile_id, entry.offset))
            .collect();

        debug!(
            components = components.len(),
            properties = properties.len(),
            signatures = signatures.count(),
            nodes = nodes.count(),
            "dataset ready"
        );

        drop(guard);

        Ok(Self {
            header,
            pool,
            strings,
            components,
            maps,
            properties,
            values,
            profiles,
            signatures,
            signature_node_offsets,
            node_ranked_signature_indexes,
            ranked_signature_indexes,
            nodes,
            root_nodes,
            profile_offsets,
            profile_id_offsets,
            last_modified,
            temp_path,
            closed: AtomicBool::new(false),
        })
    }

    /// Schema version of the backing file.
    #[must_use]
    pub fn version(&self) -> DatasetVersion {
        self.header.version()
    }

    /// The global file header.
    #[must_use]
    pub fn header(&self) -> &DatasetHeader {
        &self.header
    }

    /// Date the dataset was published.
    #[must_use]
    pub fn published(&self) -> Date {
        self.header.published
    }

    /// Date an updated dataset is expected to be available.
    #[must_use]
    pub fn next_update(&self) -> Date {
        self.header.next_update
    }

    /// Modification time of the backing file, or the override supplied at
    /// build time. `None` for buffer datasets without an override.
    #[must_use]
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// The dataset's name string, e.g. `Lite`.
    pub fn name(&self) -> Result<Arc<AsciiString>, DatasetError> {
        self.strings.get(self.header.name_offset)
    }

    /// The dataset's format string, e.g. `PatternV32`.
    pub fn format(&self) -> Result<Arc<AsciiString>, DatasetError> {
        self.strings.get(self.header.format_offset)
    }

    pub fn copyright(&self) -> Result<Arc<AsciiString>, DatasetError> {
        self.strings.get(self.header.copyright_offset)
    }

    /// The strings section, keyed by byte offset.
    #[must_use]
    pub fn strings(&self) -> &LazyList<AsciiStringFactory> {
        &self.strings
    }

    #[must_use]
    pub fn components(&self) -> &MemoryList<Component> {
        &self.components
    }

    #[must_use]
    pub fn maps(&self) -> &MemoryList<Map> {
        &self.maps
    }

    #[must_use]
    pub fn properties(&self) -> &PropertiesList {
        &self.properties
    }

    /// The values section, keyed by ordinal.
    #[must_use]
    pub fn values(&self) -> &LazyList<ValueFactory> {
        &self.values
    }

    /// The profiles section, keyed by byte offset.
    #[must_use]
    pub fn profiles(&self) -> &LazyList<ProfileFactory> {
        &self.profiles
    }

    /// The signatures section, keyed by ordinal.
    #[must_use]
    pub fn signatures(&self) -> &LazyList<SignatureFactory> {
        &self.signatures
    }

    /// The nodes section, keyed by byte offset (as produced by other nodes'
    /// child references).
    #[must_use]
    pub fn nodes(&self) -> &LazyList<NodeFactory> {
        &self.nodes
    }

    #[must_use]
    pub fn root_nodes(&self) -> &MemoryList<RootNode> {
        &self.root_nodes
    }

    #[must_use]
    pub fn profile_offsets(&self) -> &MemoryList<ProfileOffset> {
        &self.profile_offsets
    }

    /// The `ranked_signature_indexes` packed integer section.
    #[must_use]
    pub fn ranked_signature_indexes(&self) -> &LazyList<IntegerFactory> {
        &self.ranked_signature_indexes
    }

    /// The `signature_node_offsets` packed integer section; V32 only.
    #[must_use]
    pub fn signature_node_offsets(&self) -> Option<&LazyList<IntegerFactory>> {
        self.signature_node_offsets.as_ref()
    }

    /// The `node_ranked_signature_indexes` packed integer section; V32
    /// only.
    #[must_use]
    pub fn node_ranked_signature_indexes(&self) -> Option<&LazyList<IntegerFactory>> {
        self.node_ranked_signature_indexes.as_ref()
    }

    /// Resolves the trie root for a component by root-node ordinal.
    pub fn root_node(&self, index: i32) -> Result<Arc<Node>, DatasetError> {
        let root = self.root_nodes.get(index)?;
        self.nodes.get(root.node_offset)
    }

    /// Looks a profile up by its published id.
    pub fn profile_by_id(&self, profile_id: i32) -> Result<Option<Arc<Profile>>, DatasetError> {
        match self.profile_id_offsets.get(&profile_id) {
            Some(&offset) => self.profiles.get(offset).map(Some),
            None => Ok(None),
        }
    }

    /// The dotted device id of a signature: the ids of its profiles joined
    /// with `.`.
    pub fn device_id(&self, signature: &Signature) -> Result<String, DatasetError> {
        let ids = signature
            .used_profile_offsets()
            .map(|offset| {
                self.profiles
                    .get(offset)
                    .map(|profile| profile.profile_id)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids.iter().join("."))
    }

    /// The node offsets a signature was built from, resolving through the
    /// `signature_node_offsets` section for V32 records.
    pub fn signature_node_offsets_of(
        &self,
        signature: &Signature,
    ) -> Result<Vec<i32>, DatasetError> {
        match &signature.nodes {
            SignatureNodes::Offsets(offsets) => {
                Ok(offsets.iter().copied().filter(|&offset| offset >= 0).collect())
            }
            SignatureNodes::Indexed { first_index, count } => {
                let Some(list) = &self.signature_node_offsets else {
                    return Err(DatasetError::Malformed {
                        section: "signatures",
                        offset: 0,
                        detail: "indexed node offsets without a signature node offsets section",
                    });
                };

                (*first_index..*first_index + i32::from(*count))
                    .map(|index| list.get(index).map(|offset| *offset))
                    .collect()
            }
        }
    }

    /// The ranked signature indexes of a node, resolving through the
    /// `node_ranked_signature_indexes` section for V32 records.
    pub fn node_ranked_signatures_of(&self, node: &Node) -> Result<Vec<i32>, DatasetError> {
        match &node.ranked_signatures {
            RankedSignatures::Inline(indexes) => Ok(indexes.clone()),
            RankedSignatures::Indexed { first_index, count } => {
                if *count == 0 {
                    return Ok(Vec::new());
                }

                let Some(list) = &self.node_ranked_signature_indexes else {
                    return Err(DatasetError::Malformed {
                        section: "nodes",
                        offset: 0,
                        detail: "indexed ranked signatures without a node ranked signature indexes section",
                    });
                };

                (*first_index..*first_index + i32::from(*count))
                    .map(|index| list.get(index).map(|value| *value))
                    .collect()
            }
        }
    }

    /// Number of readers ever opened against the source.
    #[must_use]
    pub fn readers_created(&self) -> u64 {
        self.pool.readers_created()
    }

    /// Number of readers at rest in the pool; equals
    /// [`readers_created`](Dataset::readers_created) once the dataset is
    /// closed and every in-flight load has finished.
    #[must_use]
    pub fn readers_queued(&self) -> u64 {
        self.pool.readers_queued()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Idempotent teardown: drains the reader pool, after which every load
    /// fails with [`DatasetError::Closed`], and deletes the backing file if
    /// the dataset was built from a temporary file.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.pool.close();

        if let Some(path) = &self.temp_path {
            if let Err(error) = fs::remove_file(path) {
                warn!(path = %path.display(), %error, "failed to delete temporary dataset file");
            } else {
                debug!(path = %path.display(), "deleted temporary dataset file");
            }
        }
    }
}

impl Drop for Dataset {
    fn drop(&mut self) {
        self.close();
    }
}

fn lazy_list<F: EntityFactory>(
    header: SectionHeader,
    pool: &Arc<ReaderPool>,
    factory: F,
    config: CacheConfig<F::Entity>,
) -> Result<LazyList<F>, DatasetError> {
    EntityLoader::new(header, Arc::clone(pool), factory, config).map(LazyList::new)
}

/// Configures and opens a [`Dataset`].
#[derive(Clone, Debug, Default)]
pub struct DatasetBuilder {
    caches: Caches,
    last_modified: Option<SystemTime>,
    temporary: bool,
}

impl DatasetBuilder {
    /// A builder with no caches configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `caches` as the per-entity-kind cache selection.
    #[must_use]
    pub fn caches(mut self, caches: Caches) -> Self {
        self.caches = caches;
        self
    }

    /// LRU caches of the default capacities for every cacheable kind.
    #[must_use]
    pub fn default_caches(self) -> Self {
        self.caches(Caches::default_lru())
    }

    /// Overrides the last-modified time reported by the dataset.
    #[must_use]
    pub fn last_modified(mut self, time: SystemTime) -> Self {
        self.last_modified = Some(time);
        self
    }

    /// Marks the backing file as temporary: it is deleted when the dataset
    /// is closed. Ignored for buffer datasets.
    #[must_use]
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Opens a dataset over an in-memory buffer, zero-copy.
    pub fn build_buffer(self, data: impl Into<Arc<[u8]>>) -> Result<Dataset, DatasetError> {
        Dataset::load_for_streaming(
            Source::from_buffer(data.into()),
            self.caches,
            self.last_modified,
            None,
        )
    }

    /// Opens a dataset over a file.
    pub fn build_file(self, path: impl AsRef<Path>) -> Result<Dataset, DatasetError> {
        let path = path.as_ref();
        let source = Source::from_file(path)?;

        let last_modified = match self.last_modified {
            Some(time) => Some(time),
            None => path.metadata()?.modified().ok(),
        };

        Dataset::load_for_streaming(
            source,
            self.caches,
            last_modified,
            self.temporary.then(|| path.to_path_buf()),
        )
    }
}
