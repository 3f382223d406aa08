mod list;

use std::{num::NonZeroUsize, sync::Arc};

pub use list::{Entities, LazyList, MemoryList, PropertiesList};

use crate::{
    cache::{CacheConfig, CacheStats, EntityCache, LruCache},
    entity::EntityFactory,
    error::DatasetError,
    header::SectionHeader,
    read::ReaderPool,
};

/// The cache a loader consults, selected per entity kind at dataset build
/// time. A tagged variant rather than a hierarchy: `load` dispatches on the
/// tag, and the LRU holds no fetch hook back into the loader.
pub(crate) enum CacheStore<E> {
    None,
    Lru(LruCache<E>),
    PutThrough(Arc<dyn EntityCache<E>>),
}

impl<E> CacheStore<E> {
    fn from_config(
        section: &'static str,
        config: CacheConfig<E>,
    ) -> Result<Self, DatasetError> {
        Ok(match config {
            CacheConfig::None => Self::None,
            CacheConfig::Lru(capacity) => {
                let capacity = NonZeroUsize::new(capacity)
                    .ok_or(DatasetError::InvalidCacheKind(section))?;
                Self::Lru(LruCache::new(capacity))
            }
            CacheConfig::Custom(cache) => Self::PutThrough(cache),
        })
    }

    fn get(&self, key: i32) -> Option<Arc<E>> {
        match self {
            Self::None => None,
            Self::Lru(cache) => cache.get(key),
            Self::PutThrough(cache) => cache.get(key),
        }
    }

    fn insert(&self, key: i32, value: &Arc<E>) {
        match self {
            Self::None => {}
            Self::Lru(cache) => cache.put(key, Arc::clone(value)),
            Self::PutThrough(cache) => cache.put(key, Arc::clone(value)),
        }
    }
}

/// Maps an integer key to a fully-decoded entity of one section.
///
/// For fixed-length kinds the key is the record ordinal; for
/// variable-length kinds it is the byte offset of the record from the
/// section start, exactly as other records encode it. Decoding borrows a
/// reader from the pool for the duration of one record.
pub struct EntityLoader<F: EntityFactory> {
    header: SectionHeader,
    pool: Arc<ReaderPool>,
    factory: F,
    stride: Option<usize>,
    cache: CacheStore<F::Entity>,
}

impl<F: EntityFactory> EntityLoader<F> {
    pub(crate) fn new(
        header: SectionHeader,
        pool: Arc<ReaderPool>,
        factory: F,
        config: CacheConfig<F::Entity>,
    ) -> Result<Self, DatasetError> {
        let stride = factory.stride();

        if let Some(stride) = stride
            && u64::from(header.count()) * stride as u64 != u64::from(header.length())
        {
            return Err(DatasetError::Malformed {
                section: header.name(),
                offset: header.start(),
                detail: "section length does not match count x record length",
            });
        }

        Ok(Self {
            cache: CacheStore::from_config(header.name(), config)?,
            header,
            pool,
            factory,
            stride,
        })
    }

    #[must_use]
    pub fn header(&self) -> &SectionHeader {
        &self.header
    }

    /// Returns the entity at `key`, from cache when possible.
    pub fn load(&self, key: i32) -> Result<Arc<F::Entity>, DatasetError> {
        if self.pool.is_closed() {
            return Err(DatasetError::Closed);
        }

        if let Some(hit) = self.cache.get(key) {
            return Ok(hit);
        }

        let entity = Arc::new(self.fetch(key)?);
        self.cache.insert(key, &entity);
        Ok(entity)
    }

    fn fetch(&self, key: i32) -> Result<F::Entity, DatasetError> {
        let offset = match self.stride {
            Some(stride) => {
                if key < 0 || key as u32 >= self.header.count() {
                    return Err(DatasetError::IndexOutOfRange {
                        section: self.header.name(),
                        key,
                        bound: self.header.count(),
                    });
                }
                self.header.start() + stride as u64 * key as u64
            }
            None => {
                if key < 0 || key as u32 >= self.header.length() {
                    return Err(DatasetError::IndexOutOfRange {
                        section: self.header.name(),
                        key,
                        bound: self.header.length(),
                    });
                }
                self.header.start() + key as u64
            }
        };

        let mut reader = self.pool.acquire()?;
        reader.set_position(offset)?;
        let entity = self.factory.create(key, &mut reader)?;
        let end_position = reader.position();

        // A variable-length record must end within its section; a read that
        // ran into the next section means the key did not address a record
        // boundary.
        if self.stride.is_none() && end_position > self.header.end() {
            return Err(DatasetError::Malformed {
                section: self.header.name(),
                offset,
                detail: "record extends past the section end",
            });
        }

        Ok(entity)
    }

    /// The key of the record following `entity` at `position`: the next
    /// ordinal for fixed-length kinds, the position advanced by the decoded
    /// record's byte length for variable-length kinds.
    #[must_use]
    pub fn next_position(&self, position: i32, entity: &F::Entity) -> i32 {
        match self.stride {
            Some(_) => position + 1,
            None => {
                position
                    + self
                        .factory
                        .length_of(entity)
                        .expect("variable-length factory reports record length")
                        as i32
            }
        }
    }

    /// Counter snapshot when the loader fronts a built-in LRU cache.
    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match &self.cache {
            CacheStore::Lru(cache) => Some(cache.stats()),
            _ => None,
        }
    }
}
