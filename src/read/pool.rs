use std::{
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use parking_lot::Mutex;
use tracing::trace;

use super::{BinaryReader, Source};
use crate::error::DatasetError;

/// A recycled set of [`BinaryReader`] cursors over one byte source.
///
/// Many concurrent lookups share the underlying source without per-call
/// open/close: a lookup acquires an idle reader (or a new one is opened on
/// demand), decodes, and the guard returns it on drop. The pool is the only
/// mutually-exclusive region on the lookup path.
#[derive(Debug)]
pub(crate) struct ReaderPool {
    source: Source,
    idle: Mutex<Vec<BinaryReader>>,
    closed: AtomicBool,
    created: AtomicU64,
    retired: AtomicU64,
}

impl ReaderPool {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            idle: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            created: AtomicU64::new(0),
            retired: AtomicU64::new(0),
        }
    }

    /// Takes an idle reader, opening a new one when none is available.
    pub fn acquire(&self) -> Result<PooledReader<'_>, DatasetError> {
        if self.is_closed() {
            return Err(DatasetError::Closed);
        }

        let reader = match self.idle.lock().pop() {
            Some(reader) => reader,
            None => {
                let reader = self.source.open()?;
                let created = self.created.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(created, "opened dataset reader");
                reader
            }
        };

        Ok(PooledReader {
            pool: self,
            reader: Some(reader),
        })
    }

    fn release(&self, reader: BinaryReader) {
        let mut idle = self.idle.lock();
        if self.is_closed() {
            drop(reader);
            self.retired.fetch_add(1, Ordering::Relaxed);
        } else {
            idle.push(reader);
        }
    }

    /// Drains and disposes every idle reader. Subsequent `acquire` calls
    /// fail with [`DatasetError::Closed`]; readers still out on loan are
    /// disposed as their guards drop.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let drained = {
            let mut idle = self.idle.lock();
            let drained = idle.len() as u64;
            idle.clear();
            drained
        };
        self.retired.fetch_add(drained, Ordering::Relaxed);
        trace!(drained, "closed reader pool");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of readers ever opened against the source.
    pub fn readers_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Number of readers at rest: the idle set while the pool is open, the
    /// retired total once it is closed. After close, every reader ever
    /// handed out ends up retired, so `readers_created == readers_queued`.
    pub fn readers_queued(&self) -> u64 {
        if self.is_closed() {
            self.retired.load(Ordering::Relaxed)
        } else {
            self.idle.lock().len() as u64
        }
    }
}

/// Scoped loan of a reader from a [`ReaderPool`].
///
/// The reader returns to the pool when the guard drops, on every exit path.
#[derive(Debug)]
pub(crate) struct PooledReader<'pool> {
    pool: &'pool ReaderPool,
    reader: Option<BinaryReader>,
}

impl Deref for PooledReader<'_> {
    type Target = BinaryReader;

    fn deref(&self) -> &Self::Target {
        self.reader.as_ref().expect("reader taken before drop")
    }
}

impl DerefMut for PooledReader<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.reader.as_mut().expect("reader taken before drop")
    }
}

impl Drop for PooledReader<'_> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            self.pool.release(reader);
        }
    }
}
