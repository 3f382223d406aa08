use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::DatasetError;

/// The byte source every reader of a dataset is bound to.
///
/// Buffer sources hand out cursors over the same shared allocation; file
/// sources open an independent handle per reader so that positioning one
/// reader never disturbs another.
#[derive(Clone, Debug)]
pub(crate) enum Source {
    Buffer(Arc<[u8]>),
    File { path: Arc<PathBuf>, len: u64 },
}

impl Source {
    pub fn from_buffer(data: Arc<[u8]>) -> Self {
        Self::Buffer(data)
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let len = path.metadata()?.len();

        Ok(Self::File {
            path: Arc::new(path.to_path_buf()),
            len,
        })
    }

    pub fn len(&self) -> u64 {
        match self {
            Self::Buffer(data) => data.len() as u64,
            Self::File { len, .. } => *len,
        }
    }

    /// Opens a new cursor over the source, positioned at offset 0.
    pub fn open(&self) -> Result<BinaryReader, DatasetError> {
        let inner = match self {
            Self::Buffer(data) => Inner::Buffer {
                data: Arc::clone(data),
                pos: 0,
            },
            Self::File { path, .. } => Inner::File {
                file: BufReader::new(File::open(path.as_path())?),
                pos: 0,
            },
        };

        Ok(BinaryReader {
            inner,
            len: self.len(),
        })
    }
}

/// A positioned cursor over a dataset byte source.
///
/// The reader itself carries no structure: callers reposition it with
/// [`set_position`] before every structured decode and read typed values
/// through [`ReadBytesExt`]. A `BinaryReader` is not safe for concurrent
/// use; the reader pool is the synchronisation point.
///
/// [`set_position`]: BinaryReader::set_position
/// [`ReadBytesExt`]: crate::read::ReadBytesExt
#[derive(Debug)]
pub struct BinaryReader {
    inner: Inner,
    len: u64,
}

#[derive(Debug)]
enum Inner {
    Buffer { data: Arc<[u8]>, pos: usize },
    File { file: BufReader<File>, pos: u64 },
}

impl BinaryReader {
    /// Moves the cursor to an absolute byte offset.
    pub fn set_position(&mut self, offset: u64) -> Result<(), DatasetError> {
        match &mut self.inner {
            Inner::Buffer { pos, .. } => {
                *pos = usize::try_from(offset).unwrap_or(usize::MAX);
            }
            Inner::File { file, pos } => {
                // Seeking resets buffered data only when the target is not
                // already buffered; seek_relative keeps the buffer warm for
                // the sequential decodes that follow a reposition.
                if offset != *pos {
                    file.seek_relative(offset as i64 - *pos as i64)?;
                    *pos = offset;
                }
            }
        }

        Ok(())
    }

    /// The current absolute byte offset of the cursor.
    #[must_use]
    pub fn position(&self) -> u64 {
        match &self.inner {
            Inner::Buffer { pos, .. } => *pos as u64,
            Inner::File { pos, .. } => *pos,
        }
    }

    /// Total length of the underlying source in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Reads exactly `n` bytes from the current position.
    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buffer = vec![0; n];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

impl Read for BinaryReader {
    fn read(&mut self, dest: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Buffer { data, pos } => {
                let remaining = data.get(*pos..).unwrap_or_default();
                let n = remaining.len().min(dest.len());
                dest[..n].copy_from_slice(&remaining[..n]);
                *pos += n;
                Ok(n)
            }
            Inner::File { file, pos } => {
                let n = file.read(dest)?;
                *pos += n as u64;
                Ok(n)
            }
        }
    }
}

impl Seek for BinaryReader {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let base = match target {
            SeekFrom::Start(offset) => {
                self.set_position(offset).map_err(io::Error::other)?;
                return Ok(offset);
            }
            SeekFrom::Current(delta) => (self.position(), delta),
            SeekFrom::End(delta) => (self.len, delta),
        };

        let offset = base.0.checked_add_signed(base.1).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of source")
        })?;
        self.set_position(offset).map_err(io::Error::other)?;
        Ok(offset)
    }
}
