use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("data file format version {major}.{minor} is not supported")]
    UnsupportedVersion { major: i32, minor: i32 },
    #[error("malformed {section} record at offset {offset}: {detail}")]
    Malformed {
        section: &'static str,
        offset: u64,
        detail: &'static str,
    },
    #[error("key {key} is outside the {section} section bounds [0, {bound})")]
    IndexOutOfRange {
        section: &'static str,
        key: i32,
        bound: u32,
    },
    #[error("invalid cache configured for {0}: an LRU cache must have a non-zero capacity")]
    InvalidCacheKind(&'static str),
    #[error("dataset has been closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
}
