mod ext;
mod pool;
mod reader;

pub use ext::ReadBytesExt;
pub(crate) use pool::ReaderPool;
pub use reader::BinaryReader;
pub(crate) use reader::Source;
