use std::io::{self, Result};

use zerocopy::{FromBytes, I16, I32, LittleEndian, U16, U32, U64};

/// Extends [`Read`] with methods for reading little-endian numbers.
///
/// Every multi-byte integer in a detection data file is little-endian, so
/// unlike the classic byte-order extension traits none of these methods take
/// an endianness parameter.
///
/// [`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
pub trait ReadBytesExt: io::Read {
    /// Read a type that implements [`FromBytes`] from the underlying reader.
    ///
    /// # Errors
    ///
    /// This method returns the same errors as [`Read::read_exact`].
    ///
    /// [`Read::read_exact`]: https://doc.rust-lang.org/std/io/trait.Read.html#method.read_exact
    #[inline]
    fn read_t<T: FromBytes>(&mut self) -> Result<T> {
        T::read_from_io(self)
    }

    /// Reads an unsigned 8-bit integer from the underlying reader.
    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        u8::read_from_io(self)
    }

    /// Reads a little-endian unsigned 16-bit integer from the underlying
    /// reader.
    #[inline]
    fn read_u16(&mut self) -> Result<u16> {
        U16::<LittleEndian>::read_from_io(self).map(U16::get)
    }

    /// Reads a little-endian signed 16-bit integer from the underlying
    /// reader.
    #[inline]
    fn read_i16(&mut self) -> Result<i16> {
        I16::<LittleEndian>::read_from_io(self).map(I16::get)
    }

    /// Reads a little-endian unsigned 32-bit integer from the underlying
    /// reader.
    #[inline]
    fn read_u32(&mut self) -> Result<u32> {
        U32::<LittleEndian>::read_from_io(self).map(U32::get)
    }

    /// Reads a little-endian signed 32-bit integer from the underlying
    /// reader.
    #[inline]
    fn read_i32(&mut self) -> Result<i32> {
        I32::<LittleEndian>::read_from_io(self).map(I32::get)
    }

    /// Reads a little-endian unsigned 64-bit integer from the underlying
    /// reader.
    #[inline]
    fn read_u64(&mut self) -> Result<u64> {
        U64::<LittleEndian>::read_from_io(self).map(U64::get)
    }
}

/// All types that implement `Read` get methods defined in `ReadBytesExt` for
/// free.
impl<R: io::Read + ?Sized> ReadBytesExt for R {}
