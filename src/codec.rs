//! Byte-slice entry points shared by all wire structures.

use std::io::Cursor;

use binrw::prelude::*;

use crate::Error;

/// A structure with a fixed little-endian wire representation.
///
/// Implemented for every type that can be read and written by binrw without arguments:
/// [`SecurityDescriptor`][crate::SecurityDescriptor], [`ACL`][crate::ACL],
/// [`ACE`][crate::ACE], [`SID`][crate::SID] and [`Guid`][crate::Guid].
pub trait WireFormat: Sized {
    /// Decodes a value from the beginning of `bytes`.
    ///
    /// Trailing bytes are ignored. Any structural problem is reported as
    /// [`Error::MalformedInput`], and no partially decoded value is returned.
    fn parse(bytes: &[u8]) -> crate::Result<Self>;

    /// Encodes the value into a new buffer.
    fn to_bytes(&self) -> crate::Result<Vec<u8>>;
}

impl<T> WireFormat for T
where
    T: BinRead + BinWrite,
    for<'a> <T as BinRead>::Args<'a>: Default,
    for<'a> <T as BinWrite>::Args<'a>: Default,
{
    fn parse(bytes: &[u8]) -> crate::Result<Self> {
        let mut cursor = Cursor::new(bytes);
        T::read_options(&mut cursor, binrw::Endian::Little, Default::default())
            .map_err(Error::MalformedInput)
    }

    fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_options(&mut cursor, binrw::Endian::Little, Default::default())
            .map_err(Error::InvalidState)?;
        Ok(cursor.into_inner())
    }
}
