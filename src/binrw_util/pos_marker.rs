use std::{cell::Cell, fmt::Debug, io::SeekFrom};

use binrw::{BinRead, BinResult, BinWrite, Endian};

/// Remembers where a value was read or written, so that offsets and sizes
/// can be resolved against it (reading) or patched into it later (writing).
///
/// While writing, the marker emits `T::default()` as a placeholder which is
/// overwritten once the referenced structure has been written.
///
/// Based on <https://github.com/jam1garner/binrw/discussions/229>
pub struct PosMarker<T> {
    pub pos: Cell<u64>,
    pub value: T,
}

impl<T> PosMarker<T> {
    /// Returns a `SeekFrom` pointing `offset` bytes past the marker.
    ///
    /// Used with a zero-sized marker at the start of a self-relative structure, to
    /// seek to the structure's sub-fields.
    pub fn seek_from(&self, offset: u64) -> SeekFrom {
        debug_assert!(self.pos.get() != u64::MAX);
        SeekFrom::Start(self.pos.get() + offset)
    }
}

impl<T> BinRead for PosMarker<T>
where
    T: BinRead,
{
    type Args<'a> = T::Args<'a>;

    fn read_options<R: binrw::io::Read + binrw::io::Seek>(
        reader: &mut R,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;
        T::read_options(reader, endian, args).map(|value| Self {
            pos: Cell::new(pos),
            value,
        })
    }
}

impl<T> BinWrite for PosMarker<T>
where
    T: BinWrite<Args<'static> = ()> + Default,
{
    type Args<'a> = ();

    fn write_options<W: binrw::io::Write + binrw::io::Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.pos.set(writer.stream_position()?);
        T::default().write_options(writer, endian, args)
    }
}

impl<T> PosMarker<T>
where
    T: BinWrite<Args<'static> = ()> + TryFrom<u64>,
    T::Error: binrw::error::CustomError + 'static,
{
    /// Seeks back to the marker, writes `value` in place of the placeholder,
    /// and returns to where the writer was.
    pub fn write_back<V, W>(&self, value: V, writer: &mut W, endian: Endian) -> BinResult<()>
    where
        V: TryInto<T> + Copy + Into<u64>,
        W: binrw::io::Write + binrw::io::Seek,
    {
        let return_to = writer.stream_position()?;
        let converted = value
            .try_into()
            .map_err(|_| binrw::error::Error::AssertFail {
                pos: self.pos.get(),
                message: format!(
                    "value {} does not fit in the field at {:#x}",
                    value.into(),
                    self.pos.get()
                ),
            })?;
        writer.seek(SeekFrom::Start(self.pos.get()))?;
        converted.write_options(writer, endian, ())?;
        writer.seek(SeekFrom::Start(return_to))?;
        Ok(())
    }

    /// Writes `value`, then optionally patches its size (plus `size_extra`) and its
    /// offset from `offset_base` into the given markers.
    #[inline]
    #[binrw::writer(writer, endian)]
    fn write_patched<V, S, B>(
        value: &V,
        size_to: Option<(&Self, u64)>,
        offset_to: Option<&PosMarker<S>>,
        offset_base: Option<&PosMarker<B>>,
    ) -> BinResult<()>
    where
        V: BinWrite<Args<'static> = ()>,
        S: BinWrite<Args<'static> = ()> + TryFrom<u64>,
        S::Error: binrw::error::CustomError + 'static,
    {
        let start = writer.stream_position()?;
        if let Some(offset_to) = offset_to {
            let base = offset_base.map_or(0, |b| b.pos.get());
            offset_to.write_back(start - base, writer, endian)?;
        }

        value.write_options(writer, endian, ())?;

        if let Some((size_to, size_extra)) = size_to {
            let written = writer.stream_position()? - start;
            size_to.write_back(written + size_extra, writer, endian)?;
        }
        Ok(())
    }

    /// Writer for a value whose offset, relative to `offset_base`, is stored in `offset_to`.
    #[binrw::writer(writer, endian)]
    pub fn write_roff_b<U, B>(value: &U, offset_to: &Self, offset_base: &PosMarker<B>) -> BinResult<()>
    where
        U: BinWrite<Args<'static> = ()>,
    {
        let no_size: Option<(&Self, u64)> = None;
        Self::write_patched(
            value,
            writer,
            endian,
            (no_size, Some(offset_to), Some(offset_base)),
        )
    }

    /// Writer for a value whose written size, plus `size_extra` (usually the size of
    /// a header preceding it), is stored in `size_to`.
    #[binrw::writer(writer, endian)]
    pub fn write_size_plus<U>(value: &U, size_to: &Self, size_extra: u64) -> BinResult<()>
    where
        U: BinWrite<Args<'static> = ()>,
    {
        let no_offset: Option<&Self> = None;
        Self::write_patched(
            value,
            writer,
            endian,
            (Some((size_to, size_extra)), no_offset, no_offset),
        )
    }
}

impl<T> Debug for PosMarker<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosMarker")
            .field("pos", &self.pos)
            .field("value", &self.value)
            .finish()
    }
}

impl<T> Default for PosMarker<T>
where
    T: Default,
{
    fn default() -> Self {
        Self {
            pos: Cell::new(u64::MAX),
            value: T::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use binrw::prelude::*;

    use super::*;

    #[binrw::binrw]
    #[derive(Debug, PartialEq, Eq)]
    #[brw(little)]
    struct Blob {
        #[bw(calc = PosMarker::default())]
        #[br(temp)]
        _begin: PosMarker<()>,
        #[bw(calc = PosMarker::default())]
        #[br(temp)]
        _size: PosMarker<u16>,
        #[bw(calc = PosMarker::default())]
        #[br(temp)]
        offset: PosMarker<u32>,
        #[br(seek_before = _begin.seek_from(offset.value.into()))]
        #[bw(write_with = PosMarker::write_roff_b, args(&offset, &_begin))]
        payload: u32,
        #[br(ignore)]
        #[bw(write_with = PosMarker::write_size_plus, args(&_size, 6))]
        trailer: Vec<u8>,
    }

    #[test]
    fn test_patch_offset_and_size() {
        let blob = Blob {
            payload: 0xdeadbeef,
            trailer: vec![1, 2],
        };
        let mut cursor = Cursor::new(vec![0xffu8; 3]);
        cursor.set_position(3);
        blob.write(&mut cursor).unwrap();
        assert_eq!(
            &cursor.into_inner()[3..],
            &[
                0x08, 0x00, // size: 6 + 2
                0x06, 0x00, 0x00, 0x00, // offset
                0xef, 0xbe, 0xad, 0xde, // payload
                0x01, 0x02 // trailer
            ]
        );
    }

    #[test]
    fn test_seek_from_marker() {
        let data = [
            0xaa, // noise
            0x00, 0x00, // size
            0x09, 0x00, 0x00, 0x00, // offset
            0xff, 0xff, 0xff, // gap
            0x78, 0x56, 0x34, 0x12, // payload
        ];
        let mut cursor = Cursor::new(&data[..]);
        cursor.set_position(1);
        // offset is relative to the marker at position 1.
        let blob = Blob::read(&mut cursor).unwrap();
        assert_eq!(blob.payload, 0x1234_5678);
        assert!(blob.trailer.is_empty());

        assert!(Blob::read(&mut Cursor::new(&data[..4])).is_err());
    }
}
