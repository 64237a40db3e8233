use binrw::{prelude::*, Endian};

/// Size of the word that self-relative offsets are addressed in.
pub const WORD_SIZE: u32 = 4;

/// Truncates a self-relative offset down to the start of the 4-byte word it falls in.
pub const fn word_aligned(offset: u32) -> u64 {
    (offset - offset % WORD_SIZE) as u64
}

/// Writes the low 48 bits of `value`, e.g. a SID identifier authority.
#[binrw::writer(writer, endian)]
pub fn write_u48(value: &u64) -> binrw::BinResult<()> {
    if value >> 48 != 0 {
        return Err(binrw::Error::AssertFail {
            pos: writer.stream_position()?,
            message: format!("value {value:#x} does not fit in 48 bits"),
        });
    }
    let (buf, range) = match endian {
        Endian::Little => (value.to_le_bytes(), 0..6),
        Endian::Big => (value.to_be_bytes(), 2..8),
    };
    writer.write_all(&buf[range]).map_err(Into::into)
}

/// Reads a 48-bit unsigned integer into the low bits of a `u64`.
#[binrw::parser(reader, endian)]
pub fn read_u48() -> binrw::BinResult<u64> {
    type ConvFn = fn([u8; 8]) -> u64;
    let mut buf = [0u8; 8];
    let (conv, out): (ConvFn, &mut [u8]) = match endian {
        Endian::Little => (u64::from_le_bytes, &mut buf[..6]),
        Endian::Big => (u64::from_be_bytes, &mut buf[2..]),
    };
    reader.read_exact(out)?;
    Ok(conv(buf))
}
