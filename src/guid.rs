use std::{fmt::Display, io::Cursor, str::FromStr};

use binrw::prelude::*;

/// A standard, 16-byte GUID, as carried by object ACEs.
///
/// The first three groups are stored little-endian, the last 8 bytes in their string order.
#[derive(BinRead, BinWrite, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[brw(little)]
pub struct Guid(u32, u16, u16, [u8; 8]);

impl Guid {
    /// The size of a GUID, in Bytes
    pub const GUID_SIZE: usize = 16;
    const _VALIDATE_SIZE_OF: [u8; Self::GUID_SIZE] = [0; size_of::<Self>()];

    pub const ZERO: Guid = Guid(0, 0, 0, [0; 8]);

    /// Parses `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, optionally wrapped in braces.
    /// Hex digits may be of either case.
    pub const fn parse_uuid(s: &str) -> Result<Guid, &'static str> {
        let b = s.as_bytes();
        let so = if b.len() == 38 && b[0] == b'{' && b[37] == b'}' {
            1
        } else if b.len() == 36 {
            0
        } else {
            return Err("Invalid GUID length");
        };
        if b[so + 8] != b'-' || b[so + 13] != b'-' || b[so + 18] != b'-' || b[so + 23] != b'-' {
            return Err("Invalid GUID format");
        }

        // Byte positions of the 16 hex pairs, in string order.
        const PAIRS: [usize; 16] = [0, 2, 4, 6, 9, 11, 14, 16, 19, 21, 24, 26, 28, 30, 32, 34];
        let mut bytes = [0u8; 16];
        let mut i = 0;
        while i < PAIRS.len() {
            bytes[i] = match parse_byte(b, so + PAIRS[i]) {
                Ok(x) => x,
                Err(e) => return Err(e),
            };
            i += 1;
        }
        Ok(Guid(
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            u16::from_be_bytes([bytes[4], bytes[5]]),
            u16::from_be_bytes([bytes[6], bytes[7]]),
            [
                bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14],
                bytes[15],
            ],
        ))
    }
}

const fn parse_hex(c: u8) -> Result<u8, &'static str> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err("Invalid hex character"),
    }
}

const fn parse_byte(b: &[u8], i: usize) -> Result<u8, &'static str> {
    let high = match parse_hex(b[i]) {
        Ok(val) => val,
        Err(e) => return Err(e),
    };
    let low = match parse_hex(b[i + 1]) {
        Ok(val) => val,
        Err(e) => return Err(e),
    };
    Ok((high << 4) | low)
}

/// Creates a [`Guid`] from a string literal at compile time.
///
/// ```
/// use ntsd::guid;
/// const COMPUTER: ntsd::Guid = guid!("bf967a86-0de6-11d0-a285-00aa003049e2");
/// assert_eq!(COMPUTER.to_string(), "bf967a86-0de6-11d0-a285-00aa003049e2");
/// ```
#[macro_export]
macro_rules! guid {
    ($s:literal) => {{
        match $crate::Guid::parse_uuid($s) {
            Ok(guid) => guid,
            Err(_) => panic!("Invalid GUID format"),
        }
    }};
}

impl From<[u8; 16]> for Guid {
    fn from(value: [u8; 16]) -> Self {
        Guid(
            u32::from_le_bytes([value[0], value[1], value[2], value[3]]),
            u16::from_le_bytes([value[4], value[5]]),
            u16::from_le_bytes([value[6], value[7]]),
            [
                value[8], value[9], value[10], value[11], value[12], value[13], value[14],
                value[15],
            ],
        )
    }
}

impl TryFrom<&[u8]> for Guid {
    type Error = binrw::Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let mut cursor = Cursor::new(value);
        Guid::read(&mut cursor)
    }
}

impl From<Guid> for [u8; 16] {
    fn from(val: Guid) -> Self {
        let mut out = [0u8; 16];
        out[..4].copy_from_slice(&val.0.to_le_bytes());
        out[4..6].copy_from_slice(&val.1.to_le_bytes());
        out[6..8].copy_from_slice(&val.2.to_le_bytes());
        out[8..].copy_from_slice(&val.3);
        out
    }
}

impl FromStr for Guid {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Guid::parse_uuid(s).map_err(|e| crate::Error::InvalidArgument(format!("{e}: {s:?}")))
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:012x}",
            self.0,
            self.1,
            self.2,
            self.3[0],
            self.3[1],
            self.3[2..]
                .iter()
                .fold(0u64, |acc, &x| (acc << 8) + x as u64)
        )
    }
}

impl std::fmt::Debug for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
