//! MS-DTYP 2.4.2: SID

use std::str::FromStr;

use binrw::prelude::*;

use crate::binrw_util::prelude::*;
use crate::Error;

/// A security identifier, naming a principal.
///
/// Holds an identifier authority (48 bits) and up to [`SID::MAX_SUB_AUTHORITIES`] sub-authorities.
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone, Hash, Default)]
#[brw(little)]
pub struct SID {
    #[bw(calc = 1)]
    #[br(temp)]
    #[br(assert(revision == 1, "unsupported SID revision {}", revision))]
    revision: u8,
    #[bw(try_calc = sub_authority.len().try_into())]
    #[br(temp)]
    #[br(assert(
        usize::from(sub_authority_count) <= SID::MAX_SUB_AUTHORITIES,
        "SID declares {} sub-authorities",
        sub_authority_count
    ))]
    sub_authority_count: u8,
    #[brw(big)] // WE LOVE MICROSOFT!
    #[br(parse_with = read_u48)]
    #[bw(write_with = write_u48)]
    identifier_authority: u64,
    #[br(count = sub_authority_count)]
    #[bw(assert(
        sub_authority.len() <= SID::MAX_SUB_AUTHORITIES,
        "SID has {} sub-authorities",
        sub_authority.len()
    ))]
    sub_authority: Vec<u32>,
}

impl SID {
    const PREFIX: &'static str = "S-1-";

    pub const MAX_SUB_AUTHORITIES: usize = 15;
    const AUTHORITY_SIZE: usize = 6;
    const HEADER_SIZE: usize = 2 + Self::AUTHORITY_SIZE;

    pub const S_EVERYONE: &'static str = "S-1-1-0";
    pub const S_SELF: &'static str = "S-1-5-10";
    pub const S_LOCAL_SYSTEM: &'static str = "S-1-5-18";
    pub const S_ADMINISTRATORS: &'static str = "S-1-5-32-544";

    /// An empty SID: null authority, no sub-authorities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a SID from an authority value and a list of sub-authorities.
    pub fn from_parts(identifier_authority: u64, sub_authority: Vec<u32>) -> crate::Result<Self> {
        if identifier_authority >> 48 != 0 {
            return Err(Error::InvalidArgument(format!(
                "identifier authority {identifier_authority:#x} exceeds 48 bits"
            )));
        }
        if sub_authority.len() > Self::MAX_SUB_AUTHORITIES {
            return Err(Error::InvalidArgument(format!(
                "{} sub-authorities, at most {} allowed",
                sub_authority.len(),
                Self::MAX_SUB_AUTHORITIES
            )));
        }
        Ok(Self {
            identifier_authority,
            sub_authority,
        })
    }

    /// Sets the identifier authority from up to 6 big-endian bytes.
    /// Shorter inputs are left-padded with zeros.
    pub fn set_authority(&mut self, authority: &[u8]) -> crate::Result<&mut Self> {
        if authority.len() > Self::AUTHORITY_SIZE {
            return Err(Error::InvalidArgument(format!(
                "identifier authority must be at most {} bytes, got {}",
                Self::AUTHORITY_SIZE,
                authority.len()
            )));
        }
        self.identifier_authority = authority
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        Ok(self)
    }

    /// Appends a sub-authority given as exactly 4 big-endian bytes.
    pub fn add_sub_authority(&mut self, sub_authority: &[u8]) -> crate::Result<&mut Self> {
        let bytes: [u8; 4] = sub_authority.try_into().map_err(|_| {
            Error::InvalidArgument(format!(
                "sub-authority must be 4 bytes, got {}",
                sub_authority.len()
            ))
        })?;
        if self.sub_authority.len() >= Self::MAX_SUB_AUTHORITIES {
            return Err(Error::InvalidArgument(format!(
                "a SID holds at most {} sub-authorities",
                Self::MAX_SUB_AUTHORITIES
            )));
        }
        self.sub_authority.push(u32::from_be_bytes(bytes));
        Ok(self)
    }

    pub fn identifier_authority(&self) -> u64 {
        self.identifier_authority
    }

    /// The identifier authority as its 6 wire bytes.
    pub fn authority_bytes(&self) -> [u8; 6] {
        let be = self.identifier_authority.to_be_bytes();
        [be[2], be[3], be[4], be[5], be[6], be[7]]
    }

    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authority
    }

    /// The encoded size of the SID, in bytes.
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE + 4 * self.sub_authority.len()
    }
}

impl FromStr for SID {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidArgument(format!("invalid SID string {s:?}"));
        let rest = s.strip_prefix(Self::PREFIX).ok_or_else(invalid)?;
        let mut parts = rest.split('-');
        let identifier_authority = match parts.next() {
            Some(hex) if hex.starts_with("0x") || hex.starts_with("0X") => {
                u64::from_str_radix(&hex[2..], 16).map_err(|_| invalid())?
            }
            Some(dec) => dec.parse().map_err(|_| invalid())?,
            None => return Err(invalid()),
        };
        let sub_authority = parts
            .map(|x| x.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_parts(identifier_authority, sub_authority)
    }
}

impl std::fmt::Display for SID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // MS-DTYP 2.4.2.1: SID String Format
        write!(f, "{}", Self::PREFIX)?;
        if self.identifier_authority >> 32 == 0 {
            write!(f, "{}", self.identifier_authority)?;
        } else {
            write!(f, "0x{:012X}", self.identifier_authority)?;
        }
        if self.sub_authority.is_empty() {
            return write!(f, "-0");
        }
        for sub_authority in &self.sub_authority {
            write!(f, "-{sub_authority}")?;
        }
        Ok(())
    }
}
