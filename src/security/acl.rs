//! MS-DTYP 2.4.5: ACL

use binrw::prelude::*;

use crate::binrw_util::prelude::*;

use super::{AceType, ACE};

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone)]
#[brw(little)]
pub struct ACL {
    pub acl_revision: AclRevision,
    #[bw(calc = 0)]
    #[br(temp)]
    sbz1: u8,
    #[bw(calc = PosMarker::default())]
    #[br(temp)]
    _acl_size: PosMarker<u16>,
    #[bw(try_calc = ace.len().try_into())]
    #[br(temp)]
    ace_count: u16,
    #[bw(calc = 0)]
    #[br(temp)]
    sbz2: u16,

    #[br(count = ace_count)]
    #[bw(write_with = PosMarker::write_size_plus, args(&_acl_size, Self::HEADER_SIZE))]
    pub ace: Vec<ACE>,
}

impl ACL {
    const HEADER_SIZE: u64 = 8;

    /// An empty ACL.
    pub fn new(acl_revision: AclRevision) -> Self {
        Self {
            acl_revision,
            ace: Vec::new(),
        }
    }

    /// Appends an entry at the end of the list.
    pub fn push(&mut self, ace: ACE) -> &mut Self {
        self.ace.push(ace);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ACE> {
        self.ace.iter()
    }

    pub fn len(&self) -> usize {
        self.ace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ace.is_empty()
    }

    /// Entries of the given type.
    pub fn entries_of(&self, ace_type: AceType) -> impl Iterator<Item = &ACE> {
        self.ace.iter().filter(move |ace| ace.ace_type == ace_type)
    }

    /// The encoded size of the ACL, in bytes.
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE as usize + self.ace.iter().map(ACE::size).sum::<usize>()
    }
}

impl<'a> IntoIterator for &'a ACL {
    type Item = &'a ACE;
    type IntoIter = std::slice::Iter<'a, ACE>;

    fn into_iter(self) -> Self::IntoIter {
        self.ace.iter()
    }
}

impl std::fmt::Display for ACL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for ace in &self.ace {
            write!(f, "{ace}")?;
        }
        Ok(())
    }
}

#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[brw(repr(u8))]
pub enum AclRevision {
    /// Windows NT 4.0
    Nt4 = 2,
    /// Active directory
    DS = 4,
}
