//! MS-DTYP 2.4.6: Security Descriptor

use binrw::prelude::*;
use modular_bitfield::prelude::*;

use crate::binrw_util::prelude::*;

use super::{ACL, SID};

/// A self-relative security descriptor.
///
/// Sub-structures are located by their offsets when reading, and written back
/// in owner, group, SACL, DACL order right after the header.
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone)]
#[brw(little)]
pub struct SecurityDescriptor {
    #[bw(calc = PosMarker::default())]
    #[br(temp)]
    _sd_begin: PosMarker<()>,

    #[bw(calc = 1)]
    #[br(temp)]
    #[br(assert(_revision == 1, "unsupported security descriptor revision {}", _revision))]
    _revision: u8,
    #[bw(calc = 0)]
    #[br(temp)]
    _sbz1: u8,
    pub control: SecurityDescriptorControl,

    #[bw(calc = PosMarker::default())]
    #[br(temp)]
    offset_owner: PosMarker<u32>,
    #[bw(calc = PosMarker::default())]
    #[br(temp)]
    offset_group: PosMarker<u32>,
    #[bw(calc = PosMarker::default())]
    #[br(temp)]
    offset_sacl: PosMarker<u32>,
    #[bw(calc = PosMarker::default())]
    #[br(temp)]
    offset_dacl: PosMarker<u32>,

    #[br(if(!control.owner_defaulted() && offset_owner.value != 0))]
    #[br(seek_before = _sd_begin.seek_from(word_aligned(offset_owner.value)))]
    #[bw(assert(
        owner_sid.is_none() || !control.owner_defaulted(),
        "owner is set while the control marks it as defaulted"
    ))]
    #[bw(if(owner_sid.is_some()))]
    #[bw(write_with = PosMarker::write_roff_b, args(&offset_owner, &_sd_begin))]
    pub owner_sid: Option<SID>,

    #[br(if(!control.group_defaulted() && offset_group.value != 0))]
    #[br(seek_before = _sd_begin.seek_from(word_aligned(offset_group.value)))]
    #[bw(assert(
        group_sid.is_none() || !control.group_defaulted(),
        "group is set while the control marks it as defaulted"
    ))]
    #[bw(if(group_sid.is_some()))]
    #[bw(write_with = PosMarker::write_roff_b, args(&offset_group, &_sd_begin))]
    pub group_sid: Option<SID>,

    #[br(if(control.sacl_present() && offset_sacl.value != 0))]
    #[br(seek_before = _sd_begin.seek_from(word_aligned(offset_sacl.value)))]
    #[bw(assert(
        sacl.is_none() || control.sacl_present(),
        "SACL is set while the control marks it as absent"
    ))]
    #[bw(if(sacl.is_some()))]
    #[bw(write_with = PosMarker::write_roff_b, args(&offset_sacl, &_sd_begin))]
    pub sacl: Option<ACL>,

    #[br(if(control.dacl_present() && offset_dacl.value != 0))]
    #[br(seek_before = _sd_begin.seek_from(word_aligned(offset_dacl.value)))]
    #[bw(assert(
        dacl.is_none() || control.dacl_present(),
        "DACL is set while the control marks it as absent"
    ))]
    #[bw(if(dacl.is_some()))]
    #[bw(write_with = PosMarker::write_roff_b, args(&offset_dacl, &_sd_begin))]
    pub dacl: Option<ACL>,
}

impl SecurityDescriptor {
    const HEADER_SIZE: usize = 20;

    /// An empty, self-relative descriptor.
    pub fn new() -> Self {
        Self {
            control: SecurityDescriptorControl::new().with_self_relative(true),
            owner_sid: None,
            group_sid: None,
            sacl: None,
            dacl: None,
        }
    }

    pub fn owner(&self) -> Option<&SID> {
        self.owner_sid.as_ref()
    }

    pub fn group(&self) -> Option<&SID> {
        self.group_sid.as_ref()
    }

    pub fn dacl(&self) -> Option<&ACL> {
        self.dacl.as_ref()
    }

    pub fn sacl(&self) -> Option<&ACL> {
        self.sacl.as_ref()
    }

    /// Sets the owner, clearing the owner-defaulted bit.
    pub fn set_owner(&mut self, owner: SID) -> &mut Self {
        self.control.set_owner_defaulted(false);
        self.owner_sid = Some(owner);
        self
    }

    /// Sets the group, clearing the group-defaulted bit.
    pub fn set_group(&mut self, group: SID) -> &mut Self {
        self.control.set_group_defaulted(false);
        self.group_sid = Some(group);
        self
    }

    /// Sets or removes the DACL, keeping the DACL-present bit in sync.
    pub fn set_dacl(&mut self, dacl: Option<ACL>) -> &mut Self {
        self.control.set_dacl_present(dacl.is_some());
        self.dacl = dacl;
        self
    }

    /// Sets or removes the SACL, keeping the SACL-present bit in sync.
    pub fn set_sacl(&mut self, sacl: Option<ACL>) -> &mut Self {
        self.control.set_sacl_present(sacl.is_some());
        self.sacl = sacl;
        self
    }

    /// The encoded size of the descriptor, in bytes.
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE
            + self.owner_sid.as_ref().map_or(0, SID::size)
            + self.group_sid.as_ref().map_or(0, SID::size)
            + self.sacl.as_ref().map_or(0, ACL::size)
            + self.dacl.as_ref().map_or(0, ACL::size)
    }

    fn fmt_acl(
        f: &mut std::fmt::Formatter<'_>,
        tag: &str,
        present: bool,
        protected: bool,
        auto_inherited: bool,
        acl: Option<&ACL>,
    ) -> std::fmt::Result {
        if !present {
            return Ok(());
        }
        write!(f, "{tag}:")?;
        if protected {
            write!(f, "P")?;
        }
        if auto_inherited {
            write!(f, "AI")?;
        }
        match acl {
            Some(acl) => write!(f, "{acl}"),
            None => write!(f, "NO_ACCESS_CONTROL"),
        }
    }
}

impl Default for SecurityDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SecurityDescriptor {
    /// SDDL string form, e.g. `O:S-1-5-32-544G:S-1-5-18D:AI(A;CI;GA;;;S-1-1-0)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(owner) = &self.owner_sid {
            write!(f, "O:{owner}")?;
        }
        if let Some(group) = &self.group_sid {
            write!(f, "G:{group}")?;
        }
        let c = &self.control;
        Self::fmt_acl(
            f,
            "D",
            c.dacl_present(),
            c.dacl_protected(),
            c.dacl_auto_inherited(),
            self.dacl.as_ref(),
        )?;
        Self::fmt_acl(
            f,
            "S",
            c.sacl_present(),
            c.sacl_protected(),
            c.sacl_auto_inherited(),
            self.sacl.as_ref(),
        )
    }
}

#[bitfield]
#[derive(BinWrite, BinRead, Debug, Clone, Copy, PartialEq, Eq)]
#[bw(map = |&x| Self::into_bytes(x))]
#[br(map = Self::from_bytes)]
pub struct SecurityDescriptorControl {
    pub owner_defaulted: bool,
    pub group_defaulted: bool,
    pub dacl_present: bool,
    pub dacl_defaulted: bool,

    pub sacl_present: bool,
    pub sacl_defaulted: bool,
    pub dacl_trusted: bool,
    pub server_security: bool,

    pub dacl_computed: bool,
    pub sacl_computed: bool,
    pub dacl_auto_inherited: bool,
    pub sacl_auto_inherited: bool,

    pub dacl_protected: bool,
    pub sacl_protected: bool,
    pub rm_control_valid: bool,
    pub self_relative: bool,
}
