//! MS-DTYP 2.4.3, 2.4.4.1: access masks, ACE types and ACE flags.

use std::fmt::Write;

use binrw::prelude::*;
use modular_bitfield::prelude::*;

/// Access mask of directory service objects, with the standard and generic rights.
#[bitfield]
#[derive(BinWrite, BinRead, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[bw(map = |&x| Self::into_bytes(x))]
#[br(map = Self::from_bytes)]
pub struct AccessMask {
    pub create_child: bool,
    pub delete_child: bool,
    pub list_children: bool,
    pub self_write: bool,

    pub read_property: bool,
    pub write_property: bool,
    pub delete_tree: bool,
    pub list_object: bool,

    pub control_access: bool,
    #[skip]
    __: B7,

    pub delete: bool,
    pub read_control: bool,
    pub write_dacl: bool,
    pub write_owner: bool,

    pub synchronize: bool,
    #[skip]
    __: B3,

    pub access_system_security: bool,
    pub maximum_allowed: bool,
    #[skip]
    __: B2,

    pub generic_all: bool,
    pub generic_execute: bool,
    pub generic_write: bool,
    pub generic_read: bool,
}

impl AccessMask {
    pub const CREATE_CHILD: u32 = 0x0000_0001;
    pub const DELETE_CHILD: u32 = 0x0000_0002;
    pub const LIST_CHILDREN: u32 = 0x0000_0004;
    pub const SELF_WRITE: u32 = 0x0000_0008;
    pub const READ_PROPERTY: u32 = 0x0000_0010;
    pub const WRITE_PROPERTY: u32 = 0x0000_0020;
    pub const DELETE_TREE: u32 = 0x0000_0040;
    pub const LIST_OBJECT: u32 = 0x0000_0080;
    pub const CONTROL_ACCESS: u32 = 0x0000_0100;
    pub const DELETE: u32 = 0x0001_0000;
    pub const READ_CONTROL: u32 = 0x0002_0000;
    pub const WRITE_DACL: u32 = 0x0004_0000;
    pub const WRITE_OWNER: u32 = 0x0008_0000;
    pub const SYNCHRONIZE: u32 = 0x0010_0000;
    pub const ACCESS_SYSTEM_SECURITY: u32 = 0x0100_0000;
    pub const MAXIMUM_ALLOWED: u32 = 0x0200_0000;
    pub const GENERIC_ALL: u32 = 0x1000_0000;
    pub const GENERIC_EXECUTE: u32 = 0x2000_0000;
    pub const GENERIC_WRITE: u32 = 0x4000_0000;
    pub const GENERIC_READ: u32 = 0x8000_0000;

    /// SDDL short codes, in the order they are rendered.
    const CODES: [(&'static str, u32); 17] = [
        ("GA", Self::GENERIC_ALL),
        ("GR", Self::GENERIC_READ),
        ("GW", Self::GENERIC_WRITE),
        ("GX", Self::GENERIC_EXECUTE),
        ("RC", Self::READ_CONTROL),
        ("SD", Self::DELETE),
        ("WD", Self::WRITE_DACL),
        ("WO", Self::WRITE_OWNER),
        ("RP", Self::READ_PROPERTY),
        ("WP", Self::WRITE_PROPERTY),
        ("CC", Self::CREATE_CHILD),
        ("DC", Self::DELETE_CHILD),
        ("LC", Self::LIST_CHILDREN),
        ("SW", Self::SELF_WRITE),
        ("LO", Self::LIST_OBJECT),
        ("DT", Self::DELETE_TREE),
        ("CR", Self::CONTROL_ACCESS),
    ];

    /// Whether every right in `required` is granted by this mask.
    pub fn contains(&self, required: AccessMask) -> bool {
        let (mask, required) = (u32::from(*self), u32::from(required));
        mask & required == required
    }

    /// Renders the mask as SDDL rights: short codes, followed by the remaining bits in hex.
    pub fn to_sddl(&self) -> String {
        let mut rest = u32::from(*self);
        let mut out = String::new();
        for (code, bit) in Self::CODES {
            if rest & bit != 0 {
                out.push_str(code);
                rest &= !bit;
            }
        }
        if rest != 0 {
            let _ = write!(out, "{rest:#x}");
        }
        out
    }
}

impl From<u32> for AccessMask {
    fn from(value: u32) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<AccessMask> for u32 {
    fn from(value: AccessMask) -> Self {
        u32::from_le_bytes(value.into_bytes())
    }
}

/// MS-DTYP 2.4.4.1: ACE_HEADER flags
#[bitfield]
#[derive(BinWrite, BinRead, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[bw(map = |&x| Self::into_bytes(x))]
#[br(map = Self::from_bytes)]
pub struct AceFlags {
    pub object_inherit: bool,
    pub container_inherit: bool,
    pub no_propagate_inherit: bool,
    pub inherit_only: bool,

    pub inherited: bool,
    #[skip]
    __: bool,
    pub successful_access: bool,
    pub failed_access: bool,
}

impl AceFlags {
    /// Whether the single flag `flag` is set.
    pub fn contains(&self, flag: AceFlag) -> bool {
        self.into_bytes()[0] & flag as u8 != 0
    }

    /// Returns a copy with `flag` set.
    pub fn with(self, flag: AceFlag) -> Self {
        Self::from_bytes([self.into_bytes()[0] | flag as u8])
    }

    pub fn to_sddl(&self) -> String {
        AceFlag::ALL
            .iter()
            .filter(|&&flag| self.contains(flag))
            .map(|flag| flag.code())
            .collect()
    }
}

impl From<u8> for AceFlags {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

/// A single ACE flag, used where exactly one flag is named (e.g. assertions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AceFlag {
    ObjectInherit = 0x01,
    ContainerInherit = 0x02,
    NoPropagateInherit = 0x04,
    InheritOnly = 0x08,
    Inherited = 0x10,
    SuccessfulAccess = 0x40,
    FailedAccess = 0x80,
}

impl AceFlag {
    pub const ALL: [AceFlag; 7] = [
        AceFlag::ObjectInherit,
        AceFlag::ContainerInherit,
        AceFlag::NoPropagateInherit,
        AceFlag::InheritOnly,
        AceFlag::Inherited,
        AceFlag::SuccessfulAccess,
        AceFlag::FailedAccess,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            AceFlag::ObjectInherit => "OI",
            AceFlag::ContainerInherit => "CI",
            AceFlag::NoPropagateInherit => "NP",
            AceFlag::InheritOnly => "IO",
            AceFlag::Inherited => "ID",
            AceFlag::SuccessfulAccess => "SA",
            AceFlag::FailedAccess => "FA",
        }
    }
}

/// MS-DTYP 2.4.4.3: object ACE flags
#[bitfield]
#[derive(BinWrite, BinRead, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[bw(map = |&x| Self::into_bytes(x))]
#[br(map = Self::from_bytes)]
pub struct ObjectAceFlags {
    pub object_type_present: bool,
    pub inherited_object_type_present: bool,
    #[skip]
    __: B30,
}

impl ObjectAceFlags {
    pub const OBJECT_TYPE_PRESENT: u32 = 0x1;
    pub const INHERITED_OBJECT_TYPE_PRESENT: u32 = 0x2;

    /// Whether all bits of `other` are set in `self`.
    pub fn contains(&self, other: ObjectAceFlags) -> bool {
        let (this, other) = (u32::from(*self), u32::from(other));
        this & other == other
    }

    pub fn is_empty(&self) -> bool {
        u32::from(*self) == 0
    }
}

impl From<u32> for ObjectAceFlags {
    fn from(value: u32) -> Self {
        Self::from_bytes(value.to_le_bytes())
    }
}

impl From<ObjectAceFlags> for u32 {
    fn from(value: ObjectAceFlags) -> Self {
        u32::from_le_bytes(value.into_bytes())
    }
}

/// MS-DTYP 2.4.4.1: ACE types
#[binrw::binrw]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[brw(repr(u8))]
pub enum AceType {
    AccessAllowed = 0,
    AccessDenied = 1,
    SystemAudit = 2,
    SystemAlarm = 3,
    AccessAllowedCompound = 4,
    AccessAllowedObject = 5,
    AccessDeniedObject = 6,
    SystemAuditObject = 7,
    SystemAlarmObject = 8,
    AccessAllowedCallback = 9,
    AccessDeniedCallback = 10,
    AccessAllowedCallbackObject = 11,
    AccessDeniedCallbackObject = 12,
    SystemAuditCallback = 13,
    SystemAlarmCallback = 14,
    SystemAuditCallbackObject = 15,
    SystemAlarmCallbackObject = 16,
    SystemMandatoryLabel = 17,
    SystemResourceAttribute = 18,
    SystemScopedPolicyId = 19,
}

impl AceType {
    /// Whether ACEs of this type carry object flags and optional object GUIDs.
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            AceType::AccessAllowedObject
                | AceType::AccessDeniedObject
                | AceType::SystemAuditObject
                | AceType::SystemAlarmObject
                | AceType::AccessAllowedCallbackObject
                | AceType::AccessDeniedCallbackObject
                | AceType::SystemAuditCallbackObject
                | AceType::SystemAlarmCallbackObject
        )
    }

    /// Allow entries considered when evaluating assertions.
    pub fn is_access_allowed(&self) -> bool {
        matches!(self, AceType::AccessAllowed | AceType::AccessAllowedObject)
    }

    /// Deny entries considered when evaluating assertions.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AceType::AccessDenied | AceType::AccessDeniedObject)
    }

    /// SDDL ace-type string, if there is one.
    pub fn code(&self) -> Option<&'static str> {
        Some(match self {
            AceType::AccessAllowed => "A",
            AceType::AccessDenied => "D",
            AceType::SystemAudit => "AU",
            AceType::SystemAlarm => "AL",
            AceType::AccessAllowedObject => "OA",
            AceType::AccessDeniedObject => "OD",
            AceType::SystemAuditObject => "OU",
            AceType::SystemAlarmObject => "OL",
            AceType::AccessAllowedCallback => "XA",
            AceType::AccessDeniedCallback => "XD",
            AceType::AccessAllowedCallbackObject => "ZA",
            AceType::SystemAuditCallback => "XU",
            AceType::SystemMandatoryLabel => "ML",
            AceType::SystemResourceAttribute => "RA",
            AceType::SystemScopedPolicyId => "SP",
            _ => return None,
        })
    }
}

impl std::fmt::Display for AceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{code}"),
            None => write!(f, "{:#04x}", *self as u8),
        }
    }
}
