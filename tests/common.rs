#![allow(dead_code)]

use ntsd::{
    security::{AccessMask, AceFlags, AceType, AclRevision},
    Guid, SecurityDescriptor, WireFormat, ACE, ACL, SID,
};

pub struct TestSids;

impl TestSids {
    pub const USER: &'static str = "S-1-5-21-1835709989-2027683138-697581538-1139";
    pub const GROUP_1: &'static str = "S-1-5-21-1835709989-2027683138-697581538-1440";
    pub const GROUP_2: &'static str = "S-1-5-21-1835709989-2027683138-697581538-1107";
    pub const DOMAIN_USERS: &'static str = "S-1-5-21-1835709989-2027683138-697581538-513";
}

pub fn sid(s: &str) -> SID {
    s.parse().unwrap()
}

pub fn entry(ace_type: AceType, trustee: &str, mask: u32) -> ACE {
    ACE::new(ace_type, sid(trustee)).with_access_mask(AccessMask::from(mask))
}

pub fn object_entry(
    ace_type: AceType,
    trustee: &str,
    mask: u32,
    object_type: Option<Guid>,
    inherited_object_type: Option<Guid>,
) -> ACE {
    let mut ace = entry(ace_type, trustee, mask);
    if let Some(object_type) = object_type {
        ace = ace.with_object_type(object_type).unwrap();
    }
    if let Some(inherited_object_type) = inherited_object_type {
        ace = ace.with_inherited_object_type(inherited_object_type).unwrap();
    }
    ace
}

pub fn with_flags(ace: ACE, flags: u8) -> ACE {
    ace.with_flags(AceFlags::from(flags))
}

/// Builds a descriptor holding `entries` as its DACL, encodes it, and parses it back,
/// the way a descriptor read from a directory would be.
pub fn stored_descriptor(entries: Vec<ACE>) -> SecurityDescriptor {
    let mut dacl = ACL::new(AclRevision::DS);
    for ace in entries {
        dacl.push(ace);
    }
    let mut sd = SecurityDescriptor::new();
    sd.set_owner(sid(SID::S_ADMINISTRATORS))
        .set_group(sid(TestSids::DOMAIN_USERS))
        .set_dacl(Some(dacl));
    let bytes = sd.to_bytes().unwrap();
    let parsed = SecurityDescriptor::parse(&bytes).unwrap();
    assert_eq!(parsed, sd);
    parsed
}
