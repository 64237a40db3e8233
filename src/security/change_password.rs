//! The "user cannot change password" setting of Active Directory user objects.
//!
//! The setting has no attribute of its own: it is expressed by denying the
//! change-password extended right to Everyone and to Self in the object's DACL.

use crate::{guid, guid::Guid};

use super::{AccessMask, AceType, AclRevision, SecurityDescriptor, ACE, ACL, SID};

/// The User-Change-Password extended right.
pub const USER_CHANGE_PASSWORD: Guid = guid!("ab721a53-1e2f-11d0-9819-00aa0040529b");

/// Trustees the setting applies to.
const TRUSTEES: [&str; 2] = [SID::S_EVERYONE, SID::S_SELF];

fn is_change_password_entry(ace: &ACE) -> bool {
    ace.object_type == Some(USER_CHANGE_PASSWORD)
        && TRUSTEES.iter().any(|t| ace.sid.to_string() == *t)
}

/// Whether the DACL denies Everyone or Self the right to change the password.
pub fn is_user_cannot_change_password(sd: &SecurityDescriptor) -> bool {
    sd.dacl().is_some_and(|dacl| {
        dacl.entries_of(AceType::AccessDeniedObject)
            .any(is_change_password_entry)
    })
}

/// Denies (`cannot == true`) or allows Everyone and Self to change the password.
///
/// Existing change-password entries for those trustees are switched between allowed
/// and denied; missing ones are appended. A descriptor without a DACL gets an empty one first.
pub fn set_user_cannot_change_password(sd: &mut SecurityDescriptor, cannot: bool) {
    let ace_type = if cannot {
        AceType::AccessDeniedObject
    } else {
        AceType::AccessAllowedObject
    };

    if sd.dacl.is_none() {
        sd.set_dacl(Some(ACL::new(AclRevision::DS)));
    }
    let Some(dacl) = sd.dacl.as_mut() else {
        return;
    };

    let mut missing = TRUSTEES.to_vec();
    for ace in dacl.ace.iter_mut().filter(|ace| {
        matches!(
            ace.ace_type,
            AceType::AccessAllowedObject | AceType::AccessDeniedObject
        ) && is_change_password_entry(ace)
    }) {
        log::debug!("Switching change-password entry of {} to {:?}", ace.sid, ace_type);
        ace.ace_type = ace_type;
        let sid = ace.sid.to_string();
        missing.retain(|t| *t != sid);
    }

    for trustee in missing {
        let Ok(sid) = trustee.parse::<SID>() else {
            continue;
        };
        log::debug!("Adding change-password entry for {sid} as {ace_type:?}");
        let ace = ACE::new(ace_type, sid)
            .with_access_mask(AccessMask::from(AccessMask::CONTROL_ACCESS))
            .with_object_type(USER_CHANGE_PASSWORD);
        match ace {
            Ok(ace) => {
                dacl.push(ace);
            }
            Err(e) => log::warn!("Failed to build change-password entry: {e}"),
        }
    }
}
