//! Rights needed to join computers to a domain in an organizational unit.
//!
//! The principal must be able to create and delete computer objects in the container,
//! list its contents, read and write properties and permissions of its children, and
//! reset the password of computer objects.

use crate::{
    guid,
    guid::Guid,
    security::{AccessMask, AceFlag},
    SID,
};

use super::{AceAssertion, AdRoleAssertion};

/// `schemaIDGUID` of the computer class.
pub const COMPUTER_SCHEMA_ID: Guid = guid!("bf967a86-0de6-11d0-a285-00aa003049e2");

/// The User-Force-Change-Password (reset password) extended right.
pub const RESET_PASSWORD_RIGHT: Guid = guid!("00299570-246d-11d0-a768-00aa006e0529");

/// Rights inherited by the children of the container.
fn inherited_right(rights: u32) -> AceAssertion {
    AceAssertion::new(rights)
        .with_required_flag(AceFlag::ContainerInherit)
        .with_excluded_flag(AceFlag::InheritOnly)
}

pub fn create_computer() -> AceAssertion {
    inherited_right(AccessMask::CREATE_CHILD).with_object_type(COMPUTER_SCHEMA_ID)
}

pub fn delete_computer() -> AceAssertion {
    inherited_right(AccessMask::DELETE_CHILD).with_object_type(COMPUTER_SCHEMA_ID)
}

pub fn list_contents() -> AceAssertion {
    inherited_right(AccessMask::LIST_CHILDREN)
}

pub fn read_properties() -> AceAssertion {
    inherited_right(AccessMask::READ_PROPERTY)
}

pub fn write_properties() -> AceAssertion {
    inherited_right(AccessMask::WRITE_PROPERTY)
}

pub fn read_permissions() -> AceAssertion {
    inherited_right(AccessMask::READ_CONTROL)
}

/// Reset password, on computer objects only. Unlike the other rights, it may be
/// granted by an inherit-only entry.
pub fn reset_password() -> AceAssertion {
    AceAssertion::new(AccessMask::CONTROL_ACCESS)
        .with_object_type(RESET_PASSWORD_RIGHT)
        .with_inherited_object_type(COMPUTER_SCHEMA_ID)
        .with_required_flag(AceFlag::ContainerInherit)
}

/// All the rights needed to join a computer to the domain.
pub fn assertions() -> Vec<AceAssertion> {
    vec![
        create_computer(),
        delete_computer(),
        list_contents(),
        read_properties(),
        write_properties(),
        read_permissions(),
        reset_password(),
    ]
}

/// Asserts that `principal` may join computers to the domain.
pub fn role(principal: SID, is_group: bool, token_groups: Option<Vec<SID>>) -> AdRoleAssertion {
    AdRoleAssertion {
        principal: Some(principal),
        is_group,
        token_groups,
        assertions: assertions(),
    }
}
