//! The domain join assertions against an organizational unit DACL.

mod common;
use common::{entry, object_entry, sid, stored_descriptor, with_flags, TestSids};
use ntsd::{
    dacl::domain_join::{self, COMPUTER_SCHEMA_ID, RESET_PASSWORD_RIGHT},
    guid,
    security::{AccessMask, AceType},
    DaclAssertor, Guid, ACE, SID,
};

const CI: u8 = 0x02;
const IO: u8 = 0x08;
const USER_SCHEMA_ID: Guid = guid!("bf967aba-0de6-11d0-a285-00aa003049e2");

fn create_delete_computers(trustee: &str, class: Guid) -> ACE {
    with_flags(
        object_entry(
            AceType::AccessAllowedObject,
            trustee,
            AccessMask::CREATE_CHILD | AccessMask::DELETE_CHILD,
            Some(class),
            None,
        ),
        CI,
    )
}

fn read_write_children(trustee: &str, flags: u8) -> ACE {
    with_flags(
        entry(
            AceType::AccessAllowed,
            trustee,
            AccessMask::LIST_CHILDREN
                | AccessMask::READ_PROPERTY
                | AccessMask::WRITE_PROPERTY
                | AccessMask::READ_CONTROL,
        ),
        flags,
    )
}

fn reset_computer_passwords(trustee: &str) -> ACE {
    with_flags(
        object_entry(
            AceType::AccessAllowedObject,
            trustee,
            AccessMask::CONTROL_ACCESS,
            Some(RESET_PASSWORD_RIGHT),
            Some(COMPUTER_SCHEMA_ID),
        ),
        CI | IO,
    )
}

#[test_log::test]
fn test_domain_join_granted() {
    let sd = stored_descriptor(vec![
        entry(AceType::AccessAllowed, SID::S_ADMINISTRATORS, AccessMask::GENERIC_ALL),
        create_delete_computers(TestSids::USER, COMPUTER_SCHEMA_ID),
        read_write_children(TestSids::USER, CI),
        reset_computer_passwords(TestSids::USER),
    ]);
    let role = domain_join::role(sid(TestSids::USER), false, None);
    let result = DaclAssertor::default().assert_descriptor(&sd, &role);
    assert!(result.satisfied, "unsatisfied: {:?}", result.unsatisfied);
}

#[test_log::test]
fn test_domain_join_through_groups() {
    let sd = stored_descriptor(vec![
        create_delete_computers(TestSids::GROUP_1, COMPUTER_SCHEMA_ID),
        read_write_children(TestSids::USER, CI),
        reset_computer_passwords(TestSids::GROUP_2),
    ]);
    let groups = vec![sid(TestSids::GROUP_1), sid(TestSids::GROUP_2)];
    let assertor = DaclAssertor::default();

    let role = domain_join::role(sid(TestSids::USER), false, Some(groups));
    assert!(assertor.assert_descriptor(&sd, &role).satisfied);

    let role = domain_join::role(sid(TestSids::USER), false, None);
    let result = assertor.assert_descriptor(&sd, &role);
    assert!(!result.satisfied);
    assert_eq!(
        result.unsatisfied,
        vec![
            domain_join::create_computer(),
            domain_join::delete_computer(),
            domain_join::reset_password(),
        ]
    );
}

#[test_log::test]
fn test_domain_join_inherit_only_children_rights() {
    // Inherit-only entries do not apply to the container itself.
    let sd = stored_descriptor(vec![
        create_delete_computers(TestSids::USER, COMPUTER_SCHEMA_ID),
        read_write_children(TestSids::USER, CI | IO),
        reset_computer_passwords(TestSids::USER),
    ]);
    let role = domain_join::role(sid(TestSids::USER), false, None);
    let result = DaclAssertor::default().assert_descriptor(&sd, &role);
    assert_eq!(
        result.unsatisfied,
        vec![
            domain_join::list_contents(),
            domain_join::read_properties(),
            domain_join::write_properties(),
            domain_join::read_permissions(),
        ]
    );
}

#[test_log::test]
fn test_domain_join_wrong_class() {
    let sd = stored_descriptor(vec![
        create_delete_computers(TestSids::USER, USER_SCHEMA_ID),
        read_write_children(TestSids::USER, CI),
        reset_computer_passwords(TestSids::USER),
    ]);
    let role = domain_join::role(sid(TestSids::USER), false, None);
    let result = DaclAssertor::default().assert_descriptor(&sd, &role);
    assert_eq!(
        result.unsatisfied,
        vec![domain_join::create_computer(), domain_join::delete_computer()]
    );
}

#[test_log::test]
fn test_domain_join_denied_to_everyone() {
    let sd = stored_descriptor(vec![
        entry(AceType::AccessDenied, SID::S_EVERYONE, AccessMask::DELETE_CHILD),
        create_delete_computers(TestSids::USER, COMPUTER_SCHEMA_ID),
        read_write_children(TestSids::USER, CI),
        reset_computer_passwords(TestSids::USER),
    ]);
    let role = domain_join::role(sid(TestSids::USER), false, None);
    let result = DaclAssertor::default().assert_descriptor(&sd, &role);
    assert!(!result.satisfied);
    assert_eq!(result.unsatisfied, vec![domain_join::delete_computer()]);
}
