use std::fmt::Display;

use crate::{
    guid::Guid,
    security::{AccessMask, AceFlag, ObjectAceFlags},
    SID,
};

/// A right that a DACL is expected to grant.
///
/// Object flags state which of the GUIDs are part of the constraint: bit 0 for
/// [`AceAssertion::object_type`], bit 1 for [`AceAssertion::inherited_object_type`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AceAssertion {
    pub rights: AccessMask,
    pub object_flags: Option<ObjectAceFlags>,
    pub object_type: Option<Guid>,
    pub inherited_object_type: Option<Guid>,
    /// A flag that granting entries must carry.
    pub required_flag: Option<AceFlag>,
    /// A flag that granting entries must not carry.
    pub excluded_flag: Option<AceFlag>,
}

impl AceAssertion {
    /// Asserts `rights`, on any object class and with any entry flags.
    pub fn new(rights: u32) -> Self {
        Self {
            rights: AccessMask::from(rights),
            object_flags: None,
            object_type: None,
            inherited_object_type: None,
            required_flag: None,
            excluded_flag: None,
        }
    }

    /// Restricts the assertion to entries for `object_type` (or for every object type).
    pub fn with_object_type(mut self, object_type: Guid) -> Self {
        let flags = self.object_flags.unwrap_or_default();
        self.object_flags = Some(flags.with_object_type_present(true));
        self.object_type = Some(object_type);
        self
    }

    /// Restricts the assertion to entries inherited by `inherited_object_type` objects
    /// (or by every object type).
    pub fn with_inherited_object_type(mut self, inherited_object_type: Guid) -> Self {
        let flags = self.object_flags.unwrap_or_default();
        self.object_flags = Some(flags.with_inherited_object_type_present(true));
        self.inherited_object_type = Some(inherited_object_type);
        self
    }

    pub fn with_required_flag(mut self, flag: AceFlag) -> Self {
        self.required_flag = Some(flag);
        self
    }

    pub fn with_excluded_flag(mut self, flag: AceFlag) -> Self {
        self.excluded_flag = Some(flag);
        self
    }

    pub(crate) fn rights_value(&self) -> u32 {
        u32::from(self.rights)
    }
}

impl Display for AceAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rights.to_sddl())?;
        if let Some(object_type) = &self.object_type {
            write!(f, " on {object_type}")?;
        }
        if let Some(inherited_object_type) = &self.inherited_object_type {
            write!(f, " inherited by {inherited_object_type}")?;
        }
        if let Some(flag) = self.required_flag {
            write!(f, " with {}", flag.code())?;
        }
        if let Some(flag) = self.excluded_flag {
            write!(f, " without {}", flag.code())?;
        }
        Ok(())
    }
}

/// The rights a principal is expected to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdRoleAssertion {
    /// The user or group whose rights are checked. `None` never satisfies the assertion.
    pub principal: Option<SID>,
    pub is_group: bool,
    /// Groups the principal is a member of (its token groups), when it is a user.
    pub token_groups: Option<Vec<SID>>,
    pub assertions: Vec<AceAssertion>,
}

impl AdRoleAssertion {
    pub fn new(assertions: Vec<AceAssertion>, principal: SID, is_group: bool) -> Self {
        Self {
            principal: Some(principal),
            is_group,
            token_groups: None,
            assertions,
        }
    }

    pub fn with_token_groups(mut self, token_groups: Vec<SID>) -> Self {
        self.token_groups = Some(token_groups);
        self
    }
}

/// The outcome of evaluating an [`AdRoleAssertion`] against a DACL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssertionResult {
    pub satisfied: bool,
    /// Assertions that were not granted, or that were explicitly denied.
    pub unsatisfied: Vec<AceAssertion>,
}

#[cfg(test)]
mod tests {
    use crate::guid;

    use super::*;

    #[test]
    fn test_object_type_sets_flags() {
        let assertion = AceAssertion::new(AccessMask::CONTROL_ACCESS)
            .with_object_type(guid!("00299570-246d-11d0-a768-00aa006e0529"))
            .with_inherited_object_type(guid!("bf967a86-0de6-11d0-a285-00aa003049e2"));
        assert_eq!(assertion.object_flags, Some(ObjectAceFlags::from(0x3u32)));
        assert_eq!(assertion.rights_value(), 0x100);
    }

    #[test]
    fn test_display() {
        let assertion = AceAssertion::new(AccessMask::CREATE_CHILD)
            .with_object_type(guid!("bf967a86-0de6-11d0-a285-00aa003049e2"))
            .with_required_flag(AceFlag::ContainerInherit)
            .with_excluded_flag(AceFlag::InheritOnly);
        assert_eq!(
            assertion.to_string(),
            "CC on bf967a86-0de6-11d0-a285-00aa003049e2 with CI without IO"
        );
        assert_eq!(AceAssertion::new(0x30).to_string(), "RPWP");
    }
}
