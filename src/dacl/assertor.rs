use std::collections::HashMap;

use crate::{
    security::{AclRevision, ObjectAceFlags, SecurityDescriptor, ACE, ACL},
    SID,
};

use super::{AceAssertion, AdRoleAssertion, AssertionResult};

/// Settings of a [`DaclAssertor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertorConfig {
    /// Whether rights may also be granted through the principal's token groups.
    /// This also enables scanning the entries of Everyone, which may grant or deny rights.
    ///
    /// Enabled by default.
    pub search_groups: bool,
}

impl Default for AssertorConfig {
    fn default() -> Self {
        Self {
            search_groups: true,
        }
    }
}

/// Checks role assertions against DACLs.
///
/// The assertor keeps no state between calls, and may be shared freely.
#[derive(Debug, Clone, Default)]
pub struct DaclAssertor {
    config: AssertorConfig,
}

impl DaclAssertor {
    pub fn new(config: AssertorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssertorConfig {
        &self.config
    }

    pub fn assert_dacl(&self, dacl: &ACL, role: &AdRoleAssertion) -> AssertionResult {
        evaluate(dacl, role, self.config.search_groups)
    }

    /// Checks the DACL of `sd`. A descriptor without a DACL grants nothing.
    pub fn assert_descriptor(&self, sd: &SecurityDescriptor, role: &AdRoleAssertion) -> AssertionResult {
        match sd.dacl() {
            Some(dacl) => self.assert_dacl(dacl, role),
            None => {
                log::debug!("Security descriptor has no DACL, nothing is granted");
                self.assert_dacl(&ACL::new(AclRevision::DS), role)
            }
        }
    }
}

/// Evaluates whether `dacl` grants the principal of `role` all of its assertions.
///
/// Rights are granted by allow entries of the principal and, if `search_groups` is set
/// and the principal is a user, of its token groups. With `search_groups` set, entries
/// of Everyone are always scanned as well. A non-inherited deny entry matching an
/// assertion makes it unsatisfied, whatever grants it.
pub fn evaluate(dacl: &ACL, role: &AdRoleAssertion, search_groups: bool) -> AssertionResult {
    let Some(principal) = &role.principal else {
        log::warn!("Cannot evaluate role assertion without a principal");
        return AssertionResult::default();
    };

    let mut by_trustee: HashMap<String, Vec<&ACE>> = HashMap::new();
    for (i, ace) in dacl.iter().enumerate() {
        log::trace!("ACE {i}: {ace}");
        by_trustee.entry(ace.sid.to_string()).or_default().push(ace);
    }

    let mut scan = Scan::new(&role.assertions);
    let principal = principal.to_string();
    match by_trustee.get(&principal) {
        Some(entries) => scan.apply(entries),
        None => log::debug!("No entries for principal {principal}"),
    }
    log::debug!(
        "{} unsatisfied and {} denied after scanning principal {principal}",
        scan.unsatisfied.len(),
        scan.denied.len()
    );

    if search_groups {
        match &role.token_groups {
            _ if role.is_group => log::debug!("Principal {principal} is a group, skipping token groups"),
            None => log::debug!("No token groups for principal {principal}"),
            Some(groups) => {
                for group in groups {
                    if scan.unsatisfied.is_empty() {
                        break;
                    }
                    if let Some(entries) = by_trustee.get(&group.to_string()) {
                        log::debug!("Scanning {} entries of group {group}", entries.len());
                        scan.apply(entries);
                    }
                }
            }
        }
        // A deny to Everyone overrides rights that are already granted.
        if let Some(entries) = by_trustee.get(SID::S_EVERYONE) {
            log::debug!("Scanning {} entries of Everyone", entries.len());
            scan.apply(entries);
        }
    }

    let unsatisfied = scan.finish();
    let satisfied = unsatisfied.is_empty();
    log::info!("Role assertion for {principal}: satisfied={satisfied}");
    AssertionResult {
        satisfied,
        unsatisfied,
    }
}

/// Progress of one evaluation.
struct Scan<'a> {
    assertions: &'a [AceAssertion],
    unsatisfied: Vec<AceAssertion>,
    denied: Vec<AceAssertion>,
}

impl<'a> Scan<'a> {
    fn new(assertions: &'a [AceAssertion]) -> Self {
        Self {
            assertions,
            unsatisfied: assertions.to_vec(),
            denied: Vec::new(),
        }
    }

    fn apply(&mut self, entries: &[&ACE]) {
        for ace in entries {
            if ace.ace_type.is_access_allowed() {
                self.unsatisfied.retain(|assertion| {
                    let granted = grants(ace, assertion);
                    if granted {
                        log::debug!("{assertion} granted by {ace}");
                    }
                    !granted
                });
            } else if ace.ace_type.is_access_denied() {
                if ace.is_inherited() {
                    log::trace!("Ignoring inherited denial {ace}");
                    continue;
                }
                for assertion in self.assertions.iter().filter(|a| matches_entry(ace, a)) {
                    log::debug!("{assertion} denied by {ace}");
                    if !self
                        .denied
                        .iter()
                        .any(|d| d.rights_value() == assertion.rights_value())
                    {
                        self.denied.push(assertion.clone());
                    }
                }
            } else {
                log::trace!("Skipping {:?} entry", ace.ace_type);
            }
        }
    }

    /// Merges denials into the unsatisfied assertions.
    fn finish(mut self) -> Vec<AceAssertion> {
        for denial in self.denied {
            if !self
                .unsatisfied
                .iter()
                .any(|u| u.rights_value() == denial.rights_value())
            {
                self.unsatisfied.push(denial);
            }
        }
        self.unsatisfied
    }
}

/// Whether an allow entry grants the assertion.
fn grants(ace: &ACE, assertion: &AceAssertion) -> bool {
    matches_entry(ace, assertion)
        && assertion
            .required_flag
            .is_none_or(|flag| ace.ace_flags.contains(flag))
        && assertion
            .excluded_flag
            .is_none_or(|flag| !ace.ace_flags.contains(flag))
}

/// Rights, object flags and object types tests shared by allow and deny entries.
fn matches_entry(ace: &ACE, assertion: &AceAssertion) -> bool {
    if !ace.access_mask.contains(assertion.rights) {
        return false;
    }
    let Some(required) = assertion.object_flags else {
        return true;
    };
    object_flags_compatible(ace.object_flags, required)
        && object_type_matches(
            ace.object_type,
            assertion.object_type,
            required.object_type_present(),
        )
        && object_type_matches(
            ace.inherited_object_type,
            assertion.inherited_object_type,
            required.inherited_object_type_present(),
        )
}

/// Entries without object flags, or with none set, apply to every object class.
fn object_flags_compatible(entry: Option<ObjectAceFlags>, required: ObjectAceFlags) -> bool {
    match entry {
        None => true,
        Some(flags) if flags.is_empty() => true,
        Some(flags) => flags.contains(required),
    }
}

/// An entry without a GUID applies to every object type.
fn object_type_matches(entry: Option<crate::Guid>, asserted: Option<crate::Guid>, constrained: bool) -> bool {
    !constrained || entry.is_none() || entry == asserted
}
