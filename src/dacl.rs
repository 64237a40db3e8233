//! Checks whether a DACL grants a principal a set of rights.
//!
//! This is not an access check: only rights masks, object types and ACE flags are
//! matched, and explicit (non-inherited) denials override grants.

mod assertion;
mod assertor;
pub mod domain_join;

pub use assertion::*;
pub use assertor::*;
