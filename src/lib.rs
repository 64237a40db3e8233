//! Windows NT security descriptors (MS-DTYP 2.4) and DACL assertions.
//!
//! The [`security`] module decodes and encodes the self-relative security descriptor
//! format, as stored for example in the `nTSecurityDescriptor` attribute of Active Directory
//! objects. The [`dacl`] module checks whether a DACL grants a principal a set of rights.

pub mod binrw_util;
pub mod codec;
pub mod dacl;
pub mod error;
pub mod guid;
pub mod security;

pub use codec::WireFormat;
pub use dacl::{
    evaluate, AceAssertion, AdRoleAssertion, AssertionResult, AssertorConfig, DaclAssertor,
};
pub use error::Error;
pub use guid::Guid;
pub use security::{SecurityDescriptor, ACE, ACL, SID};

pub type Result<T> = std::result::Result<T, crate::Error>;
